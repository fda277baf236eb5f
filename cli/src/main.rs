//! slidesvg CLI - PPTX slide rendering tool
//!
//! A command-line tool for converting PowerPoint decks to per-slide SVG or
//! PNG images.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use slidesvg::{ConvertOptions, LogLevel, PptxPackage};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// PowerPoint slide rendering to SVG and PNG
#[derive(Parser)]
#[command(
    name = "slidesvg",
    author = "iyulab",
    version,
    about = "Render PPTX slides to SVG or PNG",
    long_about = "slidesvg - PowerPoint (PPTX) to per-slide SVG/PNG conversion.\n\n\
                  Resolves slide layouts, masters and themes without Office installed."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a deck to per-slide images
    #[command(visible_alias = "c")]
    Convert {
        /// Input PPTX file path
        input: PathBuf,

        /// Output directory (default: current directory)
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Slides to convert, e.g. "1,3-5" (default: all)
        #[arg(short, long)]
        slides: Option<String>,

        /// Rasterize to PNG instead of SVG
        #[arg(long)]
        png: bool,

        /// PNG pixel width (default 960)
        #[arg(long, requires = "png")]
        width: Option<u32>,

        /// PNG pixel height
        #[arg(long, requires = "png", conflicts_with = "width")]
        height: Option<u32>,

        /// Directory with font files for text measurement (repeatable)
        #[arg(long = "font-dir")]
        font_dirs: Vec<PathBuf>,

        /// Font substitution, e.g. "Calibri=Inter" (repeatable)
        #[arg(long = "font-map")]
        font_maps: Vec<String>,

        /// Write a JSON report of approximated features
        #[arg(long)]
        report: Option<PathBuf>,

        /// Suppress the warning summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show deck information
    Info {
        /// Input PPTX file path
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Convert {
            input,
            output,
            slides,
            png,
            width,
            height,
            font_dirs,
            font_maps,
            report,
            quiet,
        } => {
            let pb = create_spinner("Converting slides...");

            let options = ConvertOptions {
                slides: slides.as_deref().map(parse_slide_list).transpose()?,
                log_level: if quiet { LogLevel::Off } else { LogLevel::Warn },
                font_dirs,
                font_mapping: parse_font_maps(&font_maps)?,
                width,
                height,
            };

            let data = fs::read(&input)?;
            let (rendered, summary) = slidesvg::convert_to_svg_with_report(data, &options)?;

            fs::create_dir_all(&output)?;
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "slide".to_string());

            for slide in &rendered {
                if png {
                    pb.set_message(format!("Rasterizing slide {}...", slide.slide_number));
                    let image = slidesvg::render_png(slide, &options)?;
                    let path = output.join(format!("{stem}-{}.png", slide.slide_number));
                    fs::write(&path, &image.png)?;
                } else {
                    let path = output.join(format!("{stem}-{}.svg", slide.slide_number));
                    fs::write(&path, &slide.svg)?;
                }
            }

            if let Some(path) = report {
                fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
            }

            pb.finish_and_clear();
            println!(
                "{} Converted {} slide(s) to {}",
                "✓".green().bold(),
                rendered.len(),
                output.display()
            );
            if !quiet && summary.total > 0 {
                println!(
                    "{} {} feature(s) were approximated:",
                    "!".yellow().bold(),
                    summary.total
                );
                for entry in &summary.entries {
                    match &entry.location {
                        Some(loc) => println!(
                            "  [{}] {} ({}) x{}",
                            entry.feature, entry.message, loc, entry.count
                        ),
                        None => {
                            println!("  [{}] {} x{}", entry.feature, entry.message, entry.count)
                        }
                    }
                }
            }
        }

        Commands::Info { input } => {
            let pb = create_spinner("Reading deck...");

            let package = PptxPackage::open(&input)?;
            let presentation = package.presentation();

            pb.finish_and_clear();

            println!("{}", "Deck Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {}", "Slides".bold(), package.slide_count());
            println!(
                "{}: {} x {} px ({:.2} x {:.2} in)",
                "Size".bold(),
                presentation.slide_width.to_pixels().round(),
                presentation.slide_height.to_pixels().round(),
                presentation.slide_width.to_pixels() / 96.0,
                presentation.slide_height.to_pixels() / 96.0
            );
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Parse "1,3-5" into slide numbers.
fn parse_slide_list(spec: &str) -> Result<Vec<usize>, Box<dyn std::error::Error>> {
    let mut numbers = Vec::new();
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.split_once('-') {
            Some((start, end)) => {
                let start: usize = start.trim().parse()?;
                let end: usize = end.trim().parse()?;
                if start == 0 || end < start {
                    return Err(format!("invalid slide range '{part}'").into());
                }
                numbers.extend(start..=end);
            }
            None => {
                let n: usize = part.parse()?;
                if n == 0 {
                    return Err("slide numbers start at 1".into());
                }
                numbers.push(n);
            }
        }
    }
    if numbers.is_empty() {
        return Err("empty slide list".into());
    }
    numbers.dedup();
    Ok(numbers)
}

fn parse_font_maps(maps: &[String]) -> Result<HashMap<String, String>, Box<dyn std::error::Error>> {
    let mut mapping = HashMap::new();
    for map in maps {
        match map.split_once('=') {
            Some((from, to)) if !from.is_empty() && !to.is_empty() => {
                mapping.insert(from.trim().to_string(), to.trim().to_string());
            }
            _ => return Err(format!("invalid font mapping '{map}', expected FROM=TO").into()),
        }
    }
    Ok(mapping)
}

fn print_version() {
    println!("{} {}", "slidesvg".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("PowerPoint (PPTX) to per-slide SVG/PNG conversion");
    println!();
    println!("Repository: https://github.com/iyulab/slidesvg");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
