//! Line breaking.
//!
//! Latin words are atomic; CJK breaks after any character; whitespace is a
//! break opportunity and never starts a line. A token wider than the whole
//! line is force-split per character so long URLs cannot overflow the box.

use crate::render::context::RenderContext;
use crate::model::text::{Paragraph, RunProperties, TextRun};
use unicode_width::UnicodeWidthChar;

/// A measured fragment of one run, ready to place on a line.
#[derive(Debug, Clone)]
pub struct LineFragment {
    pub text: String,
    pub properties: RunProperties,
    pub width: f64,
    pub font_size: f64,
}

/// One laid-out line.
#[derive(Debug, Clone, Default)]
pub struct Line {
    pub fragments: Vec<LineFragment>,
    pub width: f64,
    /// Tallest font size on the line, which sets its height.
    pub font_size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Space,
    /// Breakable after every character.
    Cjk,
    HardBreak,
}

#[derive(Debug, Clone)]
struct Token<'a> {
    text: String,
    kind: TokenKind,
    run: &'a TextRun,
}

fn is_cjk(ch: char) -> bool {
    UnicodeWidthChar::width(ch).unwrap_or(1) >= 2
}

fn tokenize<'a>(runs: &'a [TextRun]) -> Vec<Token<'a>> {
    let mut tokens = Vec::new();
    for run in runs {
        if run.text == "\n" {
            tokens.push(Token {
                text: String::new(),
                kind: TokenKind::HardBreak,
                run,
            });
            continue;
        }
        let mut current = String::new();
        let mut current_kind: Option<TokenKind> = None;
        for ch in run.text.chars() {
            let kind = if ch == '\n' {
                TokenKind::HardBreak
            } else if ch.is_whitespace() {
                TokenKind::Space
            } else if is_cjk(ch) {
                TokenKind::Cjk
            } else {
                TokenKind::Word
            };
            // CJK characters each stand alone; other kinds accumulate.
            let flush = match current_kind {
                None => false,
                Some(k) => k != kind || kind == TokenKind::Cjk || kind == TokenKind::HardBreak,
            };
            if flush && !current.is_empty() {
                tokens.push(Token {
                    text: std::mem::take(&mut current),
                    kind: current_kind.unwrap_or(TokenKind::Word),
                    run,
                });
            }
            if kind == TokenKind::HardBreak {
                tokens.push(Token {
                    text: String::new(),
                    kind,
                    run,
                });
                current_kind = None;
                continue;
            }
            current.push(ch);
            current_kind = Some(kind);
        }
        if !current.is_empty() {
            tokens.push(Token {
                text: current,
                kind: current_kind.unwrap_or(TokenKind::Word),
                run,
            });
        }
    }
    tokens
}

/// Lay a paragraph's runs out into lines no wider than `max_width`.
/// `font_scale` multiplies every run's size (autofit). A `max_width` of
/// `f64::INFINITY` disables wrapping but still honors hard breaks.
pub fn wrap_paragraph(
    paragraph: &Paragraph,
    max_width: f64,
    font_scale: f64,
    ctx: &RenderContext,
) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut line = Line::default();

    let measure = |text: &str, run: &TextRun| -> (f64, f64) {
        let size = run.properties.font_size.unwrap_or(18.0) * font_scale * (96.0 / 72.0);
        let family = run
            .properties
            .font_family
            .as_deref()
            .unwrap_or("sans-serif");
        let family = ctx.map_font(family);
        (
            ctx.measurer
                .measure(text, &family, size, run.properties.bold),
            size,
        )
    };

    let push_fragment = |line: &mut Line, text: String, run: &TextRun, width: f64, size: f64| {
        line.width += width;
        line.font_size = line.font_size.max(size);
        // Merge into the previous fragment when the run matches, keeping
        // the output tspan count down.
        if let Some(last) = line.fragments.last_mut() {
            if last.properties == run.properties {
                last.text.push_str(&text);
                last.width += width;
                return;
            }
        }
        line.fragments.push(LineFragment {
            text,
            properties: run.properties.clone(),
            width,
            font_size: size,
        });
    };

    let break_line = |lines: &mut Vec<Line>, line: &mut Line| {
        // Trailing spaces do not count against alignment.
        while let Some(last) = line.fragments.last_mut() {
            let trimmed = last.text.trim_end();
            if trimmed.len() == last.text.len() {
                break;
            }
            let (removed_width, _) = measure(&last.text[trimmed.len()..], &TextRun {
                text: String::new(),
                properties: last.properties.clone(),
            });
            last.text.truncate(trimmed.len());
            last.width -= removed_width;
            line.width -= removed_width;
            if last.text.is_empty() {
                line.fragments.pop();
            } else {
                break;
            }
        }
        lines.push(std::mem::take(line));
    };

    for token in tokenize(&paragraph.runs) {
        match token.kind {
            TokenKind::HardBreak => {
                break_line(&mut lines, &mut line);
            }
            TokenKind::Space => {
                // Whitespace never begins a line.
                if line.fragments.is_empty() {
                    continue;
                }
                let (width, size) = measure(&token.text, token.run);
                push_fragment(&mut line, token.text, token.run, width, size);
            }
            TokenKind::Word | TokenKind::Cjk => {
                let (width, size) = measure(&token.text, token.run);
                if line.width + width > max_width && !line.fragments.is_empty() {
                    break_line(&mut lines, &mut line);
                }
                if width > max_width {
                    // Oversize token: split per character.
                    for ch in token.text.chars() {
                        let s = ch.to_string();
                        let (cw, cs) = measure(&s, token.run);
                        if line.width + cw > max_width && !line.fragments.is_empty() {
                            break_line(&mut lines, &mut line);
                        }
                        push_fragment(&mut line, s, token.run, cw, cs);
                    }
                } else {
                    push_fragment(&mut line, token.text, token.run, width, size);
                }
            }
        }
    }

    if !line.fragments.is_empty() {
        break_line(&mut lines, &mut line);
    }
    if lines.is_empty() {
        // An empty paragraph still occupies one line; its height comes from
        // endParaRPr when present.
        let size = paragraph
            .end_properties
            .as_ref()
            .and_then(|p| p.font_size)
            .or_else(|| {
                paragraph
                    .runs
                    .first()
                    .and_then(|r| r.properties.font_size)
            })
            .unwrap_or(18.0)
            * font_scale
            * (96.0 / 72.0);
        lines.push(Line {
            fragments: Vec::new(),
            width: 0.0,
            font_size: size,
        });
    }
    lines
}
