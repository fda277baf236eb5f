//! Package orchestration: loads parts, walks the master/layout/slide chain
//! and produces fully resolved slides.

use crate::container::{PptxContainer, Relationships};
use crate::error::{Error, Result};
use crate::model::presentation::{ColorMap, Presentation, Slide};
use crate::model::shape::SlideElement;
use crate::model::theme::{FontScheme, MasterTextStyles, Theme};
use crate::pptx::cascade::{self, CascadeSources};
use crate::pptx::master;
use crate::pptx::{presentation, slide, theme, ParseContext};
use crate::warnings::{LogLevel, WarningCollector};
use crate::xml::XmlNode;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;
use std::rc::Rc;

/// An opened PPTX package.
///
/// Part trees, relationships and themes are parsed once and cached; slide
/// resolution re-reads only what depends on the slide's own color mapping.
pub struct PptxPackage {
    container: PptxContainer,
    presentation: Presentation,
    default_fonts: FontScheme,
    slide_paths: Vec<String>,
    trees: RefCell<HashMap<String, Rc<XmlNode>>>,
    rels: RefCell<HashMap<String, Rc<Relationships>>>,
    themes: RefCell<HashMap<String, Rc<Theme>>>,
}

impl PptxPackage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_container(PptxContainer::open(path)?)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_container(PptxContainer::from_bytes(data)?)
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_container(PptxContainer::from_reader(reader)?)
    }

    pub fn from_container(container: PptxContainer) -> Result<Self> {
        let mut package = Self {
            container,
            presentation: Presentation::default(),
            default_fonts: FontScheme::default(),
            slide_paths: Vec::new(),
            trees: RefCell::new(HashMap::new()),
            rels: RefCell::new(HashMap::new()),
            themes: RefCell::new(HashMap::new()),
        };
        package.load_presentation()?;
        Ok(package)
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn slide_count(&self) -> usize {
        self.slide_paths.len()
    }

    /// Font scheme of the deck's default theme.
    pub fn font_scheme(&self) -> &FontScheme {
        &self.default_fonts
    }

    fn load_presentation(&mut self) -> Result<()> {
        let pres_path = self.presentation_path()?;
        let pres_rels = self.relationships(&pres_path)?;

        // The default text style may use theme fonts, so resolve the first
        // master's theme before parsing the presentation part. Anything
        // approximated here repeats during slide resolution, so stay quiet.
        let quiet = WarningCollector::new(LogLevel::Off);
        let theme = self
            .chain_theme(&pres_path, &pres_rels, &quiet)
            .unwrap_or_default();
        let color_map = ColorMap::identity();

        let xml = self.container.read_xml(&pres_path)?;
        let ctx = ParseContext {
            container: &self.container,
            part_path: &pres_path,
            rels: &pres_rels,
            theme: &theme,
            color_map: &color_map,
            warnings: &quiet,
            location: "Presentation".to_string(),
        };
        let part = presentation::parse_presentation(&xml, &pres_path, &pres_rels, &ctx)?;
        self.presentation = part.presentation;
        self.slide_paths = part.slide_paths;
        self.default_fonts = theme.font_scheme;
        Ok(())
    }

    fn presentation_path(&self) -> Result<String> {
        let root_rels = self.container.read_relationships("")?;
        if let Some(rel) = root_rels.first_of_type_suffix("/officeDocument") {
            return Ok(PptxContainer::resolve_path("", &rel.target));
        }
        if self.container.exists("ppt/presentation.xml") {
            return Ok("ppt/presentation.xml".to_string());
        }
        Err(Error::UnsupportedFormat(
            "package has no presentation part".to_string(),
        ))
    }

    /// Follow presentation -> master -> theme to find the default theme.
    fn chain_theme(
        &self,
        pres_path: &str,
        pres_rels: &Relationships,
        warnings: &WarningCollector,
    ) -> Option<Theme> {
        let master_rel = pres_rels.first_of_type_suffix("/slideMaster")?;
        let master_path = PptxContainer::resolve_path(pres_path, &master_rel.target);
        let master_rels = self.relationships(&master_path).ok()?;
        let theme_rel = master_rels.first_of_type_suffix("/theme")?;
        let theme_path = PptxContainer::resolve_path(&master_path, &theme_rel.target);
        self.theme(&theme_path, warnings).ok().map(|t| (*t).clone())
    }

    fn tree(&self, path: &str) -> Result<Rc<XmlNode>> {
        if let Some(tree) = self.trees.borrow().get(path) {
            return Ok(Rc::clone(tree));
        }
        let xml = self.container.read_xml(path)?;
        let tree = Rc::new(XmlNode::parse(&xml)?);
        self.trees
            .borrow_mut()
            .insert(path.to_string(), Rc::clone(&tree));
        Ok(tree)
    }

    fn relationships(&self, path: &str) -> Result<Rc<Relationships>> {
        if let Some(rels) = self.rels.borrow().get(path) {
            return Ok(Rc::clone(rels));
        }
        let rels = Rc::new(self.container.read_relationships(path)?);
        self.rels
            .borrow_mut()
            .insert(path.to_string(), Rc::clone(&rels));
        Ok(rels)
    }

    fn theme(&self, path: &str, warnings: &WarningCollector) -> Result<Rc<Theme>> {
        if let Some(theme) = self.themes.borrow().get(path) {
            return Ok(Rc::clone(theme));
        }
        let xml = self.container.read_xml(path)?;
        let rels = self.relationships(path)?;
        let theme = Rc::new(theme::parse_theme(
            &xml,
            &self.container,
            path,
            &rels,
            warnings,
        )?);
        self.themes
            .borrow_mut()
            .insert(path.to_string(), Rc::clone(&theme));
        Ok(theme)
    }

    /// Resolve slide `number` (1-based). `Ok(None)` when out of range.
    pub fn resolve_slide(
        &self,
        number: usize,
        warnings: &WarningCollector,
    ) -> Result<Option<Slide>> {
        let slide_path = match number
            .checked_sub(1)
            .and_then(|i| self.slide_paths.get(i))
        {
            Some(path) => path.clone(),
            None => return Ok(None),
        };
        let location = format!("Slide {number}");

        let slide_root = self.tree(&slide_path)?;
        let slide_rels = self.relationships(&slide_path)?;

        // Layer chain. Each link may be missing in a hand-built package;
        // resolution then degrades to the layers that exist.
        let layout_path = slide_rels
            .first_of_type_suffix("/slideLayout")
            .map(|rel| PptxContainer::resolve_path(&slide_path, &rel.target));
        let (layout_root, layout_rels) = match &layout_path {
            Some(path) => (Some(self.tree(path)?), Some(self.relationships(path)?)),
            None => (None, None),
        };

        let master_path = layout_rels
            .as_ref()
            .and_then(|rels| rels.first_of_type_suffix("/slideMaster"))
            .map(|rel| {
                PptxContainer::resolve_path(layout_path.as_deref().unwrap_or(""), &rel.target)
            });
        let (master_root, master_rels) = match &master_path {
            Some(path) => (Some(self.tree(path)?), Some(self.relationships(path)?)),
            None => (None, None),
        };

        let theme = match (&master_path, &master_rels) {
            (Some(path), Some(rels)) => match rels.first_of_type_suffix("/theme") {
                Some(rel) => {
                    let theme_path = PptxContainer::resolve_path(path, &rel.target);
                    self.theme(&theme_path, warnings)?
                }
                None => Rc::new(Theme::default()),
            },
            _ => Rc::new(Theme::default()),
        };

        // Color map: master's clrMap, overridden bottom-up.
        let master_map = master_root
            .as_ref()
            .and_then(|root| root.child("clrMap").map(master::parse_color_map));
        let color_map = master::color_map_override(&slide_root)
            .or_else(|| layout_root.as_ref().and_then(|r| master::color_map_override(r)))
            .or(master_map)
            .unwrap_or_default();

        let master_layer;
        let mut master_text = MasterTextStyles::default();
        if let (Some(root), Some(path), Some(rels)) = (&master_root, &master_path, &master_rels) {
            let ctx = ParseContext {
                container: &self.container,
                part_path: path,
                rels,
                theme: &theme,
                color_map: &color_map,
                warnings,
                location: location.clone(),
            };
            master_layer = Some(master::parse_layer(root, &ctx));
            if let Some(tx_styles) = root.child("txStyles") {
                master_text = master::parse_master_text_styles(tx_styles, &ctx);
            }
        } else {
            master_layer = None;
        }

        let layout_layer = match (&layout_root, &layout_path, &layout_rels) {
            (Some(root), Some(path), Some(rels)) => {
                let ctx = ParseContext {
                    container: &self.container,
                    part_path: path,
                    rels,
                    theme: &theme,
                    color_map: &color_map,
                    warnings,
                    location: location.clone(),
                };
                Some(master::parse_layer(root, &ctx))
            }
            _ => None,
        };

        let slide_ctx = ParseContext {
            container: &self.container,
            part_path: &slide_path,
            rels: &slide_rels,
            theme: &theme,
            color_map: &color_map,
            warnings,
            location: location.clone(),
        };

        let show_master_shapes = slide_root
            .attr("showMasterSp")
            .map(|v| v == "1" || v == "true")
            .unwrap_or(true);

        let c_sld = slide_root.child("cSld");
        let slide_background = c_sld
            .and_then(|c| c.child("bg"))
            .and_then(|bg| slide::parse_background(bg, &slide_ctx));
        let mut elements = c_sld
            .and_then(|c| c.child("spTree"))
            .map(|tree| slide::parse_shape_tree(tree, &slide_ctx))
            .unwrap_or_default();

        // Background walks slide -> layout -> master.
        let background = slide_background
            .or_else(|| layout_layer.as_ref().and_then(|l| l.background.clone()))
            .or_else(|| master_layer.as_ref().and_then(|l| l.background.clone()));

        // Placeholder inheritance and the text cascade.
        let empty: [master::PlaceholderStyle; 0] = [];
        let sources = CascadeSources {
            layout: layout_layer
                .as_ref()
                .map(|l| l.placeholder_styles.as_slice())
                .unwrap_or(&empty),
            master: master_layer
                .as_ref()
                .map(|l| l.placeholder_styles.as_slice())
                .unwrap_or(&empty),
            master_text: &master_text,
            presentation_default: &self.presentation.default_text_style,
        };
        for element in &mut elements {
            cascade_element(element, &sources);
        }

        // Decorations paint under slide content: master first, then layout.
        // The slide flag gates master elements only, ANDed with the
        // layout's own flag; layout decorations always paint.
        let mut painted = Vec::new();
        let layout_allows_master = layout_layer.as_ref().map_or(true, |l| l.show_master_shapes);
        if show_master_shapes && layout_allows_master {
            if let Some(master) = &master_layer {
                painted.extend(master.decorations.iter().cloned());
            }
        }
        if let Some(layout) = &layout_layer {
            painted.extend(layout.decorations.iter().cloned());
        }
        painted.extend(elements);

        Ok(Some(Slide {
            slide_number: number,
            background,
            elements: painted,
            show_master_shapes,
        }))
    }
}

fn cascade_element(element: &mut SlideElement, sources: &CascadeSources) {
    match element {
        SlideElement::Shape(shape) => {
            cascade::inherit_transform(shape, sources);
            cascade::apply_text_cascade(shape, sources);
        }
        SlideElement::Group(group) => {
            for child in &mut group.children {
                cascade_element(child, sources);
            }
        }
        _ => {}
    }
}

impl std::fmt::Debug for PptxPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PptxPackage")
            .field("slides", &self.slide_paths.len())
            .field("slide_width", &self.presentation.slide_width)
            .field("slide_height", &self.presentation.slide_height)
            .finish()
    }
}
