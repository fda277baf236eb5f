//! Shape geometry parsing: preset references and custom geometry.
//!
//! Custom geometry guides (`gdLst`) form a small expression language. Each
//! guide is an operator with up to three arguments, where an argument is a
//! numeric literal or the name of an earlier guide. Angles are in 1/60000 of
//! a degree throughout.

use crate::model::shape::{CustomGeometryPath, Geometry};
use crate::pptx::ParseContext;
use crate::xml::XmlNode;
use std::collections::HashMap;
use std::fmt::Write;

/// Guide evaluation scope: built-in variables plus accumulated guides.
#[derive(Debug, Clone, Default)]
pub struct GuideContext {
    values: HashMap<String, f64>,
}

impl GuideContext {
    /// Scope seeded with the built-in variables for a `w` x `h` shape box.
    pub fn new(w: f64, h: f64) -> Self {
        let mut values = HashMap::new();
        let ss = w.min(h);
        values.insert("w".to_string(), w);
        values.insert("h".to_string(), h);
        values.insert("l".to_string(), 0.0);
        values.insert("t".to_string(), 0.0);
        values.insert("r".to_string(), w);
        values.insert("b".to_string(), h);
        values.insert("ss".to_string(), ss);
        values.insert("ls".to_string(), w.max(h));
        for d in [2, 3, 4, 5, 6, 8, 10, 12, 16, 32] {
            values.insert(format!("wd{d}"), w / d as f64);
            values.insert(format!("hd{d}"), h / d as f64);
            values.insert(format!("ssd{d}"), ss / d as f64);
        }
        // Circle fractions in 1/60000 degree.
        values.insert("cd2".to_string(), 10_800_000.0);
        values.insert("cd4".to_string(), 5_400_000.0);
        values.insert("cd8".to_string(), 2_700_000.0);
        values.insert("3cd4".to_string(), 16_200_000.0);
        values.insert("3cd8".to_string(), 8_100_000.0);
        values.insert("5cd8".to_string(), 13_500_000.0);
        values.insert("7cd8".to_string(), 18_900_000.0);
        Self { values }
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    /// An argument token: literal number or guide reference. Unknown guides
    /// evaluate to 0.
    pub fn arg(&self, token: &str) -> f64 {
        if let Ok(n) = token.parse::<f64>() {
            return n;
        }
        self.values.get(token).copied().unwrap_or(0.0)
    }

    /// Evaluate one guide formula, e.g. "*/ w 1 2".
    pub fn evaluate(&self, formula: &str) -> f64 {
        let mut parts = formula.split_whitespace();
        let op = match parts.next() {
            Some(op) => op,
            None => return 0.0,
        };
        let a = parts.next().map(|t| self.arg(t)).unwrap_or(0.0);
        let b = parts.next().map(|t| self.arg(t)).unwrap_or(0.0);
        let c = parts.next().map(|t| self.arg(t)).unwrap_or(0.0);

        let deg = |x: f64| x / 60_000.0;
        match op {
            "val" => a,
            "+-" => a + b - c,
            "*/" => {
                let denom = if c == 0.0 { 1.0 } else { c };
                (a * b / denom).round()
            }
            "+/" => {
                let denom = if c == 0.0 { 1.0 } else { c };
                ((a + b) / denom).round()
            }
            "sin" => (a * deg(b).to_radians().sin()).round(),
            "cos" => (a * deg(b).to_radians().cos()).round(),
            "tan" => (a * deg(b).to_radians().tan()).round(),
            "at2" => (b.atan2(a).to_degrees() * 60_000.0).round(),
            "cat2" => (a * c.atan2(b).cos()).round(),
            "sat2" => (a * c.atan2(b).sin()).round(),
            "sqrt" => a.max(0.0).sqrt().round(),
            "min" => a.min(b),
            "max" => a.max(b),
            "abs" => a.abs(),
            "pin" => b.clamp(a.min(c), c.max(a)),
            "mod" => (a * a + b * b + c * c).sqrt().round(),
            "?:" => {
                if a > 0.0 {
                    b
                } else {
                    c
                }
            }
            _ => 0.0,
        }
    }

    /// Evaluate an `avLst`/`gdLst` element into this scope, in order.
    pub fn absorb_guides(&mut self, list: &XmlNode) {
        for gd in list.children("gd") {
            if let (Some(name), Some(fmla)) = (gd.attr("name"), gd.attr("fmla")) {
                let value = self.evaluate(fmla);
                self.set(name, value);
            }
        }
    }
}

/// Parse the geometry child of an `spPr`, if present.
pub fn parse_geometry(sp_pr: &XmlNode, ctx: &ParseContext) -> Option<Geometry> {
    if let Some(prst) = sp_pr.child("prstGeom") {
        let preset = prst.attr("prst").unwrap_or("rect").to_string();
        let mut adjust_values = HashMap::new();
        if let Some(av_lst) = prst.child("avLst") {
            for gd in av_lst.children("gd") {
                if let (Some(name), Some(fmla)) = (gd.attr("name"), gd.attr("fmla")) {
                    if let Some(raw) = fmla.strip_prefix("val ") {
                        if let Ok(v) = raw.trim().parse::<f64>() {
                            adjust_values.insert(name.to_string(), v);
                        }
                    }
                }
            }
        }
        return Some(Geometry::Preset {
            preset,
            adjust_values,
        });
    }
    if let Some(cust) = sp_pr.child("custGeom") {
        return Some(compile_custom_geometry(cust, ctx));
    }
    None
}

/// Compile a `custGeom` into SVG path data per sub-path.
pub fn compile_custom_geometry(cust: &XmlNode, ctx: &ParseContext) -> Geometry {
    let mut paths = Vec::new();
    if let Some(path_lst) = cust.child("pathLst") {
        for path in path_lst.children("path") {
            let w = path.attr_f64("w").unwrap_or(0.0);
            let h = path.attr_f64("h").unwrap_or(0.0);
            if w == 0.0 && h == 0.0 {
                ctx.warn("custom-geometry", "zero-size path skipped");
                continue;
            }

            let mut guides = GuideContext::new(
                if w > 0.0 { w } else { 1.0 },
                if h > 0.0 { h } else { 1.0 },
            );
            if let Some(av_lst) = cust.child("avLst") {
                guides.absorb_guides(av_lst);
            }
            if let Some(gd_lst) = cust.child("gdLst") {
                guides.absorb_guides(gd_lst);
            }

            match compile_path(path, &guides) {
                Some(data) => paths.push(CustomGeometryPath {
                    width: w,
                    height: h,
                    data,
                }),
                None => ctx.warn("custom-geometry", "empty custom geometry path skipped"),
            }
        }
    }
    if paths.is_empty() {
        // A custGeom with no usable path degrades to a plain rectangle.
        ctx.warn("custom-geometry", "custom geometry had no paths");
        return Geometry::rect();
    }
    Geometry::Custom { paths }
}

fn compile_path(path: &XmlNode, guides: &GuideContext) -> Option<String> {
    let mut data = String::new();
    // Current point, needed for arc segment start geometry, and the last
    // moveTo point so close can return there.
    let mut cursor: Option<(f64, f64)> = None;
    let mut subpath_start: Option<(f64, f64)> = None;

    let pt_of = |node: &XmlNode| -> Option<(f64, f64)> {
        let pt = node.child("pt")?;
        let x = pt.attr("x").map(|v| guides.arg(v))?;
        let y = pt.attr("y").map(|v| guides.arg(v))?;
        Some((x, y))
    };
    let pts_of = |node: &XmlNode| -> Vec<(f64, f64)> {
        node.children("pt")
            .filter_map(|pt| {
                let x = pt.attr("x").map(|v| guides.arg(v))?;
                let y = pt.attr("y").map(|v| guides.arg(v))?;
                Some((x, y))
            })
            .collect()
    };

    for cmd in path.elements() {
        match cmd.name.as_str() {
            "moveTo" => {
                if let Some((x, y)) = pt_of(cmd) {
                    let _ = write!(data, "M {} {} ", fmt(x), fmt(y));
                    cursor = Some((x, y));
                    subpath_start = Some((x, y));
                }
            }
            "lnTo" => {
                if let Some((x, y)) = pt_of(cmd) {
                    let _ = write!(data, "L {} {} ", fmt(x), fmt(y));
                    cursor = Some((x, y));
                }
            }
            "cubicBezTo" => {
                let pts = pts_of(cmd);
                if pts.len() == 3 {
                    let _ = write!(
                        data,
                        "C {} {}, {} {}, {} {} ",
                        fmt(pts[0].0),
                        fmt(pts[0].1),
                        fmt(pts[1].0),
                        fmt(pts[1].1),
                        fmt(pts[2].0),
                        fmt(pts[2].1)
                    );
                    cursor = Some(pts[2]);
                }
            }
            "quadBezTo" => {
                let pts = pts_of(cmd);
                if pts.len() == 2 {
                    let _ = write!(
                        data,
                        "Q {} {}, {} {} ",
                        fmt(pts[0].0),
                        fmt(pts[0].1),
                        fmt(pts[1].0),
                        fmt(pts[1].1)
                    );
                    cursor = Some(pts[1]);
                }
            }
            "arcTo" => {
                let rx = cmd.attr("wR").map(|v| guides.arg(v)).unwrap_or(0.0);
                let ry = cmd.attr("hR").map(|v| guides.arg(v)).unwrap_or(0.0);
                let st = cmd.attr("stAng").map(|v| guides.arg(v)).unwrap_or(0.0) / 60_000.0;
                let sw = cmd.attr("swAng").map(|v| guides.arg(v)).unwrap_or(0.0) / 60_000.0;
                if rx == 0.0 || ry == 0.0 || sw == 0.0 {
                    // A degenerate arc draws nothing.
                } else if let Some((cx0, cy0)) = cursor {
                    let st_rad = st.to_radians();
                    let end_rad = (st + sw).to_radians();
                    // Ellipse center from the current point at the start angle.
                    let cx = cx0 - rx * st_rad.cos();
                    let cy = cy0 - ry * st_rad.sin();
                    let ex = cx + rx * end_rad.cos();
                    let ey = cy + ry * end_rad.sin();
                    let large = if sw.abs() > 180.0 { 1 } else { 0 };
                    let sweep = if sw > 0.0 { 1 } else { 0 };
                    let _ = write!(
                        data,
                        "A {} {} 0 {} {} {} {} ",
                        fmt(rx),
                        fmt(ry),
                        large,
                        sweep,
                        fmt(ex),
                        fmt(ey)
                    );
                    cursor = Some((ex, ey));
                }
            }
            "close" => {
                data.push_str("Z ");
                cursor = subpath_start;
            }
            _ => {}
        }
    }

    let data = data.trim_end().to_string();
    if data.is_empty() {
        None
    } else {
        Some(data)
    }
}

/// Round to 3 decimals and trim trailing zeros so path data stays compact.
fn fmt(v: f64) -> String {
    let r = (v * 1000.0).round() / 1000.0;
    if r.fract() == 0.0 {
        format!("{}", r as i64)
    } else {
        format!("{r}")
    }
}
