//! Preset and custom geometry to SVG elements.
//!
//! Presets are generated directly in pixel space from the shape's box and
//! adjust values. Custom geometries were compiled to path data at parse
//! time in their own logical space and are scaled here.

use crate::model::shape::Geometry;
use crate::render::context::RenderContext;
use crate::render::svg::px;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt::Write;

/// Render a geometry as one SVG element carrying `attrs` (paint and filter
/// attributes, already assembled).
pub fn render_geometry(
    geometry: &Geometry,
    width: f64,
    height: f64,
    attrs: &str,
    ctx: &RenderContext,
) -> String {
    match geometry {
        Geometry::Custom { paths } => {
            let mut out = String::new();
            for path in paths {
                let sx = if path.width > 0.0 { width / path.width } else { 1.0 };
                let sy = if path.height > 0.0 { height / path.height } else { 1.0 };
                let _ = writeln!(
                    out,
                    r#"<path d="{}" transform="scale({sx:.6} {sy:.6})" vector-effect="non-scaling-stroke" {attrs}/>"#,
                    path.data
                );
            }
            out
        }
        Geometry::Preset {
            preset,
            adjust_values,
        } => preset_element(preset, adjust_values, width, height, attrs, ctx),
    }
}

/// Fraction 0..1 from an adjust value given in 1/100000 units.
fn adj(values: &HashMap<String, f64>, name: &str, default: f64) -> f64 {
    values.get(name).copied().unwrap_or(default) / 100_000.0
}

fn polygon(points: &[(f64, f64)]) -> String {
    let mut d = String::new();
    for (i, (x, y)) in points.iter().enumerate() {
        let _ = write!(d, "{} {} {}", if i == 0 { "M" } else { "L" }, px(*x), px(*y));
        d.push(' ');
    }
    d.push('Z');
    d
}

fn path_element(d: &str, attrs: &str) -> String {
    format!("<path d=\"{d}\" {attrs}/>\n")
}

/// Regular polygon inscribed in the shape's box, first vertex at the top.
fn regular_polygon(sides: usize, width: f64, height: f64) -> String {
    let (cx, cy) = (width / 2.0, height / 2.0);
    let points: Vec<(f64, f64)> = (0..sides)
        .map(|i| {
            let angle = -PI / 2.0 + 2.0 * PI * i as f64 / sides as f64;
            (cx + cx * angle.cos(), cy + cy * angle.sin())
        })
        .collect();
    polygon(&points)
}

fn star(points: usize, inner_ratio: f64, width: f64, height: f64) -> String {
    let (cx, cy) = (width / 2.0, height / 2.0);
    let mut vertices = Vec::with_capacity(points * 2);
    for i in 0..points * 2 {
        let angle = -PI / 2.0 + PI * i as f64 / points as f64;
        let (rx, ry) = if i % 2 == 0 {
            (cx, cy)
        } else {
            (cx * inner_ratio, cy * inner_ratio)
        };
        vertices.push((cx + rx * angle.cos(), cy + ry * angle.sin()));
    }
    polygon(&vertices)
}

/// Wedge or arc between two angles, degrees clockwise from +x.
fn wedge(
    start_deg: f64,
    end_deg: f64,
    width: f64,
    height: f64,
    closed_to_center: bool,
) -> String {
    let (cx, cy) = (width / 2.0, height / 2.0);
    let point = |deg: f64| {
        let rad = deg.to_radians();
        (cx + cx * rad.cos(), cy + cy * rad.sin())
    };
    let (sx, sy) = point(start_deg);
    let (ex, ey) = point(end_deg);
    let sweep = (end_deg - start_deg).rem_euclid(360.0);
    let large = if sweep > 180.0 { 1 } else { 0 };
    let arc = format!(
        "M {} {} A {} {} 0 {large} 1 {} {}",
        px(sx),
        px(sy),
        px(cx),
        px(cy),
        px(ex),
        px(ey)
    );
    if closed_to_center {
        format!("{arc} L {} {} Z", px(cx), px(cy))
    } else {
        arc
    }
}

fn preset_element(
    preset: &str,
    values: &HashMap<String, f64>,
    w: f64,
    h: f64,
    attrs: &str,
    ctx: &RenderContext,
) -> String {
    let ss = w.min(h);
    match preset {
        "rect" | "flowChartProcess" | "actionButtonBlank" => format!(
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" {attrs}/>\n",
            px(w),
            px(h)
        ),
        "roundRect" | "round1Rect" | "round2SameRect" | "flowChartAlternateProcess" => {
            let r = adj(values, "adj", 16_667.0) * ss;
            format!(
                "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" rx=\"{}\" ry=\"{}\" {attrs}/>\n",
                px(w),
                px(h),
                px(r),
                px(r)
            )
        }
        "snip1Rect" | "snip2SameRect" => {
            let s = adj(values, "adj", 16_667.0) * ss;
            path_element(
                &polygon(&[
                    (0.0, 0.0),
                    (w - s, 0.0),
                    (w, s),
                    (w, h),
                    (0.0, h),
                ]),
                attrs,
            )
        }
        "ellipse" | "flowChartConnector" => format!(
            "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" {attrs}/>\n",
            px(w / 2.0),
            px(h / 2.0),
            px(w / 2.0),
            px(h / 2.0)
        ),
        "triangle" => {
            let apex = adj(values, "adj", 50_000.0) * w;
            path_element(&polygon(&[(apex, 0.0), (w, h), (0.0, h)]), attrs)
        }
        "rtTriangle" => path_element(&polygon(&[(0.0, 0.0), (0.0, h), (w, h)]), attrs),
        "diamond" | "flowChartDecision" => path_element(
            &polygon(&[(w / 2.0, 0.0), (w, h / 2.0), (w / 2.0, h), (0.0, h / 2.0)]),
            attrs,
        ),
        "parallelogram" | "flowChartInputOutput" => {
            let skew = adj(values, "adj", 25_000.0) * ss;
            path_element(
                &polygon(&[(skew, 0.0), (w, 0.0), (w - skew, h), (0.0, h)]),
                attrs,
            )
        }
        "trapezoid" => {
            let inset = adj(values, "adj", 25_000.0) * ss;
            path_element(
                &polygon(&[(inset, 0.0), (w - inset, 0.0), (w, h), (0.0, h)]),
                attrs,
            )
        }
        "pentagon" => path_element(&regular_polygon(5, w, h), attrs),
        "hexagon" => {
            let inset = adj(values, "adj", 25_000.0) * ss;
            path_element(
                &polygon(&[
                    (inset, 0.0),
                    (w - inset, 0.0),
                    (w, h / 2.0),
                    (w - inset, h),
                    (inset, h),
                    (0.0, h / 2.0),
                ]),
                attrs,
            )
        }
        "octagon" => {
            let cut = adj(values, "adj", 29_289.0) * ss;
            path_element(
                &polygon(&[
                    (cut, 0.0),
                    (w - cut, 0.0),
                    (w, cut),
                    (w, h - cut),
                    (w - cut, h),
                    (cut, h),
                    (0.0, h - cut),
                    (0.0, cut),
                ]),
                attrs,
            )
        }
        "star4" => path_element(&star(4, 0.30, w, h), attrs),
        "star5" => path_element(&star(5, 0.38, w, h), attrs),
        "star6" => path_element(&star(6, 0.58, w, h), attrs),
        "star8" => path_element(&star(8, 0.60, w, h), attrs),
        "rightArrow" | "leftArrow" | "upArrow" | "downArrow" => {
            arrow_element(preset, values, w, h, attrs)
        }
        "leftRightArrow" => {
            let shaft = adj(values, "adj1", 50_000.0) * h;
            let head = adj(values, "adj2", 50_000.0) * ss;
            let top = (h - shaft) / 2.0;
            path_element(
                &polygon(&[
                    (head, 0.0),
                    (head, top),
                    (w - head, top),
                    (w - head, 0.0),
                    (w, h / 2.0),
                    (w - head, h),
                    (w - head, h - top),
                    (head, h - top),
                    (head, h),
                    (0.0, h / 2.0),
                ]),
                attrs,
            )
        }
        "chevron" => {
            let tip = adj(values, "adj", 50_000.0) * ss;
            path_element(
                &polygon(&[
                    (0.0, 0.0),
                    (w - tip, 0.0),
                    (w, h / 2.0),
                    (w - tip, h),
                    (0.0, h),
                    (tip, h / 2.0),
                ]),
                attrs,
            )
        }
        "homePlate" => {
            let tip = adj(values, "adj", 50_000.0) * ss;
            path_element(
                &polygon(&[
                    (0.0, 0.0),
                    (w - tip, 0.0),
                    (w, h / 2.0),
                    (w - tip, h),
                    (0.0, h),
                ]),
                attrs,
            )
        }
        "plus" | "mathPlus" => {
            let arm = adj(values, "adj", 25_000.0) * ss;
            let (x1, x2) = (arm, w - arm);
            let (y1, y2) = (arm, h - arm);
            path_element(
                &polygon(&[
                    (x1, 0.0),
                    (x2, 0.0),
                    (x2, y1),
                    (w, y1),
                    (w, y2),
                    (x2, y2),
                    (x2, h),
                    (x1, h),
                    (x1, y2),
                    (0.0, y2),
                    (0.0, y1),
                    (x1, y1),
                ]),
                attrs,
            )
        }
        "pie" => {
            let start = adj(values, "adj1", 0.0) * 100_000.0 / 60_000.0;
            let end = adj(values, "adj2", 16_200_000.0) * 100_000.0 / 60_000.0;
            path_element(&wedge(start, end, w, h, true), attrs)
        }
        "chord" => {
            let start = adj(values, "adj1", 2_700_000.0) * 100_000.0 / 60_000.0;
            let end = adj(values, "adj2", 16_200_000.0) * 100_000.0 / 60_000.0;
            format!("<path d=\"{} Z\" {attrs}/>\n", wedge(start, end, w, h, false))
        }
        "arc" => {
            let start = adj(values, "adj1", 16_200_000.0) * 100_000.0 / 60_000.0;
            let end = adj(values, "adj2", 0.0) * 100_000.0 / 60_000.0;
            path_element(&wedge(start, end, w, h, false), attrs)
        }
        "donut" => {
            let hole = adj(values, "adj", 25_000.0) * ss;
            let (cx, cy) = (w / 2.0, h / 2.0);
            let (irx, iry) = (w / 2.0 - hole, h / 2.0 - hole);
            // Even-odd carves the hole out.
            let d = format!(
                "M {cx} 0 A {rx} {ry} 0 1 1 {cx} {h} A {rx} {ry} 0 1 1 {cx} 0 Z \
                 M {cx} {iy} A {irx} {iry} 0 1 0 {cx} {iy2} A {irx} {iry} 0 1 0 {cx} {iy} Z",
                cx = px(cx),
                h = px(h),
                rx = px(cx),
                ry = px(cy),
                irx = px(irx.max(0.0)),
                iry = px(iry.max(0.0)),
                iy = px(cy - iry.max(0.0)),
                iy2 = px(cy + iry.max(0.0)),
            );
            format!("<path d=\"{d}\" fill-rule=\"evenodd\" {attrs}/>\n")
        }
        "frame" => {
            let t = adj(values, "adj1", 12_500.0) * ss;
            let d = format!(
                "{} {}",
                polygon(&[(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]),
                polygon(&[(t, t), (w - t, t), (w - t, h - t), (t, h - t)])
            );
            format!("<path d=\"{d}\" fill-rule=\"evenodd\" {attrs}/>\n")
        }
        "line" | "straightConnector1" => format!(
            "<line x1=\"0\" y1=\"0\" x2=\"{}\" y2=\"{}\" {attrs}/>\n",
            px(w),
            px(h)
        ),
        "bentConnector2" | "bentConnector3" | "bentConnector4" | "bentConnector5" => {
            // Elbow via the midpoint; good enough without routing info.
            path_element(
                &format!(
                    "M 0 0 L {mx} 0 L {mx} {hh} L {ww} {hh}",
                    mx = px(w / 2.0),
                    hh = px(h),
                    ww = px(w)
                ),
                attrs,
            )
        }
        "curvedConnector2" | "curvedConnector3" | "curvedConnector4" | "curvedConnector5" => {
            path_element(
                &format!(
                    "M 0 0 C {mx} 0 {mx} {hh} {ww} {hh}",
                    mx = px(w / 2.0),
                    hh = px(h),
                    ww = px(w)
                ),
                attrs,
            )
        }
        other => {
            ctx.warn(
                "geometry-preset",
                format!("preset geometry '{other}' rendered as rectangle"),
            );
            format!(
                "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" {attrs}/>\n",
                px(w),
                px(h)
            )
        }
    }
}

fn arrow_element(
    preset: &str,
    values: &HashMap<String, f64>,
    w: f64,
    h: f64,
    attrs: &str,
) -> String {
    let ss = w.min(h);
    // Canonical right arrow in a box of (len, thick), then reorient.
    let build = |len: f64, thick: f64| -> Vec<(f64, f64)> {
        let shaft = adj(values, "adj1", 50_000.0) * thick;
        let head = (adj(values, "adj2", 50_000.0) * ss).min(len);
        let top = (thick - shaft) / 2.0;
        vec![
            (0.0, top),
            (len - head, top),
            (len - head, 0.0),
            (len, thick / 2.0),
            (len - head, thick),
            (len - head, thick - top),
            (0.0, thick - top),
        ]
    };
    let points: Vec<(f64, f64)> = match preset {
        "rightArrow" => build(w, h),
        "leftArrow" => build(w, h).into_iter().map(|(x, y)| (w - x, y)).collect(),
        "downArrow" => build(h, w).into_iter().map(|(x, y)| (y, x)).collect(),
        _ => build(h, w).into_iter().map(|(x, y)| (y, h - x)).collect(),
    };
    path_element(&polygon(&points), attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::shape::CustomGeometryPath;
    use crate::render::measure::HeuristicMeasurer;
    use crate::warnings::WarningCollector;

    fn with_ctx<R>(f: impl FnOnce(&RenderContext) -> R) -> R {
        let warnings = WarningCollector::default();
        let measurer = HeuristicMeasurer;
        let mapping = HashMap::new();
        let ctx = RenderContext::new(&warnings, &measurer, &mapping);
        f(&ctx)
    }

    fn preset(name: &str) -> Geometry {
        Geometry::Preset {
            preset: name.to_string(),
            adjust_values: HashMap::new(),
        }
    }

    #[test]
    fn test_rect_uses_rect_element() {
        with_ctx(|ctx| {
            let svg = render_geometry(&preset("rect"), 100.0, 50.0, r##"fill="#FF0000""##, ctx);
            assert!(svg.contains(r#"<rect x="0" y="0" width="100" height="50""#));
        });
    }

    #[test]
    fn test_round_rect_default_radius() {
        with_ctx(|ctx| {
            let svg = render_geometry(&preset("roundRect"), 200.0, 100.0, "", ctx);
            // 16.667% of the short side.
            assert!(svg.contains(r#"rx="16.67""#));
        });
    }

    #[test]
    fn test_round_rect_honors_adjust() {
        with_ctx(|ctx| {
            let mut values = HashMap::new();
            values.insert("adj".to_string(), 50_000.0);
            let geometry = Geometry::Preset {
                preset: "roundRect".to_string(),
                adjust_values: values,
            };
            let svg = render_geometry(&geometry, 200.0, 100.0, "", ctx);
            assert!(svg.contains(r#"rx="50""#));
        });
    }

    #[test]
    fn test_triangle_apex_centered() {
        with_ctx(|ctx| {
            let svg = render_geometry(&preset("triangle"), 100.0, 100.0, "", ctx);
            assert!(svg.contains("M 50 0"));
        });
    }

    #[test]
    fn test_unknown_preset_falls_back_to_rect() {
        let warnings = WarningCollector::default();
        let measurer = HeuristicMeasurer;
        let mapping = HashMap::new();
        let ctx = RenderContext::new(&warnings, &measurer, &mapping);
        let svg = render_geometry(&preset("teardrop"), 80.0, 80.0, "", &ctx);
        assert!(svg.contains("<rect"));
        assert_eq!(warnings.summary().total, 1);
    }

    #[test]
    fn test_custom_geometry_is_scaled() {
        with_ctx(|ctx| {
            let geometry = Geometry::Custom {
                paths: vec![CustomGeometryPath {
                    width: 10.0,
                    height: 10.0,
                    data: "M 0 0 L 10 10 Z".to_string(),
                }],
            };
            let svg = render_geometry(&geometry, 100.0, 50.0, "", ctx);
            assert!(svg.contains("scale(10.000000 5.000000)"));
            assert!(svg.contains("vector-effect=\"non-scaling-stroke\""));
        });
    }

    #[test]
    fn test_line_connector() {
        with_ctx(|ctx| {
            let svg = render_geometry(&preset("line"), 120.0, 60.0, "", ctx);
            assert!(svg.contains(r#"<line x1="0" y1="0" x2="120" y2="60""#));
        });
    }
}
