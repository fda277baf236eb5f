//! Table grid rendering.

use crate::model::table::{Table, TableCell};
use crate::model::text::TextBody;
use crate::render::context::RenderContext;
use crate::render::svg::{px, Defs};
use crate::render::{fill, text};
use std::fmt::Write;

/// Render a table into its local space. Column widths and row heights come
/// from the grid definition, not the frame extent.
pub fn render_table(table: &Table, defs: &mut Defs, ctx: &RenderContext) -> String {
    let col_x = offsets(table.columns.iter().map(|c| c.width.to_pixels()));
    let row_y = offsets(table.rows.iter().map(|r| r.height.to_pixels()));

    let mut out = String::new();
    for (ri, row) in table.rows.iter().enumerate() {
        for (ci, cell) in row.cells.iter().enumerate() {
            // Merge continuations are covered by their anchor cell.
            if cell.h_merge || cell.v_merge {
                continue;
            }
            if ci >= table.columns.len() {
                break;
            }
            let span_c = cell.grid_span.min(table.columns.len() - ci);
            let span_r = cell.row_span.min(table.rows.len() - ri);
            let x = col_x[ci];
            let y = row_y[ri];
            let w = col_x[ci + span_c] - x;
            let h = row_y[ri + span_r] - y;
            out.push_str(&render_cell(cell, x, y, w, h, defs, ctx));
        }
    }
    out
}

fn offsets(sizes: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out = vec![0.0];
    let mut acc = 0.0;
    for size in sizes {
        acc += size;
        out.push(acc);
    }
    out
}

fn render_cell(
    cell: &TableCell,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    defs: &mut Defs,
    ctx: &RenderContext,
) -> String {
    let mut out = String::new();
    if let Some(cell_fill) = &cell.fill {
        if let Some(attrs) = fill::fill_attributes(cell_fill, defs, ctx) {
            let _ = writeln!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}" {attrs}/>"#,
                px(x),
                px(y),
                px(w),
                px(h)
            );
        }
    }
    if let Some(borders) = &cell.borders {
        let sides: [(&Option<_>, (f64, f64, f64, f64)); 4] = [
            (&borders.top, (x, y, x + w, y)),
            (&borders.bottom, (x, y + h, x + w, y + h)),
            (&borders.left, (x, y, x, y + h)),
            (&borders.right, (x + w, y, x + w, y + h)),
        ];
        for (border, (x1, y1, x2, y2)) in sides {
            if let Some(outline) = border {
                if let Some(stroke) = fill::stroke_attributes(outline, defs, ctx) {
                    let _ = writeln!(
                        out,
                        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" {stroke}/>"#,
                        px(x1),
                        px(y1),
                        px(x2),
                        px(y2)
                    );
                }
            }
        }
    }
    if let Some(body) = &cell.text_body {
        out.push_str(&positioned_text(body, x, y, w, h, ctx));
    }
    out
}

fn positioned_text(body: &TextBody, x: f64, y: f64, w: f64, h: f64, ctx: &RenderContext) -> String {
    let rendered = text::render_text_body(body, w, h, ctx);
    if rendered.is_empty() {
        return rendered;
    }
    format!(
        "<g transform=\"translate({} {})\">\n{rendered}</g>\n",
        px(x),
        px(y)
    )
}
