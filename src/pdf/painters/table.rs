//! Table painter (spec §4.L): outer borders, per-cell shading, and
//! per-side borders with eighths-of-a-point widths. Grounded on the same
//! `paint_onto` background-then-recurse shape as `paint.rs`, generalized
//! from one border color to the cell's four independently-styled sides.

use crate::pdf::content::ContentBuilder;
use crate::pdf::layout_contract::{LayoutRect, TableBlock};
use crate::properties::{BorderSet, BorderSide};

pub fn paint_table(content: &mut ContentBuilder, table: &TableBlock, page_height: f64) {
    paint_outer_border(content, &table.rect, page_height);
    for row in &table.rows {
        for cell in &row.cells {
            if let Some(shading) = cell.shading {
                content.save_state();
                content.set_fill_color(shading);
                let (x, y) = flip(&cell.rect, page_height);
                content.rectangle(x, y, cell.rect.width, cell.rect.height);
                content.fill();
                content.restore_state();
            }
            paint_cell_borders(content, &cell.rect, &cell.borders, page_height);
        }
    }
}

fn paint_outer_border(content: &mut ContentBuilder, rect: &LayoutRect, page_height: f64) {
    let (x, y) = flip(rect, page_height);
    content.save_state();
    content.set_stroke_color(crate::properties::Color::BLACK);
    content.set_line_width(1.0);
    content.rectangle(x, y, rect.width, rect.height);
    content.stroke();
    content.restore_state();
}

fn paint_cell_borders(content: &mut ContentBuilder, rect: &LayoutRect, borders: &BorderSet, page_height: f64) {
    let (x, y) = flip(rect, page_height);
    let (x2, y2) = (x + rect.width, y + rect.height);
    paint_side(content, &borders.top, x, y2, x2, y2);
    paint_side(content, &borders.bottom, x, y, x2, y);
    paint_side(content, &borders.left, x, y, x, y2);
    paint_side(content, &borders.right, x2, y, x2, y2);
}

fn paint_side(content: &mut ContentBuilder, side: &BorderSide, x1: f64, y1: f64, x2: f64, y2: f64) {
    if !side.is_visible() {
        return;
    }
    content.save_state();
    content.set_stroke_color(side.color);
    content.set_line_width(side.width.to_points() as f64);
    content.move_to(x1, y1);
    content.line_to(x2, y2);
    content.stroke();
    content.restore_state();
}

/// Converts a top-left-origin layout rect's top-left corner to the
/// bottom-left-origin PDF point this painter emits `re`/`m` against.
fn flip(rect: &LayoutRect, page_height: f64) -> (f64, f64) {
    (rect.x, page_height - rect.y - rect.height)
}
