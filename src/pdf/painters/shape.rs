//! Shape painter (spec §4.L): converts EMU-positioned drawing shapes to
//! PDF path operators, including the four-Bézier ellipse approximation and
//! center-anchored rotation. Grounded on the teacher's `paint_onto`
//! rectangle painting in `paint.rs`, generalized from axis-aligned
//! rectangles to arbitrary rotated/curved geometry.

use crate::pdf::content::ContentBuilder;
use crate::pdf::layout_contract::ShapeBlock;
use crate::properties::ShapeKind;

/// `4/3 * (sqrt(2) - 1)`, the standard constant for approximating a quarter
/// circle with one cubic Bézier (spec §4.L).
const BEZIER_ELLIPSE_CONSTANT: f64 = 0.5522848;

pub fn paint_shape(content: &mut ContentBuilder, shape: &ShapeBlock, page_height: f64) {
    content.save_state();
    // LayoutRect is top-left-origin; PDF content space is bottom-left-origin.
    let origin_y = page_height - shape.rect.y - shape.rect.height;
    apply_rotation(content, shape, origin_y);

    match shape.geometry.kind {
        ShapeKind::Rectangle => paint_rectangle(content, shape, origin_y),
        ShapeKind::Ellipse => paint_ellipse(content, shape, origin_y),
        ShapeKind::Polygon | ShapeKind::Arrow | ShapeKind::Callout | ShapeKind::Cloud | ShapeKind::Heart => {
            paint_point_path(content, shape, origin_y)
        }
    }

    finish_path(content, shape);
    content.restore_state();
}

fn apply_rotation(content: &mut ContentBuilder, shape: &ShapeBlock, origin_y: f64) {
    if shape.rotation_degrees == 0.0 {
        return;
    }
    let cx = shape.rect.x + shape.rect.width / 2.0;
    let cy = origin_y + shape.rect.height / 2.0;
    let radians = shape.rotation_degrees.to_radians();
    let (sin, cos) = (radians.sin(), radians.cos());
    // translate(cx, cy) * rotate(theta) * translate(-cx, -cy), expanded to a single `cm` matrix.
    content.concat_matrix(cos, sin, -sin, cos, cx - cx * cos + cy * sin, cy - cx * sin - cy * cos);
}

fn paint_rectangle(content: &mut ContentBuilder, shape: &ShapeBlock, origin_y: f64) {
    content.rectangle(shape.rect.x, origin_y, shape.rect.width, shape.rect.height);
}

fn paint_ellipse(content: &mut ContentBuilder, shape: &ShapeBlock, origin_y: f64) {
    let rx = shape.rect.width / 2.0;
    let ry = shape.rect.height / 2.0;
    let cx = shape.rect.x + rx;
    let cy = origin_y + ry;
    let kx = rx * BEZIER_ELLIPSE_CONSTANT;
    let ky = ry * BEZIER_ELLIPSE_CONSTANT;

    content.move_to(cx + rx, cy);
    content.curve_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
    content.curve_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
    content.curve_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);
    content.curve_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
}

/// Polygon-family shapes (polygon/arrow/callout/cloud/heart) share the same
/// "unit-square relative vertices scaled into the shape's rect" encoding;
/// the visual distinction between them lives in how the caller populated
/// `geometry.points`, not in this painter.
fn paint_point_path(content: &mut ContentBuilder, shape: &ShapeBlock, origin_y: f64) {
    let mut points = shape.geometry.points.iter();
    let Some(&(fx, fy)) = points.next() else { return };
    let (mx, my) = to_absolute(shape, origin_y, fx, fy);
    content.move_to(mx, my);
    for &(x, y) in points {
        let (ax, ay) = to_absolute(shape, origin_y, x, y);
        content.line_to(ax, ay);
    }
}

fn to_absolute(shape: &ShapeBlock, origin_y: f64, rel_x: f32, rel_y: f32) -> (f64, f64) {
    (shape.rect.x + rel_x as f64 * shape.rect.width, origin_y + rel_y as f64 * shape.rect.height)
}

fn finish_path(content: &mut ContentBuilder, shape: &ShapeBlock) {
    content.close_path();
    if let Some(fill) = shape.fill_color {
        content.set_fill_color(fill);
    }
    if let Some(stroke) = shape.stroke_color {
        content.set_stroke_color(stroke);
        content.set_line_width(shape.stroke_width_pt);
    }
    match (shape.fill_color, shape.stroke_color) {
        (Some(_), Some(_)) => {
            content.fill_and_stroke();
        }
        (Some(_), None) => {
            content.fill();
        }
        (None, Some(_)) => {
            content.stroke();
        }
        (None, None) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::layout_contract::LayoutRect;
    use crate::properties::{Color, ShapeGeometry};

    fn base_shape(kind: ShapeKind) -> ShapeBlock {
        ShapeBlock {
            rect: LayoutRect { x: 0.0, y: 0.0, width: 100.0, height: 50.0 },
            geometry: ShapeGeometry { kind, points: vec![] },
            fill_color: Some(Color::BLACK),
            stroke_color: None,
            stroke_width_pt: 1.0,
            rotation_degrees: 0.0,
        }
    }

    #[test]
    fn ellipse_emits_four_bezier_curves() {
        let mut content = ContentBuilder::new();
        paint_shape(&mut content, &base_shape(ShapeKind::Ellipse), 800.0);
        let text = String::from_utf8(content.into_bytes()).unwrap();
        assert_eq!(text.matches(" c\n").count(), 4);
    }

    #[test]
    fn rotation_emits_a_concat_matrix_before_the_path() {
        let mut content = ContentBuilder::new();
        let mut shape = base_shape(ShapeKind::Rectangle);
        shape.rotation_degrees = 45.0;
        paint_shape(&mut content, &shape, 800.0);
        let text = String::from_utf8(content.into_bytes()).unwrap();
        assert!(text.contains(" cm\n"));
    }
}
