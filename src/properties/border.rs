//! Compound structures that don't fit the scalar field-wise patch model:
//! per-side table/cell borders and shading, and shape geometry. These are
//! set wholesale via dedicated constructors rather than through
//! `set_properties`'s generic key path (spec §4.D only specifies field-wise
//! merge for the "properties" record in the abstract; the table/shape
//! painters in §4.L need these as structured values, not loose keys).

use crate::properties::units::EighthPoint;
use crate::properties::value::Color;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    None,
    Single,
    Double,
    Dashed,
    Dotted,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BorderSide {
    pub style: BorderStyle,
    pub width: EighthPoint,
    pub color: Color,
}

impl BorderSide {
    pub fn none() -> Self {
        BorderSide { style: BorderStyle::None, width: EighthPoint(0), color: Color::BLACK }
    }

    pub fn is_visible(&self) -> bool {
        self.style != BorderStyle::None && self.width.0 > 0
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BorderSet {
    pub top: BorderSide,
    pub bottom: BorderSide,
    pub left: BorderSide,
    pub right: BorderSide,
}

impl Default for BorderSide {
    fn default() -> Self {
        BorderSide::none()
    }
}

/// A polygon/path-based shape, for the subset of `4.L` painter shapes that
/// are not simple rectangles/ellipses (polygon, arrow, callout, cloud, heart).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
    Polygon,
    Arrow,
    Callout,
    Cloud,
    Heart,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeGeometry {
    pub kind: ShapeKind,
    /// Relative `(x, y)` vertices in the unit square, used for `Polygon`.
    pub points: Vec<(f32, f32)>,
}
