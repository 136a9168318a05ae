//! The external layout engine's output contract (spec §6, §4.L): this
//! crate does not do line breaking, pagination, or table layout — an
//! external layout engine consumes a [`crate::Document`] and produces a
//! [`LayoutResult`] the painters in [`super::painters`] walk directly.
//! Grounded on the teacher's own `Fragment`/`BoxFragment`/`TextFragment`
//! split in `layout/fragments.rs`, generalized from boxes to the
//! paragraph/table/image block kinds this spec's documents actually use.

use crate::path::Path;
use crate::properties::{Color, ShapeGeometry};

/// Axis-aligned rectangle in PDF points, origin at the page's top-left
/// (painters flip to PDF's bottom-left coordinate space when emitting `cm`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutResult {
    pub version: u32,
    pub pages: Vec<Page>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    pub content_area: LayoutRect,
    pub blocks: Vec<Block>,
    pub header: Option<Box<Block>>,
    pub footer: Option<Box<Block>>,
    pub floats: Vec<Block>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Paragraph(ParagraphBlock),
    Table(TableBlock),
    Image(ImageBlock),
    Shape(ShapeBlock),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphBlock {
    pub lines: Vec<Line>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
    pub fragments: Vec<TextFragment>,
}

/// A run of text set at one position with one resolved style (spec §4.L).
#[derive(Clone, Debug, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub rect: LayoutRect,
    /// Path to the originating run node, for structure-tree MCID attribution.
    pub run_path: Path,
    pub style: FragmentStyle,
    pub href: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FragmentStyle {
    pub font_family: String,
    pub bold: bool,
    pub italic: bool,
    pub size_pt: f64,
    pub color: Color,
    pub all_caps: bool,
    pub vertical_align: VerticalAlign,
    pub underline: Underline,
    pub strike: bool,
    pub double_strike: bool,
    pub highlight: Option<Color>,
}

impl Default for FragmentStyle {
    fn default() -> Self {
        FragmentStyle {
            font_family: "Calibri".to_string(),
            bold: false,
            italic: false,
            size_pt: 11.0,
            color: Color::BLACK,
            all_caps: false,
            vertical_align: VerticalAlign::Baseline,
            underline: Underline::None,
            strike: false,
            double_strike: false,
            highlight: None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    #[default]
    Baseline,
    Superscript,
    Subscript,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableBlock {
    pub rect: LayoutRect,
    pub rows: Vec<TableRow>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableCell {
    pub rect: LayoutRect,
    pub shading: Option<Color>,
    pub borders: crate::properties::BorderSet,
    pub content: Vec<Block>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageBlock {
    pub rect: LayoutRect,
    pub src_media_id: String,
    pub mime_type: String,
    pub rotation_degrees: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShapeBlock {
    pub rect: LayoutRect,
    pub geometry: ShapeGeometry,
    pub fill_color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub stroke_width_pt: f64,
    pub rotation_degrees: f64,
}
