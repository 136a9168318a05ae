//! `docforge` is a word-processor engine: a rich, immutable document model
//! (paragraphs, runs, tables, images, sections with headers/footers, styles,
//! numbering), an operation algebra with inversion and normalization, an
//! editing coordinator with undo/redo and a plugin/command surface, and a
//! PDF export pipeline with font subsetting and optional tagged-PDF output.
//!
//! This crate does not implement text layout (line breaking, pagination,
//! table layout); callers supply a [`pdf::LayoutResult`] produced by an
//! external layout engine. It does not render a UI, import DOCX, or
//! implement real-time collaboration.

pub mod path;
pub mod model;
pub mod properties;
pub mod style;
pub mod numbering;
pub mod ops;
pub mod normalize;
pub mod editor;
pub mod plugin;
pub mod selection;
pub mod pdf;
pub mod errors;

pub use editor::Editor;
pub use errors::{ExportError, OperationError};
pub use model::{Document, Node, NodeId};
pub use ops::Operation;
pub use path::Path;
