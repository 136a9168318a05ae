//! Error kinds (spec §7). Structural errors are fatal to a single operation
//! and never partially mutate the document; export errors are fatal to the
//! whole export call; resource errors are recovered locally and never
//! surface here (fallback happens where the resource is consumed).

use crate::path::Path;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("path {0} is out of bounds")]
    PathOutOfBounds(Path),

    #[error("cannot traverse into a leaf node at {0}")]
    TraverseIntoLeaf(Path),

    #[error("operation at {path} expected a {expected} node")]
    WrongNodeKind { path: Path, expected: &'static str },

    #[error("cannot merge {path}: node kinds differ")]
    MergeMismatch { path: Path },

    #[error("node at {0} has no previous sibling to merge into")]
    NoPreviousSibling(Path),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("object {0} was reserved but never filled")]
    InvalidObjectReference(u32),

    #[error("failed to parse font: {0}")]
    FontParseFailure(#[from] FontError),

    #[error("layout engine error: {0}")]
    Layout(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FontError {
    #[error("font data truncated or offset beyond end of file")]
    OffsetBeyondEof,
    #[error("unsupported font format (expected TrueType or OpenType)")]
    UnsupportedFormat,
    #[error("font has no usable cmap subtable")]
    NoSupportedCmap,
    #[error("required table {0:?} missing from font")]
    MissingTable([u8; 4]),
    #[error("glyph id {0} out of range for this font")]
    GlyphOutOfRange(u16),
}
