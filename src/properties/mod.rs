//! Property records and the units they're expressed in (spec §3, §4.C).

pub(crate) mod macros;

pub mod border;
pub mod records;
pub mod units;
pub mod value;

pub use border::{BorderSet, BorderSide, BorderStyle, ShapeGeometry, ShapeKind};
pub use records::{
    FieldProperties, HyperlinkProperties, ImageProperties, MentionProperties,
    ParagraphProperties, RunProperties, SectionProperties, ShapeProperties, TableCellProperties,
    TableProperties,
};
pub use units::{Emu, EighthPoint, HalfPoint, Twip};
pub use value::{Color, PropertyPatch, PropertyValue};
