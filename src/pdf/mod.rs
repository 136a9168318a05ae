//! PDF export pipeline (spec §4.I-M): content-stream generation, font
//! subsetting/embedding, painters, and the orchestrator that ties them
//! together into a complete `%PDF-1.4` byte stream. Consumes a
//! [`layout_contract::LayoutResult`] produced by an external layout engine
//! — this crate does not perform line breaking, pagination, or table
//! layout itself (spec §1 Non-goals).

pub mod content;
pub mod fonts;
pub mod layout_contract;
pub mod object;
pub mod orchestrator;
pub mod painters;
pub mod structure_tree;
pub mod writer;

pub use layout_contract::LayoutResult;
pub use orchestrator::{export_to_pdf, ExportOptions};
