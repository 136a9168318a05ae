//! Generic property-patch application across node kinds (spec §4.D
//! `set_properties`). Every [`ElementKind`]/[`LeafKind`] variant that
//! carries a property record gets the same field-wise merge; variants with
//! no properties (e.g. `body`, `table-row`) reject the operation.

use crate::errors::OperationError;
use crate::model::node::{ElementKind, LeafKind, Node};
use crate::path::Path;
use crate::properties::PropertyPatch;

/// The patch that would have produced `node`'s current properties, i.e. the
/// set of `(key, currentValue)` pairs for every key `patch` touches. Used to
/// build `set_properties`'s `oldProperties` side for inversion.
pub fn current_patch_for(node: &Node, patch: &PropertyPatch, path: &Path) -> Result<PropertyPatch, OperationError> {
    macro_rules! diff {
        ($props:expr) => {
            Ok($props.diff_patch(patch))
        };
    }
    match node {
        Node::Element(e) => match &e.kind {
            ElementKind::Section(p) => diff!(p),
            ElementKind::Paragraph(p) => diff!(p),
            ElementKind::Run(p) => diff!(p),
            ElementKind::Table(p) => diff!(p),
            ElementKind::TableCell(p) => diff!(p),
            ElementKind::Hyperlink(p) => diff!(p),
            _ => Err(OperationError::WrongNodeKind { path: path.clone(), expected: "node with properties" }),
        },
        Node::Leaf(l) => match &l.kind {
            LeafKind::Image(p) => diff!(p),
            LeafKind::Field(p) => diff!(p),
            LeafKind::Shape { properties, .. } => diff!(properties),
            LeafKind::Mention(p) => diff!(p),
            _ => Err(OperationError::WrongNodeKind { path: path.clone(), expected: "node with properties" }),
        },
    }
}

/// The property record `node` carries, as a patch that would set every
/// field it currently has set — `None` for kinds with no property record at
/// all (e.g. `body`, `table-row`). Used by `merge_node` to capture the
/// removed node's properties so `split_node` (its inverse) can restore them.
pub fn fields_of(node: &Node) -> Option<PropertyPatch> {
    let fields = match node {
        Node::Element(e) => match &e.kind {
            ElementKind::Section(p) => p.fields(),
            ElementKind::Paragraph(p) => p.fields(),
            ElementKind::Run(p) => p.fields(),
            ElementKind::Table(p) => p.fields(),
            ElementKind::TableCell(p) => p.fields(),
            ElementKind::Hyperlink(p) => p.fields(),
            _ => return None,
        },
        Node::Leaf(l) => match &l.kind {
            LeafKind::Image(p) => p.fields(),
            LeafKind::Field(p) => p.fields(),
            LeafKind::Shape { properties, .. } => properties.fields(),
            LeafKind::Mention(p) => p.fields(),
            _ => return None,
        },
    };
    Some(PropertyPatch::from_fields(fields))
}

/// Applies `patch` to whichever property record `node` carries, returning a
/// new node with the same id and children/content.
pub fn apply_patch(node: &Node, patch: &PropertyPatch, path: &Path) -> Result<Node, OperationError> {
    match node {
        Node::Element(e) => {
            let kind = match &e.kind {
                ElementKind::Section(p) => ElementKind::Section(p.merged(patch)),
                ElementKind::Paragraph(p) => ElementKind::Paragraph(p.merged(patch)),
                ElementKind::Run(p) => ElementKind::Run(p.merged(patch)),
                ElementKind::Table(p) => ElementKind::Table(p.merged(patch)),
                ElementKind::TableCell(p) => ElementKind::TableCell(p.merged(patch)),
                ElementKind::Hyperlink(p) => ElementKind::Hyperlink(p.merged(patch)),
                _ => {
                    return Err(OperationError::WrongNodeKind {
                        path: path.clone(),
                        expected: "node with properties",
                    })
                }
            };
            Ok(Node::Element(crate::model::node::ElementNode { kind, ..e.clone() }))
        }
        Node::Leaf(l) => {
            let kind = match &l.kind {
                LeafKind::Image(p) => LeafKind::Image(p.merged(patch)),
                LeafKind::Field(p) => LeafKind::Field(p.merged(patch)),
                LeafKind::Shape { properties, geometry } => {
                    LeafKind::Shape { properties: properties.merged(patch), geometry: geometry.clone() }
                }
                LeafKind::Mention(p) => LeafKind::Mention(p.merged(patch)),
                _ => {
                    return Err(OperationError::WrongNodeKind {
                        path: path.clone(),
                        expected: "node with properties",
                    })
                }
            };
            Ok(Node::Leaf(crate::model::node::LeafNode { kind, ..l.clone() }))
        }
    }
}
