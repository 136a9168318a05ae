//! The document tree and the registries that sit alongside it (spec §3
//! invariant 1: "a document is a root `document` node with exactly one
//! `body` child, plus side registries for styles, numbering, media and
//! notes that nodes reference by id rather than embed inline").

pub mod factory;
pub mod node;
pub mod traversal;

pub use node::{next_node_id, Children, ElementKind, ElementNode, LeafKind, LeafNode, Node, NodeId};
pub use traversal::{get_node_at_path, get_parent_and_index, traverse_by_type, traverse_nodes, traverse_texts, Visit};

use crate::numbering::NumberingRegistry;
use crate::style::StyleRegistry;
use std::collections::HashMap;
use std::sync::Arc;

/// A binary asset (image bytes, embedded object) referenced by id from
/// [`crate::properties::ImageProperties::src_media_id`].
#[derive(Clone, Debug, PartialEq)]
pub struct MediaAsset {
    pub id: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub body: Arc<Node>,
}

/// A document: one immutable tree rooted at a `document` node, plus the side
/// registries its nodes reference by id. The tree and every registry are
/// replaced wholesale on each edit (spec §9: "an edit produces a new
/// `Document` value; nothing is mutated in place").
#[derive(Clone, Debug)]
pub struct Document {
    pub root: Arc<Node>,
    pub styles: StyleRegistry,
    pub numbering: NumberingRegistry,
    pub media: HashMap<String, MediaAsset>,
    pub headers: HashMap<String, Arc<Node>>,
    pub footers: HashMap<String, Arc<Node>>,
    pub comments: HashMap<String, Comment>,
    pub footnotes: HashMap<String, Arc<Node>>,
    pub endnotes: HashMap<String, Arc<Node>>,
}

impl Document {
    /// A document with an empty body and no registry entries.
    pub fn empty() -> Self {
        Document {
            root: factory::document(factory::body(Default::default())),
            styles: StyleRegistry::new(),
            numbering: NumberingRegistry::new(),
            media: HashMap::new(),
            headers: HashMap::new(),
            footers: HashMap::new(),
            comments: HashMap::new(),
            footnotes: HashMap::new(),
            endnotes: HashMap::new(),
        }
    }

    pub fn body(&self) -> &Arc<Node> {
        &self.root.children()[0]
    }

    pub fn with_root(&self, root: Arc<Node>) -> Document {
        Document { root, ..self.clone() }
    }

    /// Total text length across every text leaf, for quick document
    /// statistics without a caller having to drive the traversal itself.
    pub fn character_count(&self) -> usize {
        traverse_texts(&self.root).map(|v| v.node.text().unwrap_or("").chars().count()).sum()
    }

    pub fn paragraph_count(&self) -> usize {
        traverse_by_type(&self.root, "paragraph").count()
    }

    pub fn word_count(&self) -> usize {
        traverse_texts(&self.root)
            .map(|v| v.node.text().unwrap_or("").split_whitespace().count())
            .sum()
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_has_root_with_single_empty_body() {
        let doc = Document::empty();
        assert_eq!(doc.root.kind_name(), "document");
        assert_eq!(doc.root.children().len(), 1);
        assert_eq!(doc.body().kind_name(), "body");
        assert!(doc.body().children().is_empty());
    }

    #[test]
    fn statistics_count_across_paragraphs() {
        let mut doc = Document::empty();
        let p1 = factory::simple_paragraph("Hello World");
        let p2 = factory::simple_paragraph("foo bar baz");
        let body = factory::body(smallvec::smallvec![p1, p2]);
        doc = doc.with_root(factory::document(body));

        assert_eq!(doc.paragraph_count(), 2);
        assert_eq!(doc.word_count(), 5);
        assert_eq!(doc.character_count(), "Hello World".chars().count() + "foo bar baz".chars().count());
    }
}
