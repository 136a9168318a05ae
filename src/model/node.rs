//! The node model (spec §3, §4.B): a tagged-variant tree. Elements carry
//! ordered children; leaves carry their own content directly. Every node
//! carries a stable, process-local [`NodeId`] (spec §4.B: "a process-local
//! monotonic counter is acceptable").
//!
//! Nodes are immutable and shared by [`std::sync::Arc`] (spec §9 Design
//! Notes: "represent nodes by Arc-style shared ownership ... copy-on-write
//! along the mutation path"). An edit clones only the `Vec`/`SmallVec` of
//! children on the path from the mutated node to the root; every subtree
//! not on that path is reused by reference, which is what gives
//! [`crate::ops::apply_operation`] its structural-sharing guarantee
//! (spec §8 property 3).

use crate::properties::{
    FieldProperties, HyperlinkProperties, ImageProperties, MentionProperties,
    ParagraphProperties, RunProperties, SectionProperties, ShapeGeometry, ShapeProperties,
    TableCellProperties, TableProperties,
};
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a fresh, process-local unique id.
pub fn next_node_id() -> NodeId {
    NodeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Inline capacity for a node's children: most containers (paragraphs,
/// rows) hold a handful of runs or cells.
pub type Children = SmallVec<[Arc<Node>; 4]>;

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(ElementNode),
    Leaf(LeafNode),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Node::Element(e) => e.id,
            Node::Leaf(l) => l.id,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Leaf(l) if matches!(l.kind, LeafKind::Text(_)))
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(e) => Some(e),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Node::Leaf(l) => Some(l),
            Node::Element(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Leaf(LeafNode { kind: LeafKind::Text(s), .. }) => Some(s),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Arc<Node>] {
        match self {
            Node::Element(e) => &e.children,
            Node::Leaf(_) => &[],
        }
    }

    /// A short, stable name for the node's kind, used in error messages and
    /// the normalizer.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Element(e) => e.kind.name(),
            Node::Leaf(l) => l.kind.name(),
        }
    }

    /// Returns a clone of this node with `children` replaced. Only valid on
    /// elements; leaves return themselves unchanged (they have no children
    /// to replace, and callers should not ask).
    pub fn with_children(&self, children: Children) -> Node {
        match self {
            Node::Element(e) => Node::Element(ElementNode { children, ..e.clone() }),
            Node::Leaf(_) => self.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElementNode {
    pub id: NodeId,
    pub kind: ElementKind,
    pub children: Children,
}

impl ElementNode {
    pub fn new(kind: ElementKind, children: Children) -> Self {
        ElementNode { id: next_node_id(), kind, children }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LeafNode {
    pub id: NodeId,
    pub kind: LeafKind,
}

impl LeafNode {
    pub fn new(kind: LeafKind) -> Self {
        LeafNode { id: next_node_id(), kind }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    Document,
    Body,
    Section(SectionProperties),
    Paragraph(ParagraphProperties),
    Run(RunProperties),
    Table(TableProperties),
    TableRow,
    TableCell(TableCellProperties),
    Header,
    Footer,
    Hyperlink(HyperlinkProperties),
    Drawing,
    ShapeGroup,
    Textbox,
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Document => "document",
            ElementKind::Body => "body",
            ElementKind::Section(_) => "section",
            ElementKind::Paragraph(_) => "paragraph",
            ElementKind::Run(_) => "run",
            ElementKind::Table(_) => "table",
            ElementKind::TableRow => "table-row",
            ElementKind::TableCell(_) => "table-cell",
            ElementKind::Header => "header",
            ElementKind::Footer => "footer",
            ElementKind::Hyperlink(_) => "hyperlink",
            ElementKind::Drawing => "drawing",
            ElementKind::ShapeGroup => "shape-group",
            ElementKind::Textbox => "textbox",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LeafKind {
    Text(String),
    Image(ImageProperties),
    PageBreak,
    LineBreak,
    ColumnBreak,
    Tab,
    BookmarkStart { id: String },
    BookmarkEnd { id: String },
    CommentRangeStart { id: String },
    CommentRangeEnd { id: String },
    Field(FieldProperties),
    FootnoteRef { id: String },
    EndnoteRef { id: String },
    Equation { latex: String },
    Shape { properties: ShapeProperties, geometry: ShapeGeometry },
    Mention(MentionProperties),
}

impl LeafKind {
    pub fn name(&self) -> &'static str {
        match self {
            LeafKind::Text(_) => "text",
            LeafKind::Image(_) => "image",
            LeafKind::PageBreak => "page-break",
            LeafKind::LineBreak => "line-break",
            LeafKind::ColumnBreak => "column-break",
            LeafKind::Tab => "tab",
            LeafKind::BookmarkStart { .. } => "bookmark-start",
            LeafKind::BookmarkEnd { .. } => "bookmark-end",
            LeafKind::CommentRangeStart { .. } => "comment-range-start",
            LeafKind::CommentRangeEnd { .. } => "comment-range-end",
            LeafKind::Field(_) => "field",
            LeafKind::FootnoteRef { .. } => "footnote-ref",
            LeafKind::EndnoteRef { .. } => "endnote-ref",
            LeafKind::Equation { .. } => "equation",
            LeafKind::Shape { .. } => "shape",
            LeafKind::Mention(_) => "mention",
        }
    }
}
