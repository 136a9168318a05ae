//! Node factory constructors (spec §4.B). Each wraps [`ElementNode::new`] or
//! [`LeafNode::new`] so callers never have to think about id allocation or
//! the `Arc` wrapping that makes a node shareable as a child.

use crate::model::node::{Children, ElementKind, ElementNode, LeafKind, LeafNode, Node};
use crate::properties::{
    FieldProperties, HyperlinkProperties, ImageProperties, MentionProperties,
    ParagraphProperties, RunProperties, SectionProperties, ShapeGeometry, ShapeProperties,
    TableCellProperties, TableProperties,
};
use std::sync::Arc;

fn elem(kind: ElementKind, children: Children) -> Arc<Node> {
    Arc::new(Node::Element(ElementNode::new(kind, children)))
}

fn leaf(kind: LeafKind) -> Arc<Node> {
    Arc::new(Node::Leaf(LeafNode::new(kind)))
}

pub fn document(body: Arc<Node>) -> Arc<Node> {
    elem(ElementKind::Document, Children::from_elem(body, 1))
}

pub fn body(children: Children) -> Arc<Node> {
    elem(ElementKind::Body, children)
}

pub fn section(properties: SectionProperties, children: Children) -> Arc<Node> {
    elem(ElementKind::Section(properties), children)
}

pub fn paragraph(properties: ParagraphProperties, children: Children) -> Arc<Node> {
    elem(ElementKind::Paragraph(properties), children)
}

/// A paragraph containing a single run with `text`, using default
/// properties — the common case for building documents programmatically.
pub fn simple_paragraph(text: &str) -> Arc<Node> {
    paragraph(ParagraphProperties::default(), Children::from_elem(run(Default::default(), text), 1))
}

pub fn run(properties: RunProperties, text: &str) -> Arc<Node> {
    elem(ElementKind::Run(properties), Children::from_elem(text_node(text), 1))
}

pub fn text_node(text: &str) -> Arc<Node> {
    leaf(LeafKind::Text(text.to_string()))
}

pub fn table(properties: TableProperties, rows: Children) -> Arc<Node> {
    elem(ElementKind::Table(properties), rows)
}

pub fn table_row(cells: Children) -> Arc<Node> {
    elem(ElementKind::TableRow, cells)
}

pub fn table_cell(properties: TableCellProperties, children: Children) -> Arc<Node> {
    elem(ElementKind::TableCell(properties), children)
}

pub fn header(children: Children) -> Arc<Node> {
    elem(ElementKind::Header, children)
}

pub fn footer(children: Children) -> Arc<Node> {
    elem(ElementKind::Footer, children)
}

pub fn hyperlink(properties: HyperlinkProperties, children: Children) -> Arc<Node> {
    elem(ElementKind::Hyperlink(properties), children)
}

pub fn drawing(children: Children) -> Arc<Node> {
    elem(ElementKind::Drawing, children)
}

pub fn shape_group(children: Children) -> Arc<Node> {
    elem(ElementKind::ShapeGroup, children)
}

pub fn textbox(children: Children) -> Arc<Node> {
    elem(ElementKind::Textbox, children)
}

pub fn image(properties: ImageProperties) -> Arc<Node> {
    leaf(LeafKind::Image(properties))
}

pub fn page_break() -> Arc<Node> {
    leaf(LeafKind::PageBreak)
}

pub fn line_break() -> Arc<Node> {
    leaf(LeafKind::LineBreak)
}

pub fn column_break() -> Arc<Node> {
    leaf(LeafKind::ColumnBreak)
}

pub fn tab() -> Arc<Node> {
    leaf(LeafKind::Tab)
}

pub fn bookmark_start(id: &str) -> Arc<Node> {
    leaf(LeafKind::BookmarkStart { id: id.to_string() })
}

pub fn bookmark_end(id: &str) -> Arc<Node> {
    leaf(LeafKind::BookmarkEnd { id: id.to_string() })
}

pub fn comment_range_start(id: &str) -> Arc<Node> {
    leaf(LeafKind::CommentRangeStart { id: id.to_string() })
}

pub fn comment_range_end(id: &str) -> Arc<Node> {
    leaf(LeafKind::CommentRangeEnd { id: id.to_string() })
}

pub fn field(properties: FieldProperties) -> Arc<Node> {
    leaf(LeafKind::Field(properties))
}

pub fn footnote_ref(id: &str) -> Arc<Node> {
    leaf(LeafKind::FootnoteRef { id: id.to_string() })
}

pub fn endnote_ref(id: &str) -> Arc<Node> {
    leaf(LeafKind::EndnoteRef { id: id.to_string() })
}

pub fn equation(latex: &str) -> Arc<Node> {
    leaf(LeafKind::Equation { latex: latex.to_string() })
}

pub fn shape(properties: ShapeProperties, geometry: ShapeGeometry) -> Arc<Node> {
    leaf(LeafKind::Shape { properties, geometry })
}

pub fn mention(properties: MentionProperties) -> Arc<Node> {
    leaf(LeafKind::Mention(properties))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factories_allocate_distinct_ids() {
        let a = text_node("a");
        let b = text_node("b");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn simple_paragraph_has_one_run_with_one_text_child() {
        let p = simple_paragraph("hi");
        assert_eq!(p.children().len(), 1);
        let r = &p.children()[0];
        assert_eq!(r.children().len(), 1);
        assert_eq!(r.children()[0].text(), Some("hi"));
    }
}
