//! Optional tagged-PDF structure tree (spec §4.M: "optional tagged-PDF
//! structure tree"). One `/StructElem` per top-level page block, referenced
//! both from `/StructTreeRoot /K` in document order and from a per-page
//! `/ParentTree` entry keyed by page index — the same index each page's
//! `/StructParents` points back at. Grounded on the flat-list shape of this
//! crate's own `/Outlines` builder in `orchestrator.rs`, generalized from a
//! doubly-linked list to the array `/K`/`/ParentTree` a structure tree needs.

use crate::pdf::layout_contract::Block;
use crate::pdf::object::{dict, Object, ObjectId};
use crate::pdf::writer::PdfWriter;

/// The structure type a top-level block's marked-content section is tagged
/// with. Nested content isn't separately tagged (see `orchestrator`'s
/// `paint_top_level_block` doc comment).
pub fn role_for(block: &Block) -> &'static str {
    match block {
        Block::Paragraph(_) => "P",
        Block::Table(_) => "Table",
        Block::Image(_) => "Figure",
        Block::Shape(_) => "Figure",
    }
}

/// Builds one `/StructElem` per `(role, mcid)` pair on `page_id`, in MCID
/// order, and returns their object ids.
pub fn build_page_struct_elems(writer: &mut PdfWriter, struct_root: ObjectId, page_id: ObjectId, roles: &[&'static str]) -> Vec<ObjectId> {
    roles
        .iter()
        .enumerate()
        .map(|(mcid, role)| {
            writer.add(Object::Dictionary(dict! {
                "Type" => "StructElem",
                "S" => *role,
                "P" => struct_root,
                "Pg" => page_id,
                "K" => mcid as i64,
            }))
        })
        .collect()
}

/// Fills the already-reserved `struct_root` id with `/StructTreeRoot`:
/// `/K` lists every page's struct elements in document order; `/ParentTree`
/// is a number tree keyed by page index.
pub fn fill_struct_tree_root(writer: &mut PdfWriter, struct_root: ObjectId, pages: &[Vec<ObjectId>]) {
    let all_kids: Vec<Object> = pages.iter().flatten().map(|id| Object::Reference(*id)).collect();

    let mut nums = Vec::new();
    for (page_index, elems) in pages.iter().enumerate() {
        nums.push(Object::Int(page_index as i64));
        nums.push(Object::Array(elems.iter().map(|id| Object::Reference(*id)).collect()));
    }
    let parent_tree = writer.add(Object::Dictionary(dict! {
        "Nums" => Object::Array(nums),
    }));

    writer.fill(
        struct_root,
        Object::Dictionary(dict! {
            "Type" => "StructTreeRoot",
            "K" => Object::Array(all_kids),
            "ParentTree" => parent_tree,
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::layout_contract::ParagraphBlock;

    #[test]
    fn role_for_paragraph_is_p() {
        let block = Block::Paragraph(ParagraphBlock::default());
        assert_eq!(role_for(&block), "P");
    }

    #[test]
    fn struct_tree_root_lists_kids_across_pages() {
        let mut writer = PdfWriter::new();
        let struct_root = writer.reserve();
        let page_a = writer.reserve();
        let page_b = writer.reserve();
        writer.fill(page_a, Object::Dictionary(vec![]));
        writer.fill(page_b, Object::Dictionary(vec![]));

        let elems_a = build_page_struct_elems(&mut writer, struct_root, page_a, &["P", "Table"]);
        let elems_b = build_page_struct_elems(&mut writer, struct_root, page_b, &["Figure"]);
        assert_eq!(elems_a.len(), 2);
        assert_eq!(elems_b.len(), 1);

        fill_struct_tree_root(&mut writer, struct_root, &[elems_a, elems_b]);
        let catalog = writer.add(Object::Dictionary(dict! { "Type" => "Catalog", "Pages" => page_a }));
        let bytes = writer.generate(catalog, None).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Type /StructTreeRoot"));
        assert!(text.contains("/ParentTree"));
    }
}
