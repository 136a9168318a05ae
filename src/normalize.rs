//! The five structural-invariant rules run to a fixed point after every
//! batch commit (spec §4.E). Each rule scans the *current* tree and emits
//! operations; the engine applies them sequentially, and because each rule
//! emits removals in descending index order, earlier paths in the same pass
//! stay valid as later ones are applied.

use crate::model::node::{ElementKind, LeafKind, Node};
use crate::model::traversal::traverse_nodes;
use crate::ops::{apply_operation, Operation};
use crate::path::Path;
use std::sync::Arc;
use tracing::instrument;

/// Scans `root` once and returns the ops every rule would emit, in rule
/// order. An empty result means `root` already satisfies every invariant.
pub fn get_normalization_ops(root: &Arc<Node>) -> Vec<Operation> {
    let mut ops = Vec::new();
    ops.extend(empty_table_cells_need_a_paragraph(root));
    ops.extend(empty_paragraphs_need_a_run(root));
    ops.extend(adjacent_text_nodes_should_merge(root));
    ops.extend(empty_runs_should_be_removed(root));
    ops.extend(adjacent_runs_with_equal_properties_should_merge(root));
    ops
}

pub fn needs_normalization(root: &Arc<Node>) -> bool {
    !get_normalization_ops(root).is_empty()
}

/// Runs [`get_normalization_ops`] to a fixed point, applying each pass's ops
/// against the tree that resulted from the previous pass.
#[instrument(level = "debug", skip(root))]
pub fn normalize(root: &Arc<Node>) -> Arc<Node> {
    normalize_with_ops(root).0
}

/// Same fixed-point walk as [`normalize`], but also returns every op that
/// was actually applied, in application order — the editor records these
/// into the committed undo batch so undo can invert them too (spec §4.E:
/// normalization is "emitting operations", not a silent rewrite; spec §8
/// property 7 requires undo to restore the exact prior tree, which isn't
/// possible if normalization's merges/removals are never recorded).
pub fn normalize_with_ops(root: &Arc<Node>) -> (Arc<Node>, Vec<Operation>) {
    let mut current = root.clone();
    let mut applied = Vec::new();
    loop {
        let ops = get_normalization_ops(&current);
        if ops.is_empty() {
            return (current, applied);
        }
        for op in &ops {
            match apply_operation(&current, op) {
                Ok(next) => {
                    current = next;
                    applied.push(op.clone());
                }
                Err(_) => continue,
            }
        }
    }
}

fn empty_table_cells_need_a_paragraph(root: &Arc<Node>) -> Vec<Operation> {
    traverse_nodes(root)
        .filter(|v| matches!(v.node.as_ref(), Node::Element(e) if matches!(e.kind, ElementKind::TableCell(_))))
        .filter(|v| v.node.children().is_empty())
        .map(|v| Operation::InsertNode {
            path: v.path.child(0),
            node: crate::model::factory::paragraph(Default::default(), Default::default()),
        })
        .collect()
}

fn empty_paragraphs_need_a_run(root: &Arc<Node>) -> Vec<Operation> {
    traverse_nodes(root)
        .filter(|v| matches!(v.node.as_ref(), Node::Element(e) if matches!(e.kind, ElementKind::Paragraph(_))))
        .filter(|v| v.node.children().is_empty())
        .map(|v| Operation::InsertNode {
            path: v.path.child(0),
            node: crate::model::factory::run(Default::default(), ""),
        })
        .collect()
}

fn adjacent_text_nodes_should_merge(root: &Arc<Node>) -> Vec<Operation> {
    let mut ops = Vec::new();
    for visit in traverse_nodes(root) {
        if !visit.node.is_element() {
            continue;
        }
        let children = visit.node.children();
        // Walk in descending order so a merge's path stays valid for
        // subsequent merges found earlier in the same child list.
        let mut i = children.len();
        while i > 1 {
            i -= 1;
            if children[i].is_text() && children[i - 1].is_text() {
                ops.push(Operation::MergeNode { path: visit.path.child(i), position: 0, properties: None });
            }
        }
    }
    ops
}

fn empty_runs_should_be_removed(root: &Arc<Node>) -> Vec<Operation> {
    let mut ops = Vec::new();
    for visit in traverse_nodes(root) {
        if !matches!(visit.node.as_ref(), Node::Element(e) if matches!(e.kind, ElementKind::Paragraph(_))) {
            continue;
        }
        let children = visit.node.children();
        if children.len() <= 1 {
            continue;
        }
        let mut i = children.len();
        while i > 0 {
            i -= 1;
            let child = &children[i];
            let is_empty_run = matches!(child.as_ref(), Node::Element(e) if matches!(e.kind, ElementKind::Run(_)))
                && child.children().iter().all(|c| c.text() == Some(""));
            if is_empty_run && children.len() > 1 {
                ops.push(Operation::RemoveNode { path: visit.path.child(i), node: child.clone() });
            }
        }
    }
    ops
}

fn adjacent_runs_with_equal_properties_should_merge(root: &Arc<Node>) -> Vec<Operation> {
    let mut ops = Vec::new();
    for visit in traverse_nodes(root) {
        if !visit.node.is_element() {
            continue;
        }
        let children = visit.node.children();
        let mut i = children.len();
        while i > 1 {
            i -= 1;
            let (a, b) = (&children[i - 1], &children[i]);
            if let (Node::Element(ea), Node::Element(eb)) = (a.as_ref(), b.as_ref()) {
                if let (ElementKind::Run(pa), ElementKind::Run(pb)) = (&ea.kind, &eb.kind) {
                    if pa == pb {
                        ops.push(Operation::MergeNode { path: visit.path.child(i), position: 0, properties: None });
                    }
                }
            }
        }
    }
    ops
}

/// `getNodeAtPath`-free sanity check used by the editor: whether `path`
/// still addresses a text leaf after a normalization pass that may have
/// merged or removed nodes around it. Not part of the five rules; a small
/// convenience the coordinator uses when restoring selection post-normalize.
pub fn path_addresses_text(root: &Arc<Node>, path: &Path) -> bool {
    matches!(crate::model::traversal::get_node_at_path(root, path), Ok(n) if matches!(n.as_ref(), Node::Leaf(l) if matches!(l.kind, LeafKind::Text(_))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::factory;
    use smallvec::smallvec;

    #[test]
    fn empty_table_cell_gets_a_paragraph() {
        let cell = factory::table_cell(Default::default(), Default::default());
        let row = factory::table_row(smallvec![cell]);
        let table = factory::table(Default::default(), smallvec![row]);
        let root = factory::document(factory::body(smallvec![table]));
        let normalized = normalize(&root);
        let cell = &normalized.children()[0].children()[0].children()[0];
        assert_eq!(cell.children().len(), 1);
        assert_eq!(cell.children()[0].kind_name(), "paragraph");
    }

    #[test]
    fn adjacent_text_nodes_merge() {
        let run = Arc::new(Node::Element(crate::model::node::ElementNode::new(
            ElementKind::Run(Default::default()),
            smallvec![factory::text_node("Hello"), factory::text_node(" World")],
        )));
        let paragraph = factory::paragraph(Default::default(), smallvec![run]);
        let root = factory::document(factory::body(smallvec![paragraph]));
        assert!(needs_normalization(&root));
        let normalized = normalize(&root);
        let run = &normalized.children()[0].children()[0].children()[0];
        assert_eq!(run.children().len(), 1);
        assert_eq!(run.children()[0].text(), Some("Hello World"));
    }

    #[test]
    fn adjacent_runs_with_equal_properties_merge() {
        let run_a = factory::run(Default::default(), "foo");
        let run_b = factory::run(Default::default(), "bar");
        let paragraph = factory::paragraph(Default::default(), smallvec![run_a, run_b]);
        let root = factory::document(factory::body(smallvec![paragraph]));
        let normalized = normalize(&root);
        let runs = normalized.children()[0].children()[0].children();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].children()[0].text(), Some("foobar"));
    }

    #[test]
    fn already_normalized_document_needs_no_changes() {
        let root = factory::document(factory::body(smallvec![factory::simple_paragraph("ok")]));
        assert!(!needs_normalization(&root));
    }
}
