//! The operation algebra (spec §4.D): nine atomic operations, each
//! invertible, each applied by cloning only the nodes on its mutation path
//! so untouched subtrees stay reference-equal (spec §8 property 3).

mod properties_patch;
mod tree_edit;

use crate::errors::OperationError;
use crate::model::node::{Children, ElementNode, LeafKind, LeafNode, Node};
use crate::model::traversal::get_node_at_path;
use crate::path::{Path, Range};
use crate::properties::PropertyPatch;
use std::sync::Arc;
use tracing::instrument;

#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    InsertText { path: Path, offset: usize, text: String },
    DeleteText { path: Path, offset: usize, text: String },
    InsertNode { path: Path, node: Arc<Node> },
    RemoveNode { path: Path, node: Arc<Node> },
    SplitNode { path: Path, position: usize, properties: Option<PropertyPatch> },
    MergeNode { path: Path, position: usize, properties: Option<PropertyPatch> },
    MoveNode { path: Path, new_path: Path },
    SetProperties { path: Path, properties: PropertyPatch, old_properties: PropertyPatch },
    SetSelection { old_selection: Option<Range>, new_selection: Option<Range> },
}

/// Applies `op` to `document_root`, returning a new root. `document_root`
/// is never mutated; every subtree not on the operation's path is reused by
/// `Arc` reference (spec §8 property 3). `set_selection` is state-only and
/// returns the root unchanged — the editor coordinator applies it to its own
/// selection field instead (spec §4.D).
#[instrument(level = "debug", skip(root), fields(op = op_name(op)))]
pub fn apply_operation(root: &Arc<Node>, op: &Operation) -> Result<Arc<Node>, OperationError> {
    match op {
        Operation::InsertText { path, offset, text } => insert_text(root, path, *offset, text),
        Operation::DeleteText { path, offset, text } => delete_text(root, path, *offset, text),
        Operation::InsertNode { path, node } => insert_node(root, path, node),
        Operation::RemoveNode { path, .. } => remove_node(root, path).map(|(r, _)| r),
        Operation::SplitNode { path, position, properties } => {
            split_node(root, path, *position, properties.as_ref())
        }
        Operation::MergeNode { path, .. } => merge_node(root, path).map(|(r, _, _)| r),
        Operation::MoveNode { path, new_path } => move_node(root, path, new_path),
        Operation::SetProperties { path, properties, .. } => set_properties(root, path, properties),
        Operation::SetSelection { .. } => Ok(root.clone()),
    }
}

/// Produces the operation that undoes `op`. For ops that carry their own
/// pre-image (`delete_text`'s `text`, `remove_node`'s `node`, `set_properties`'s
/// `old_properties`) this is a pure data transform; it does not need the tree.
pub fn invert(op: &Operation) -> Operation {
    match op {
        Operation::InsertText { path, offset, text } => {
            Operation::DeleteText { path: path.clone(), offset: *offset, text: text.clone() }
        }
        Operation::DeleteText { path, offset, text } => {
            Operation::InsertText { path: path.clone(), offset: *offset, text: text.clone() }
        }
        Operation::InsertNode { path, node } => Operation::RemoveNode { path: path.clone(), node: node.clone() },
        Operation::RemoveNode { path, node } => Operation::InsertNode { path: path.clone(), node: node.clone() },
        Operation::SplitNode { path, position, properties } => Operation::MergeNode {
            path: path.next_sibling().expect("split path always has a last component"),
            position: *position,
            properties: properties.clone(),
        },
        Operation::MergeNode { path, position, properties } => Operation::SplitNode {
            path: path.previous_sibling().expect("merge path always has a last component"),
            position: *position,
            properties: properties.clone(),
        },
        Operation::MoveNode { path, new_path } => {
            Operation::MoveNode { path: new_path.clone(), new_path: path.clone() }
        }
        Operation::SetProperties { path, properties, old_properties } => Operation::SetProperties {
            path: path.clone(),
            properties: old_properties.clone(),
            old_properties: properties.clone(),
        },
        Operation::SetSelection { old_selection, new_selection } => Operation::SetSelection {
            old_selection: new_selection.clone(),
            new_selection: old_selection.clone(),
        },
    }
}

fn op_name(op: &Operation) -> &'static str {
    match op {
        Operation::InsertText { .. } => "insert_text",
        Operation::DeleteText { .. } => "delete_text",
        Operation::InsertNode { .. } => "insert_node",
        Operation::RemoveNode { .. } => "remove_node",
        Operation::SplitNode { .. } => "split_node",
        Operation::MergeNode { .. } => "merge_node",
        Operation::MoveNode { .. } => "move_node",
        Operation::SetProperties { .. } => "set_properties",
        Operation::SetSelection { .. } => "set_selection",
    }
}

fn text_chars(text: &str) -> Vec<char> {
    text.chars().collect()
}

fn insert_text(root: &Arc<Node>, path: &Path, offset: usize, text: &str) -> Result<Arc<Node>, OperationError> {
    tree_edit::replace_at_path(root, path, &mut |node| {
        let existing = node.text().ok_or_else(|| OperationError::WrongNodeKind {
            path: path.clone(),
            expected: "text",
        })?;
        let mut chars = text_chars(existing);
        let at = offset.min(chars.len());
        for (i, c) in text.chars().enumerate() {
            chars.insert(at + i, c);
        }
        let leaf = node.as_leaf().unwrap();
        Ok(Arc::new(Node::Leaf(LeafNode {
            kind: LeafKind::Text(chars.into_iter().collect()),
            ..leaf.clone()
        })))
    })
}

fn delete_text(root: &Arc<Node>, path: &Path, offset: usize, text: &str) -> Result<Arc<Node>, OperationError> {
    let remove_len = text.chars().count();
    tree_edit::replace_at_path(root, path, &mut |node| {
        let existing = node.text().ok_or_else(|| OperationError::WrongNodeKind {
            path: path.clone(),
            expected: "text",
        })?;
        let mut chars = text_chars(existing);
        let start = offset.min(chars.len());
        let end = (start + remove_len).min(chars.len());
        chars.drain(start..end);
        let leaf = node.as_leaf().unwrap();
        Ok(Arc::new(Node::Leaf(LeafNode {
            kind: LeafKind::Text(chars.into_iter().collect()),
            ..leaf.clone()
        })))
    })
}

fn insert_node(root: &Arc<Node>, path: &Path, new_node: &Arc<Node>) -> Result<Arc<Node>, OperationError> {
    let parent_path = path.parent().ok_or_else(|| OperationError::PathOutOfBounds(path.clone()))?;
    let index = path.last().unwrap();
    tree_edit::replace_children_at(root, &parent_path, &mut |children: &Children| {
        if index > children.len() {
            return Err(OperationError::PathOutOfBounds(path.clone()));
        }
        let mut new_children = children.clone();
        new_children.insert(index, new_node.clone());
        Ok(new_children)
    })
}

fn remove_node(root: &Arc<Node>, path: &Path) -> Result<(Arc<Node>, Arc<Node>), OperationError> {
    let removed = get_node_at_path(root, path)?;
    let parent_path = path.parent().ok_or_else(|| OperationError::PathOutOfBounds(path.clone()))?;
    let index = path.last().unwrap();
    let new_root = tree_edit::replace_children_at(root, &parent_path, &mut |children: &Children| {
        if index >= children.len() {
            return Err(OperationError::PathOutOfBounds(path.clone()));
        }
        let mut new_children = children.clone();
        new_children.remove(index);
        Ok(new_children)
    })?;
    Ok((new_root, removed))
}

fn split_node(
    root: &Arc<Node>,
    path: &Path,
    position: usize,
    properties: Option<&PropertyPatch>,
) -> Result<Arc<Node>, OperationError> {
    let target = get_node_at_path(root, path)?;
    let (first, second) = split_single_node(&target, position, properties, path)?;
    let parent_path = path.parent().ok_or_else(|| OperationError::PathOutOfBounds(path.clone()))?;
    let index = path.last().unwrap();
    tree_edit::replace_children_at(root, &parent_path, &mut |children: &Children| {
        let mut new_children = children.clone();
        new_children[index] = first.clone();
        new_children.insert(index + 1, second.clone());
        Ok(new_children)
    })
}

fn split_single_node(
    node: &Arc<Node>,
    position: usize,
    properties: Option<&PropertyPatch>,
    path: &Path,
) -> Result<(Arc<Node>, Arc<Node>), OperationError> {
    match node.as_ref() {
        Node::Leaf(leaf) => match &leaf.kind {
            LeafKind::Text(text) => {
                let chars = text_chars(text);
                let at = position.min(chars.len());
                let first_text: String = chars[..at].iter().collect();
                let second_text: String = chars[at..].iter().collect();
                let first = Arc::new(Node::Leaf(LeafNode { kind: LeafKind::Text(first_text), ..leaf.clone() }));
                let second = Arc::new(Node::Leaf(LeafNode::new(LeafKind::Text(second_text))));
                Ok((first, second))
            }
            _ => Err(OperationError::WrongNodeKind { path: path.clone(), expected: "text or element" }),
        },
        Node::Element(element) => {
            let at = position.min(element.children.len());
            let first_children: Children = element.children[..at].into();
            let second_children: Children = element.children[at..].into();
            let first = Arc::new(Node::Element(ElementNode {
                children: first_children,
                ..element.clone()
            }));
            let second_kind = match properties {
                Some(patch) => properties_patch::apply_patch(&Node::Element(element.clone()), patch, path)?,
                None => Node::Element(element.clone()),
            };
            let second_kind = match second_kind {
                Node::Element(e) => e.kind,
                Node::Leaf(_) => unreachable!("element split always stays an element"),
            };
            let second = Arc::new(Node::Element(ElementNode::new(second_kind, second_children)));
            Ok((first, second))
        }
    }
}

fn merge_node(root: &Arc<Node>, path: &Path) -> Result<(Arc<Node>, usize, Option<PropertyPatch>), OperationError> {
    let index = path.last().ok_or_else(|| OperationError::NoPreviousSibling(path.clone()))?;
    if index == 0 {
        return Err(OperationError::NoPreviousSibling(path.clone()));
    }
    let parent_path = path.parent().ok_or_else(|| OperationError::PathOutOfBounds(path.clone()))?;
    let parent = get_node_at_path(root, &parent_path)?;
    let children = parent.children();
    let previous = children.get(index - 1).ok_or_else(|| OperationError::NoPreviousSibling(path.clone()))?;
    let current = children.get(index).ok_or_else(|| OperationError::PathOutOfBounds(path.clone()))?;

    let (merged, split_position, old_properties) = merge_pair(previous, current, path)?;
    let new_root = tree_edit::replace_children_at(root, &parent_path, &mut |children: &Children| {
        let mut new_children = children.clone();
        new_children[index - 1] = merged.clone();
        new_children.remove(index);
        Ok(new_children)
    })?;
    Ok((new_root, split_position, old_properties))
}

fn merge_pair(
    previous: &Arc<Node>,
    current: &Arc<Node>,
    path: &Path,
) -> Result<(Arc<Node>, usize, Option<PropertyPatch>), OperationError> {
    match (previous.as_ref(), current.as_ref()) {
        (Node::Leaf(a), Node::Leaf(b)) => match (&a.kind, &b.kind) {
            (LeafKind::Text(ta), LeafKind::Text(tb)) => {
                let split_position = ta.chars().count();
                let merged_text = format!("{ta}{tb}");
                let merged = Arc::new(Node::Leaf(LeafNode { kind: LeafKind::Text(merged_text), ..a.clone() }));
                Ok((merged, split_position, None))
            }
            _ => Err(OperationError::MergeMismatch { path: path.clone() }),
        },
        (Node::Element(a), Node::Element(b)) => {
            if std::mem::discriminant(&a.kind) != std::mem::discriminant(&b.kind) {
                return Err(OperationError::MergeMismatch { path: path.clone() });
            }
            let split_position = a.children.len();
            let old_properties = properties_patch::fields_of(current);
            let mut merged_children = a.children.clone();
            merged_children.extend(b.children.iter().cloned());
            let merged = Arc::new(Node::Element(ElementNode { children: merged_children, ..a.clone() }));
            Ok((merged, split_position, old_properties))
        }
        _ => Err(OperationError::MergeMismatch { path: path.clone() }),
    }
}

fn move_node(root: &Arc<Node>, path: &Path, new_path: &Path) -> Result<Arc<Node>, OperationError> {
    let (after_remove, moved) = remove_node(root, path)?;
    let adjusted = new_path.transform_after_remove(path).unwrap_or_else(|| new_path.clone());
    insert_node(&after_remove, &adjusted, &moved)
}

fn set_properties(root: &Arc<Node>, path: &Path, patch: &PropertyPatch) -> Result<Arc<Node>, OperationError> {
    tree_edit::replace_at_path(root, path, &mut |node| {
        properties_patch::apply_patch(node, patch, path).map(Arc::new)
    })
}

/// Builds the `set_properties` op for `path`, capturing the node's current
/// values for `patch`'s keys as `old_properties` so the op is invertible.
pub fn build_set_properties(
    root: &Arc<Node>,
    path: &Path,
    patch: PropertyPatch,
) -> Result<Operation, OperationError> {
    let node = get_node_at_path(root, path)?;
    let old_properties = properties_patch::current_patch_for(&node, &patch, path)?;
    Ok(Operation::SetProperties { path: path.clone(), properties: patch, old_properties })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::factory;
    use crate::properties::PropertyValue;

    fn doc_with_paragraph(text: &str) -> Arc<Node> {
        factory::document(factory::body(smallvec::smallvec![factory::simple_paragraph(text)]))
    }

    #[test]
    fn insert_text_is_inverted_by_delete_text() {
        let root = doc_with_paragraph("Hello World");
        let path = Path::from_indices([0, 0, 0, 0]);
        let op = Operation::InsertText { path: path.clone(), offset: 5, text: ",".to_string() };
        let after = apply_operation(&root, &op).unwrap();
        assert_eq!(get_node_at_path(&after, &path).unwrap().text(), Some("Hello, World"));
        let back = apply_operation(&after, &invert(&op)).unwrap();
        assert_eq!(get_node_at_path(&back, &path).unwrap().text(), Some("Hello World"));
    }

    #[test]
    fn structural_sharing_outside_mutation_path() {
        let p1 = factory::simple_paragraph("alpha");
        let p2 = factory::simple_paragraph("beta");
        let root = factory::document(factory::body(smallvec::smallvec![p1, p2.clone()]));
        let path = Path::from_indices([0, 0, 0, 0, 0]);
        let op = Operation::InsertText { path, offset: 0, text: "X".to_string() };
        let after = apply_operation(&root, &op).unwrap();
        assert!(Arc::ptr_eq(&after.children()[0].children()[1], &p2));
    }

    #[test]
    fn insert_node_then_remove_node_round_trips() {
        let root = doc_with_paragraph("only");
        let new_paragraph = factory::simple_paragraph("second");
        let insert_path = Path::from_indices([0, 1]);
        let op = Operation::InsertNode { path: insert_path.clone(), node: new_paragraph.clone() };
        let after = apply_operation(&root, &op).unwrap();
        assert_eq!(after.children()[0].children().len(), 2);
        let back = apply_operation(&after, &invert(&op)).unwrap();
        assert_eq!(back.children()[0].children().len(), 1);
    }

    #[test]
    fn split_text_then_merge_round_trips() {
        let root = doc_with_paragraph("Hello World");
        let run_text_path = Path::from_indices([0, 0, 0, 0]);
        let split_op = Operation::SplitNode { path: run_text_path.clone(), position: 5, properties: None };
        let after_split = apply_operation(&root, &split_op).unwrap();
        let run = &after_split.children()[0].children()[0];
        assert_eq!(run.children().len(), 2);
        assert_eq!(run.children()[0].text(), Some("Hello"));
        assert_eq!(run.children()[1].text(), Some(" World"));

        let merge_op = invert(&split_op);
        let merged = apply_operation(&after_split, &merge_op).unwrap();
        assert_eq!(merged.children()[0].children()[0].children().len(), 1);
        assert_eq!(merged.children()[0].children()[0].children()[0].text(), Some("Hello World"));
    }

    #[test]
    fn merge_mismatch_on_differing_kinds() {
        let run = factory::run(Default::default(), "a");
        let paragraph = factory::simple_paragraph("b");
        let body = factory::body(smallvec::smallvec![run, paragraph]);
        let root = factory::document(body);
        let err = merge_node(&root, &Path::from_indices([0, 1])).unwrap_err();
        assert!(matches!(err, OperationError::MergeMismatch { .. }));
    }

    #[test]
    fn set_properties_round_trips_via_old_properties() {
        let root = doc_with_paragraph("hi");
        let run_path = Path::from_indices([0, 0, 0]);
        let patch = PropertyPatch::new().set("bold", PropertyValue::Bool(true));
        let op = build_set_properties(&root, &run_path, patch).unwrap();
        let after = apply_operation(&root, &op).unwrap();
        let run_kind = after.children()[0].children()[0].as_element().unwrap();
        match &run_kind.kind {
            crate::model::node::ElementKind::Run(p) => assert_eq!(p.bold, Some(true)),
            _ => panic!("expected run"),
        }
        let back = apply_operation(&after, &invert(&op)).unwrap();
        let run_kind = back.children()[0].children()[0].as_element().unwrap();
        match &run_kind.kind {
            crate::model::node::ElementKind::Run(p) => assert_eq!(p.bold, None),
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn move_node_relocates_subtree() {
        let p1 = factory::simple_paragraph("first");
        let p2 = factory::simple_paragraph("second");
        let root = factory::document(factory::body(smallvec::smallvec![p1, p2]));
        let op = Operation::MoveNode { path: Path::from_indices([0, 0]), new_path: Path::from_indices([0, 2]) };
        let after = apply_operation(&root, &op).unwrap();
        let texts: Vec<_> = after.children()[0]
            .children()
            .iter()
            .map(|p| p.children()[0].children()[0].text().unwrap().to_string())
            .collect();
        assert_eq!(texts, vec!["second".to_string(), "first".to_string()]);
    }
}
