//! Path resolution and tree traversal (spec §4.B).

use crate::errors::OperationError;
use crate::model::node::Node;
use crate::path::Path;
use std::sync::Arc;

/// Walk from `root` following `path`'s indices. Fails with
/// `PathOutOfBounds` if an index is out of range for its level, or
/// `TraverseIntoLeaf` if the path tries to descend past a leaf node.
pub fn get_node_at_path(root: &Arc<Node>, path: &Path) -> Result<Arc<Node>, OperationError> {
    let mut current = root.clone();
    for (level, &index) in path.as_slice().iter().enumerate() {
        if current.is_leaf() {
            return Err(OperationError::TraverseIntoLeaf(Path::from(&path.as_slice()[..level])));
        }
        current = current
            .children()
            .get(index)
            .cloned()
            .ok_or_else(|| OperationError::PathOutOfBounds(Path::from(&path.as_slice()[..=level])))?;
    }
    Ok(current)
}

/// Like [`get_node_at_path`] but also returns the parent and the child
/// index within it — most operations need to splice at a parent, not just
/// read the target.
pub fn get_parent_and_index(
    root: &Arc<Node>,
    path: &Path,
) -> Result<(Arc<Node>, usize), OperationError> {
    let parent_path = path.parent().ok_or_else(|| OperationError::PathOutOfBounds(path.clone()))?;
    let parent = get_node_at_path(root, &parent_path)?;
    let index = path.last().unwrap();
    Ok((parent, index))
}

/// A single step of a depth-first, pre-order traversal.
pub struct Visit {
    pub node: Arc<Node>,
    pub path: Path,
}

/// Lazy depth-first pre-order traversal of the whole tree rooted at `root`,
/// yielding `(node, path)` pairs. Implemented as an explicit stack rather
/// than recursion so it can be driven incrementally (e.g. by selection
/// extraction, which wants to stop partway through a large document).
pub struct TraverseNodes {
    stack: Vec<(Arc<Node>, Path)>,
}

pub fn traverse_nodes(root: &Arc<Node>) -> TraverseNodes {
    TraverseNodes { stack: vec![(root.clone(), Path::new())] }
}

impl Iterator for TraverseNodes {
    type Item = Visit;

    fn next(&mut self) -> Option<Visit> {
        let (node, path) = self.stack.pop()?;
        for (i, child) in node.children().iter().enumerate().rev() {
            self.stack.push((child.clone(), path.child(i)));
        }
        Some(Visit { node, path })
    }
}

/// Traverse only the text leaves, in document order.
pub fn traverse_texts(root: &Arc<Node>) -> impl Iterator<Item = Visit> {
    traverse_nodes(root).filter(|v| v.node.is_text())
}

/// Traverse only nodes whose `kind_name()` equals `kind`.
pub fn traverse_by_type<'a>(root: &Arc<Node>, kind: &'a str) -> impl Iterator<Item = Visit> + 'a {
    traverse_nodes(root).filter(move |v| v.node.kind_name() == kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::factory;
    use crate::properties::ParagraphProperties;

    fn sample() -> Arc<Node> {
        let p1 = factory::simple_paragraph("Hello World");
        let p2 = factory::simple_paragraph("Second");
        factory::body(smallvec::smallvec![p1, p2])
    }

    #[test]
    fn get_node_at_path_resolves_nested_text() {
        let root = sample();
        let text = get_node_at_path(&root, &Path::from_indices([0, 0, 0])).unwrap();
        assert_eq!(text.text(), Some("Hello World"));
    }

    #[test]
    fn get_node_at_path_reports_out_of_bounds() {
        let root = sample();
        let err = get_node_at_path(&root, &Path::from_indices([5])).unwrap_err();
        assert!(matches!(err, OperationError::PathOutOfBounds(_)));
    }

    #[test]
    fn get_node_at_path_reports_traverse_into_leaf() {
        let root = sample();
        let err = get_node_at_path(&root, &Path::from_indices([0, 0, 0, 0])).unwrap_err();
        assert!(matches!(err, OperationError::TraverseIntoLeaf(_)));
    }

    #[test]
    fn traverse_texts_visits_in_document_order() {
        let root = sample();
        let texts: Vec<_> = traverse_texts(&root).map(|v| v.node.text().unwrap().to_string()).collect();
        assert_eq!(texts, vec!["Hello World".to_string(), "Second".to_string()]);
    }

    #[test]
    fn traverse_by_type_filters_paragraphs() {
        let root = sample();
        let paragraphs: Vec<_> = traverse_by_type(&root, "paragraph").collect();
        assert_eq!(paragraphs.len(), 2);
        let _ = ParagraphProperties::default();
    }
}
