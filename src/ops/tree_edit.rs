//! Path-directed tree surgery shared by every operation: clone only the
//! nodes on the path from the mutation site to the root, reuse everything
//! else by `Arc` pointer (spec §8 property 3, §9 Design Notes).

use crate::errors::OperationError;
use crate::model::node::{Children, ElementNode, Node};
use crate::path::Path;
use std::sync::Arc;

/// Replaces the node at `path` with `f(old_node)`'s result, cloning only
/// ancestors along the way.
pub fn replace_at_path(
    root: &Arc<Node>,
    path: &Path,
    f: &mut dyn FnMut(&Arc<Node>) -> Result<Arc<Node>, OperationError>,
) -> Result<Arc<Node>, OperationError> {
    replace_at_depth(root, path, 0, f)
}

fn replace_at_depth(
    node: &Arc<Node>,
    path: &Path,
    depth: usize,
    f: &mut dyn FnMut(&Arc<Node>) -> Result<Arc<Node>, OperationError>,
) -> Result<Arc<Node>, OperationError> {
    if depth == path.len() {
        return f(node);
    }
    let element = node
        .as_element()
        .ok_or_else(|| OperationError::TraverseIntoLeaf(Path::from(&path.as_slice()[..depth])))?;
    let index = path.as_slice()[depth];
    let child = element
        .children
        .get(index)
        .ok_or_else(|| OperationError::PathOutOfBounds(Path::from(&path.as_slice()[..=depth])))?;
    let new_child = replace_at_depth(child, path, depth + 1, f)?;
    let mut new_children = element.children.clone();
    new_children[index] = new_child;
    Ok(Arc::new(Node::Element(ElementNode { children: new_children, ..element.clone() })))
}

/// Replaces the children of the element at `parent_path` with `f(old_children)`.
pub fn replace_children_at(
    root: &Arc<Node>,
    parent_path: &Path,
    f: &mut dyn FnMut(&Children) -> Result<Children, OperationError>,
) -> Result<Arc<Node>, OperationError> {
    replace_at_path(root, parent_path, &mut |node| {
        let element = node
            .as_element()
            .ok_or_else(|| OperationError::TraverseIntoLeaf(parent_path.clone()))?;
        let children = f(&element.children)?;
        Ok(Arc::new(Node::Element(ElementNode { children, ..element.clone() })))
    })
}
