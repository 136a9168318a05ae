//! Selection queries and text extraction (spec §4.H).

use crate::model::node::Node;
use crate::model::traversal::{get_node_at_path, traverse_texts};
use crate::path::{Path, Point, Range};
use std::sync::Arc;

pub fn is_collapsed(range: &Range) -> bool {
    range.is_collapsed()
}

/// Orients `range` so `anchor` precedes or equals `focus` in document order.
pub fn normalize(range: &Range) -> Range {
    range.normalize()
}

pub fn collapse(at: Point) -> Range {
    Range::collapsed(at)
}

pub fn create_range(anchor: Point, focus: Point) -> Range {
    Range::new(anchor, focus)
}

/// Extracts the text spanned by `range`, traversing text nodes between
/// anchor and focus in document order. A `\n` is inserted between
/// consecutive text nodes whose nearest-paragraph-ancestor path differs, so
/// paragraph boundaries survive even through paragraphs that contribute no
/// text of their own. Any path-resolution failure yields the empty string
/// rather than propagating an error (spec §4.H: "failure... yields the
/// empty string, never throws").
pub fn get_selected_text(root: &Arc<Node>, range: &Range) -> String {
    let normalized = range.normalize();
    let start = &normalized.anchor;
    let end = &normalized.focus;

    if get_node_at_path(root, &start.path).is_err() || get_node_at_path(root, &end.path).is_err() {
        return String::new();
    }

    let mut out = String::new();
    let mut previous_paragraph: Option<Path> = None;
    let mut started = false;

    for visit in traverse_texts(root) {
        let in_range = visit.path.compare(&start.path) != std::cmp::Ordering::Less
            && visit.path.compare(&end.path) != std::cmp::Ordering::Greater;
        if !in_range {
            if started {
                break;
            }
            continue;
        }
        started = true;

        let text = visit.node.text().unwrap_or("");
        let paragraph_path = nearest_paragraph_ancestor(&visit.path);
        if let Some(prev) = &previous_paragraph {
            if Some(prev) != paragraph_path.as_ref() {
                out.push('\n');
            }
        }
        previous_paragraph = paragraph_path;

        let chars: Vec<char> = text.chars().collect();
        let is_start_node = visit.path.equals(&start.path);
        let is_end_node = visit.path.equals(&end.path);
        let slice_start = if is_start_node { start.offset.min(chars.len()) } else { 0 };
        let slice_end = if is_end_node { end.offset.min(chars.len()) } else { chars.len() };
        if slice_start < slice_end {
            out.extend(&chars[slice_start..slice_end]);
        }
    }
    out
}

/// The path to the nearest ancestor that addresses a `paragraph`-ish
/// boundary, approximated here as the path one level shallower than the
/// text node's run (text → run → paragraph). Used only to detect paragraph
/// transitions for inserting separators, not to resolve an actual node.
fn nearest_paragraph_ancestor(text_path: &Path) -> Option<Path> {
    if text_path.len() < 2 {
        return None;
    }
    text_path.parent().and_then(|run_path| run_path.parent())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::factory;
    use smallvec::smallvec;

    fn two_paragraph_doc() -> Arc<Node> {
        let p1 = factory::simple_paragraph("Hello World");
        let p2 = factory::simple_paragraph("Second line");
        factory::document(factory::body(smallvec![p1, p2]))
    }

    #[test]
    fn selected_text_within_one_text_node() {
        let root = two_paragraph_doc();
        let anchor = Point::new(Path::from_indices([0, 0, 0, 0]), 0);
        let focus = Point::new(Path::from_indices([0, 0, 0, 0]), 5);
        assert_eq!(get_selected_text(&root, &Range::new(anchor, focus)), "Hello");
    }

    #[test]
    fn selected_text_across_paragraphs_inserts_newline() {
        let root = two_paragraph_doc();
        let anchor = Point::new(Path::from_indices([0, 0, 0, 0]), 6);
        let focus = Point::new(Path::from_indices([0, 1, 0, 0]), 6);
        assert_eq!(get_selected_text(&root, &Range::new(anchor, focus)), "World\nSecond");
    }

    #[test]
    fn selected_text_is_symmetric_under_reversal() {
        let root = two_paragraph_doc();
        let a = Point::new(Path::from_indices([0, 0, 0, 0]), 0);
        let b = Point::new(Path::from_indices([0, 1, 0, 0]), 6);
        let forward = get_selected_text(&root, &Range::new(a.clone(), b.clone()));
        let backward = get_selected_text(&root, &Range::new(b, a));
        assert_eq!(forward, backward);
    }

    #[test]
    fn invalid_path_yields_empty_string_not_panic() {
        let root = two_paragraph_doc();
        let bogus = Point::new(Path::from_indices([99, 99]), 0);
        let focus = Point::new(Path::from_indices([0, 0, 0, 0]), 1);
        assert_eq!(get_selected_text(&root, &Range::new(bogus, focus)), "");
    }
}
