//! Integer-path addressing into the document tree (spec §3, §4.A).
//!
//! A [`Path`] is an ordered sequence of child indices from the root. Paths
//! are compared lexicographically; ancestry is strict-prefix containment.
//! These functions are pure and total — they never panic and never touch an
//! actual tree — so the operation algebra and undo machinery can reason
//! about them independently of any particular [`crate::model::Document`].

use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;

/// Most paths in a real document are shallow (a handful of nested
/// containers); inline on the stack up to four indices before spilling.
pub type PathInner = SmallVec<[usize; 4]>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(PathInner);

impl Path {
    pub fn new() -> Self {
        Path(SmallVec::new())
    }

    pub fn from_indices<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        Path(indices.into_iter().collect())
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Returns this path with its last component replaced, or `None` if empty.
    pub fn with_last(&self, index: usize) -> Option<Path> {
        if self.0.is_empty() {
            return None;
        }
        let mut p = self.clone();
        *p.0.last_mut().unwrap() = index;
        Some(p)
    }

    /// The path of the parent node: all but the last component.
    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            return None;
        }
        Some(Path(self.0[..self.0.len() - 1].into()))
    }

    /// The path of the next sibling.
    pub fn next_sibling(&self) -> Option<Path> {
        self.with_last(self.last()? + 1)
    }

    /// The path of the previous sibling, or `None` at index 0 or the root.
    pub fn previous_sibling(&self) -> Option<Path> {
        let last = self.last()?;
        if last == 0 {
            return None;
        }
        self.with_last(last - 1)
    }

    /// The path of the `index`th child of this node.
    pub fn child(&self, index: usize) -> Path {
        let mut p = self.clone();
        p.0.push(index);
        p
    }

    /// `true` if `self` is a strict prefix of `other` (i.e. `self` addresses
    /// a strict ancestor of whatever `other` addresses).
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && self.0[..] == other.0[..self.0.len()]
    }

    /// `true` if `self` addresses `other`'s node or a descendant of it.
    pub fn is_ancestor_of_or_equal(&self, other: &Path) -> bool {
        self.0.len() <= other.0.len() && self.0[..] == other.0[..self.0.len()]
    }

    pub fn equals(&self, other: &Path) -> bool {
        self.0 == other.0
    }

    /// Lexicographic document order: compare component by component, a
    /// shorter path that is a prefix of a longer one sorts first (it's the
    /// ancestor, which comes before any of its children in document order).
    pub fn compare(&self, other: &Path) -> Ordering {
        self.0.cmp(&other.0)
    }

    /// The deepest path that is an ancestor of both `self` and `other`
    /// (possibly the empty root path).
    pub fn common_ancestor(&self, other: &Path) -> Path {
        let mut common = PathInner::new();
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            if a == b {
                common.push(*a);
            } else {
                break;
            }
        }
        Path(common)
    }

    /// Shift this path to account for a node having been inserted at
    /// `inserted_at` in a sibling list that is an ancestor-or-same level of
    /// `self`. Returns the transformed path unchanged if the insertion
    /// happened in an unrelated part of the tree.
    ///
    /// Semantics (spec §3): at the level of `inserted_at`, if `self` shares
    /// `inserted_at`'s prefix up to that level and `self[level] >=
    /// inserted_at[level]`, that component is shifted by +1.
    pub fn transform_after_insert(&self, inserted_at: &Path) -> Path {
        let level = match inserted_at.last_level() {
            Some(l) => l,
            None => return self.clone(),
        };
        if self.0.len() <= level {
            return self.clone();
        }
        if self.0[..level] != inserted_at.0[..level] {
            return self.clone();
        }
        if self.0[level] >= inserted_at.0[level] {
            let mut p = self.clone();
            p.0[level] += 1;
            p
        } else {
            self.clone()
        }
    }

    /// Shift or invalidate this path after a node at `removed_at` (and its
    /// subtree) was removed. Returns `None` when `self` addressed a node
    /// inside the removed subtree (it no longer exists); otherwise returns
    /// the transformed path, shifting the relevant component by -1 when
    /// `self` pointed at a later sibling.
    pub fn transform_after_remove(&self, removed_at: &Path) -> Option<Path> {
        if removed_at.is_ancestor_of_or_equal(self) && !removed_at.equals(self) {
            // self is strictly inside the removed subtree: check this before
            // the equality case below, which only applies at the exact level.
            if removed_at.0.len() < self.0.len() {
                return None;
            }
        }
        let level = removed_at.last_level()?;
        if self.0.len() <= level {
            return Some(self.clone());
        }
        if self.0[..level] != removed_at.0[..level] {
            return Some(self.clone());
        }
        match self.0[level].cmp(&removed_at.0[level]) {
            Ordering::Less => Some(self.clone()),
            Ordering::Equal => {
                if self.0.len() == level + 1 {
                    // self *is* the removed node.
                    None
                } else {
                    // self is inside the removed subtree.
                    None
                }
            }
            Ordering::Greater => {
                let mut p = self.clone();
                p.0[level] -= 1;
                Some(p)
            }
        }
    }

    fn last_level(&self) -> Option<usize> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.len() - 1)
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{component}")?;
        }
        write!(f, "]")
    }
}

impl From<&[usize]> for Path {
    fn from(slice: &[usize]) -> Self {
        Path(slice.into())
    }
}

impl From<Vec<usize>> for Path {
    fn from(v: Vec<usize>) -> Self {
        Path(v.into())
    }
}

/// A point within the document: a path to a node plus an offset into it
/// (character offset for text nodes, child-slot index for elements).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Point { path, offset }
    }

    pub fn compare(&self, other: &Point) -> Ordering {
        self.path.compare(&other.path).then(self.offset.cmp(&other.offset))
    }
}

/// An anchor/focus pair. Collapsed iff `anchor == focus`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Range { anchor, focus }
    }

    pub fn collapsed(at: Point) -> Self {
        Range { anchor: at.clone(), focus: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Returns an equivalent range oriented so `anchor` precedes or equals
    /// `focus` in document order.
    pub fn normalize(&self) -> Range {
        if self.anchor.compare(&self.focus) == Ordering::Greater {
            Range { anchor: self.focus.clone(), focus: self.anchor.clone() }
        } else {
            self.clone()
        }
    }

    pub fn reversed(&self) -> Range {
        Range { anchor: self.focus.clone(), focus: self.anchor.clone() }
    }

    pub fn start(&self) -> &Point {
        if self.anchor.compare(&self.focus) == Ordering::Greater {
            &self.focus
        } else {
            &self.anchor
        }
    }

    pub fn end(&self) -> &Point {
        if self.anchor.compare(&self.focus) == Ordering::Greater {
            &self.anchor
        } else {
            &self.focus
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestry_on_empty_and_deep_paths() {
        let root = Path::new();
        let deep = Path::from_indices([1, 2, 3, 4, 5]);
        assert!(root.is_ancestor_of(&deep));
        assert!(!deep.is_ancestor_of(&root));
        assert!(!root.is_ancestor_of(&root));
        assert!(root.is_ancestor_of_or_equal(&root));
    }

    #[test]
    fn compare_is_lexicographic() {
        assert_eq!(Path::from_indices([0]).compare(&Path::from_indices([1])), Ordering::Less);
        assert_eq!(
            Path::from_indices([0, 5]).compare(&Path::from_indices([0, 5, 0])),
            Ordering::Less
        );
        assert_eq!(Path::from_indices([2, 1]).compare(&Path::from_indices([2, 1])), Ordering::Equal);
    }

    #[test]
    fn common_ancestor_finds_deepest_shared_prefix() {
        let a = Path::from_indices([0, 1, 2]);
        let b = Path::from_indices([0, 1, 9]);
        assert_eq!(a.common_ancestor(&b), Path::from_indices([0, 1]));
        let c = Path::from_indices([5]);
        assert_eq!(a.common_ancestor(&c), Path::new());
    }

    #[test]
    fn transform_after_insert_shifts_same_level_siblings() {
        let inserted_at = Path::from_indices([0, 2]);
        assert_eq!(
            Path::from_indices([0, 2]).transform_after_insert(&inserted_at),
            Path::from_indices([0, 3])
        );
        assert_eq!(
            Path::from_indices([0, 5]).transform_after_insert(&inserted_at),
            Path::from_indices([0, 6])
        );
        assert_eq!(
            Path::from_indices([0, 1]).transform_after_insert(&inserted_at),
            Path::from_indices([0, 1])
        );
        // Unrelated subtree: untouched.
        assert_eq!(
            Path::from_indices([1, 0]).transform_after_insert(&inserted_at),
            Path::from_indices([1, 0])
        );
        // Descendant of the shifted sibling still shifts at the matching level.
        assert_eq!(
            Path::from_indices([0, 2, 7]).transform_after_insert(&inserted_at),
            Path::from_indices([0, 3, 7])
        );
    }

    #[test]
    fn transform_after_remove_invalidates_subtree_and_shifts_later_siblings() {
        let removed_at = Path::from_indices([0, 2]);
        assert_eq!(Path::from_indices([0, 2]).transform_after_remove(&removed_at), None);
        assert_eq!(
            Path::from_indices([0, 2, 3]).transform_after_remove(&removed_at),
            None
        );
        assert_eq!(
            Path::from_indices([0, 3]).transform_after_remove(&removed_at),
            Some(Path::from_indices([0, 2]))
        );
        assert_eq!(
            Path::from_indices([0, 1]).transform_after_remove(&removed_at),
            Some(Path::from_indices([0, 1]))
        );
        assert_eq!(
            Path::from_indices([1, 0]).transform_after_remove(&removed_at),
            Some(Path::from_indices([1, 0]))
        );
    }

    #[test]
    fn insert_remove_are_inverse_on_surviving_paths() {
        let inserted_at = Path::from_indices([0, 4]);
        let p = Path::from_indices([0, 9, 1]);
        let shifted = p.transform_after_insert(&inserted_at);
        let back = shifted.transform_after_remove(&inserted_at).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn range_normalize_and_reverse() {
        let a = Point::new(Path::from_indices([0]), 0);
        let b = Point::new(Path::from_indices([0]), 5);
        let forward = Range::new(a.clone(), b.clone());
        let backward = Range::new(b, a);
        assert!(forward.normalize() == backward.normalize());
        assert_eq!(backward.normalize().anchor.offset, 0);
    }
}
