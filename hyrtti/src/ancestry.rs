//! Ancestor tables and parent-chain walks.
use std::iter::FusedIterator;

use bit_set::BitSet;

use crate::{id::HierarchyId, registry::Hierarchy};

/// Walk the parent chain of `actual` looking for `test`.
///
/// The walk is bounded by the number of entries in `parents`, so a malformed (cyclic) chain
/// terminates with `false` instead of looping.
pub(crate) fn walk_is_ancestor(parents: &[Option<usize>], test: usize, actual: usize) -> bool {
    let mut current = Some(actual);
    for _ in 0..=parents.len() {
        match current {
            Some(index) if index == test => return true,
            Some(index) => current = parents.get(index).copied().flatten(),
            None => return false,
        }
    }
    false
}

/// Precomputed answer to "is `i` the test variant or one of its descendants" for every index
/// `i` of a hierarchy.
///
/// Built once per test variant by [`Hierarchy::ancestor_table`]; lookups are a single bit test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorTable {
    test: usize,
    count: usize,
    members: BitSet,
}

impl AncestorTable {
    pub(crate) fn build(parents: &[Option<usize>], test: usize) -> Self {
        let count = parents.len();
        let mut members = BitSet::with_capacity(count);
        for actual in 0..count {
            if walk_is_ancestor(parents, test, actual) {
                members.insert(actual);
            }
        }

        Self {
            test,
            count,
            members,
        }
    }

    /// Index of the test variant.
    #[inline]
    pub fn test(&self) -> usize {
        self.test
    }

    /// Number of identifiers the table covers (the hierarchy size).
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the variant at `actual` is the test variant or a descendant of it.
    #[inline]
    pub fn contains(&self, actual: usize) -> bool {
        self.members.contains(actual)
    }

    /// Number of variants in the subtree rooted at the test variant.
    pub fn subtree_len(&self) -> usize {
        self.members.iter().count()
    }

    /// Indices of the subtree rooted at the test variant, in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter()
    }
}

/// Iterator over a variant followed by each of its ancestors up to the root.
///
/// Returned by [`Hierarchy::ancestors`].
pub struct Ancestors<'h, Id: HierarchyId> {
    hierarchy: &'h Hierarchy<Id>,
    next: Option<Id>,
}

impl<'h, Id: HierarchyId> Ancestors<'h, Id> {
    pub(crate) fn new(hierarchy: &'h Hierarchy<Id>, start: Id) -> Self {
        Self {
            hierarchy,
            next: Some(start),
        }
    }
}

impl<Id: HierarchyId> Iterator for Ancestors<'_, Id> {
    type Item = Id;

    fn next(&mut self) -> Option<Id> {
        let current = self.next?;
        self.next = self.hierarchy.parent_of(current);
        Some(current)
    }
}

impl<Id: HierarchyId> FusedIterator for Ancestors<'_, Id> {}
