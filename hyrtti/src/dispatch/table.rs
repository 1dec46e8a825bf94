//! Arity-agnostic resolution of dispatch tables.
//!
//! A [`TableLayout`] maps every reachable combination of concrete identifiers to the index of
//! the handler case selected for it. Resolution works on plain indices through
//! [`HierarchyView`], so one implementation serves every arity and every mix of hierarchies.
use std::fmt;

use log::{debug, warn};
use smallvec::SmallVec;

use crate::{
    cast::{Narrow, Tagged, Variant, thin, thin_mut},
    dispatch::index::{MAX_ARITY, MultiIndex, flatten_index},
    id::HierarchyId,
    registry::HierarchyView,
    utils::{
        conf::DispatchConfig,
        error::{RttiError, RttiResult},
    },
};

/// Type-erased dispatch argument: the address of a concrete instance and its identifier.
#[derive(Clone, Copy)]
pub(crate) struct RawArg<Id> {
    object: *const (),
    id: Id,
}

impl<Id: HierarchyId> RawArg<Id> {
    #[inline]
    pub(crate) fn of<A: ?Sized + Tagged<Id = Id>>(argument: &A) -> Self {
        Self {
            object: thin(argument),
            id: argument.rtti(),
        }
    }

    /// Erase an argument handed out with unique access.
    #[inline]
    pub(crate) fn of_mut<A: ?Sized + Tagged<Id = Id>>(argument: &mut A) -> Self {
        Self {
            id: argument.rtti(),
            object: thin_mut(argument).cast_const(),
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> Id {
        self.id
    }

    /// # Safety
    ///
    /// The referenced instance must outlive `'a` and be an instance of `T`.
    #[inline]
    pub(crate) unsafe fn narrow<'a, T: ?Sized + Narrow<Id = Id>>(self) -> &'a T {
        unsafe { T::narrow_ref(self.object, self.id) }
    }

    /// # Safety
    ///
    /// Same as [`RawArg::narrow`]; the argument must also come from [`RawArg::of_mut`] and no
    /// other reference to the instance may be live for `'a`.
    #[inline]
    pub(crate) unsafe fn narrow_mut<'a, T: ?Sized + Narrow<Id = Id>>(self) -> &'a mut T {
        unsafe { T::narrow_mut(self.object.cast_mut(), self.id) }
    }
}

/// Static type of one dispatched argument: its hierarchy and the subtree it may hold.
#[derive(Clone, Copy)]
pub(crate) struct Position {
    hierarchy: &'static dyn HierarchyView,
    root: usize,
}

impl Position {
    pub(crate) fn of<S: ?Sized + Variant>() -> Self {
        Self {
            hierarchy: <S::Id as HierarchyId>::hierarchy(),
            root: S::ID.index(),
        }
    }

    #[cfg(test)]
    fn new(hierarchy: &'static dyn HierarchyView, root: usize) -> Self {
        Self { hierarchy, root }
    }
}

/// Compacted dispatch table: for each reachable combination, the selected handler case.
///
/// Slots cover the flattened indices `[offset, offset + span)` only. Radixes are the full
/// identifier counts of each hierarchy.
pub struct TableLayout {
    positions: SmallVec<Position, MAX_ARITY>,
    radixes: MultiIndex,
    signatures: Vec<MultiIndex>,
    offset: usize,
    slots: Vec<Option<usize>>,
}

impl TableLayout {
    pub(crate) fn resolve(
        positions: SmallVec<Position, MAX_ARITY>,
        signatures: Vec<MultiIndex>,
        config: &DispatchConfig,
    ) -> RttiResult<Self> {
        let radixes = positions.iter().map(|p| p.hierarchy.count()).collect();
        let mut layout = Self {
            positions,
            radixes,
            signatures,
            offset: 0,
            slots: Vec::new(),
        };

        let invocable = layout.invocable_sets(config)?;

        let mut entries = Vec::new();
        let mut selected = vec![false; layout.signatures.len()];
        if invocable.iter().all(|set| !set.is_empty()) {
            let lengths: MultiIndex = invocable.iter().map(Vec::len).collect();
            let mut cursor: MultiIndex = lengths.iter().map(|_| 0).collect();
            loop {
                let combination: MultiIndex = cursor
                    .iter()
                    .zip(invocable.iter())
                    .map(|(&at, set)| set[at])
                    .collect();

                match layout.select(&combination)? {
                    Some(case) => {
                        selected[case] = true;
                        entries.push((flatten_index(&combination, &layout.radixes), case));
                    }
                    None if config.exhaustive => {
                        return Err(RttiError::NonExhaustive {
                            combination: layout.describe(&combination),
                        });
                    }
                    None => {}
                }

                if !advance(&mut cursor, &lengths) {
                    break;
                }
            }
        }

        let min = entries.iter().map(|&(flat, _)| flat).min();
        let max = entries.iter().map(|&(flat, _)| flat).max();
        if let (Some(min), Some(max)) = (min, max) {
            layout.offset = min;
            layout.slots = vec![None; max - min + 1];
            for (flat, case) in entries {
                layout.slots[flat - min] = Some(case);
            }
        }

        if config.warn_unreachable {
            for (case, _) in selected.iter().enumerate().filter(|(_, hit)| !**hit) {
                warn!(
                    "Dispatch case {} is never selected",
                    layout.describe(&layout.signatures[case])
                );
            }
        }

        debug!(
            "Built dispatch table over {}: {} cases, {} entries in a span of {} (offset {}, full size {})",
            layout.describe_positions(),
            layout.cases(),
            layout.populated(),
            layout.span(),
            layout.offset,
            layout.full_size()
        );

        Ok(layout)
    }

    /// Concrete identifiers of each position for which at least one case is invocable.
    fn invocable_sets(&self, config: &DispatchConfig) -> RttiResult<SmallVec<Vec<usize>, MAX_ARITY>> {
        let mut sets = SmallVec::new();
        for (at, position) in self.positions.iter().enumerate() {
            let mut set = Vec::new();
            for candidate in position.hierarchy.concrete_descendants_at(position.root) {
                let invocable = self
                    .signatures
                    .iter()
                    .any(|signature| position.hierarchy.is_ancestor_at(signature[at], candidate));

                if invocable {
                    set.push(candidate);
                } else if config.exhaustive {
                    return Err(RttiError::NonExhaustive {
                        combination: self.describe_partial(at, candidate),
                    });
                }
            }
            sets.push(set);
        }
        Ok(sets)
    }

    /// Most specific case applicable to `combination`, if any.
    fn select(&self, combination: &[usize]) -> RttiResult<Option<usize>> {
        let applicable: Vec<usize> = (0..self.signatures.len())
            .filter(|&case| self.covers(&self.signatures[case], combination))
            .collect();
        if applicable.is_empty() {
            return Ok(None);
        }

        let best: Vec<usize> = applicable
            .iter()
            .copied()
            .filter(|&case| {
                applicable
                    .iter()
                    .all(|&other| self.at_least_as_specific(case, other))
            })
            .collect();
        if let [case] = best.as_slice() {
            return Ok(Some(*case));
        }

        let candidates = applicable
            .iter()
            .copied()
            .filter(|&case| {
                !applicable.iter().any(|&other| {
                    self.at_least_as_specific(other, case) && !self.at_least_as_specific(case, other)
                })
            })
            .map(|case| self.describe(&self.signatures[case]))
            .collect();

        Err(RttiError::AmbiguousCase {
            combination: self.describe(combination),
            candidates,
        })
    }

    fn covers(&self, signature: &[usize], combination: &[usize]) -> bool {
        self.positions
            .iter()
            .zip(signature.iter().zip(combination))
            .all(|(position, (&test, &actual))| position.hierarchy.is_ancestor_at(test, actual))
    }

    fn at_least_as_specific(&self, case: usize, other: usize) -> bool {
        let (case, other) = (&self.signatures[case], &self.signatures[other]);
        self.covers(other, case)
    }

    fn describe(&self, indices: &[usize]) -> String {
        let names: Vec<&str> = self
            .positions
            .iter()
            .zip(indices)
            .map(|(position, &index)| position.hierarchy.name_at(index))
            .collect();
        format!("({})", names.join(", "))
    }

    fn describe_partial(&self, at: usize, index: usize) -> String {
        let names: Vec<&str> = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, position)| if i == at { position.hierarchy.name_at(index) } else { "_" })
            .collect();
        format!("({})", names.join(", "))
    }

    fn describe_positions(&self) -> String {
        self.describe(
            &self
                .positions
                .iter()
                .map(|position| position.root)
                .collect::<MultiIndex>(),
        )
    }

    /// Number of dispatched arguments.
    #[inline]
    pub fn arity(&self) -> usize {
        self.positions.len()
    }

    /// Number of handler cases the table was built from.
    #[inline]
    pub fn cases(&self) -> usize {
        self.signatures.len()
    }

    /// Flattened index stored in the first slot.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of slots actually allocated.
    #[inline]
    pub fn span(&self) -> usize {
        self.slots.len()
    }

    /// Size of the uncompacted cross product of all identifiers.
    pub fn full_size(&self) -> usize {
        self.radixes.iter().product()
    }

    /// Number of slots holding a case.
    pub fn populated(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Case selected for the identifier indices `indices`, or `None` for unreachable and
    /// uncovered combinations.
    #[inline]
    pub fn entry(&self, indices: &[usize]) -> Option<usize> {
        let flat = flatten_index(indices, &self.radixes);
        flat.checked_sub(self.offset)
            .and_then(|slot| self.slots.get(slot))
            .copied()
            .flatten()
    }

    #[inline]
    #[track_caller]
    pub(crate) fn lookup(&self, indices: &[usize]) -> usize {
        match self.entry(indices) {
            Some(case) => case,
            None => self.missing_case(indices),
        }
    }

    #[cold]
    #[track_caller]
    fn missing_case(&self, indices: &[usize]) -> ! {
        panic!(
            "no dispatch case handles {} (table over {})",
            self.describe(indices),
            self.describe_positions()
        )
    }
}

impl fmt::Debug for TableLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hierarchies: Vec<&str> = self
            .positions
            .iter()
            .map(|position| position.hierarchy.type_name())
            .collect();
        f.debug_struct("TableLayout")
            .field("hierarchies", &hierarchies)
            .field("cases", &self.cases())
            .field("offset", &self.offset)
            .field("span", &self.span())
            .field("populated", &self.populated())
            .field("full_size", &self.full_size())
            .finish()
    }
}

/// Step `cursor` to the next combination, last position fastest. `false` once wrapped around.
fn advance(cursor: &mut [usize], lengths: &[usize]) -> bool {
    for at in (0..cursor.len()).rev() {
        cursor[at] += 1;
        if cursor[at] < lengths[at] {
            return true;
        }
        cursor[at] = 0;
    }
    false
}
