//! Identifier types and the resolution of their valid value range.
//!
//! Every closed hierarchy is keyed by a fieldless enum implementing [`HierarchyId`]. The
//! tables built on top of a hierarchy are flat arrays addressed by [`HierarchyId::index`], so
//! the valid values of the enum must form the dense range `[0, count)`. [`IdDomain`] discovers
//! that range by probing a window of raw values against the enum's validity oracle
//! ([`HierarchyId::from_raw`]) and checks the zero-based, contiguous shape.
use std::{fmt::Debug, hash::Hash};

use crate::{
    registry::Hierarchy,
    utils::{
        conf::DomainConfig,
        error::{RttiError, RttiResult},
    },
};

/// Identifier enum of a closed hierarchy.
///
/// Usually derived with [`#[derive(Hierarchy)]`](crate::Hierarchy) on an enum that also derives
/// [`strum::FromRepr`]. Implementations must keep [`from_raw`](Self::from_raw) and
/// [`to_raw`](Self::to_raw) inverse to each other.
pub trait HierarchyId: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Name of the identifier type, used in diagnostics.
    const NAME: &'static str;

    /// Raw discriminant of this identifier.
    fn to_raw(self) -> i64;

    /// Validity oracle: the identifier whose discriminant is `raw`, if any.
    fn from_raw(raw: i64) -> Option<Self>;

    /// Process-wide registry of the hierarchy keyed by this identifier type.
    fn hierarchy() -> &'static Hierarchy<Self>;

    /// Dense table index of this identifier.
    #[inline]
    fn index(self) -> usize {
        self.to_raw() as usize
    }

    /// Identifier stored at table index `index`.
    #[inline]
    fn from_index(index: usize) -> Option<Self> {
        Self::from_raw(index as i64)
    }
}

/// Half-open range `[first, last)` of raw identifier values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdDomain {
    first: i64,
    last: i64,
}

impl IdDomain {
    /// Domain recorded explicitly instead of being probed.
    pub const fn declared(first: i64, count: usize) -> Self {
        Self {
            first,
            last: first + count as i64,
        }
    }

    /// Scan `[min, max]` with `is_valid` and return the range spanning the smallest and
    /// largest valid values, or `None` if no value in the window is valid.
    ///
    /// Values between the two bounds are not required to be valid; see
    /// [`IdDomain::ensure_dense`].
    pub fn probe_with(min: i64, max: i64, is_valid: impl Fn(i64) -> bool) -> Option<Self> {
        let first = (min..=max).find(|&raw| is_valid(raw))?;
        let last = (first..=max).rev().find(|&raw| is_valid(raw))? + 1;
        Some(Self { first, last })
    }

    /// Probe the domain of `Id` using its validity oracle.
    pub fn probe<Id: HierarchyId>(config: &DomainConfig) -> RttiResult<Self> {
        Self::probe_with(config.probe_min, config.probe_max, |raw| {
            Id::from_raw(raw).is_some()
        })
        .ok_or(RttiError::EmptyDomain {
            hierarchy: Id::NAME,
            min: config.probe_min,
            max: config.probe_max,
        })
    }

    /// Check that the domain is `[0, count)` and that every value in it is a valid `Id`.
    pub fn ensure_dense<Id: HierarchyId>(&self) -> RttiResult<()> {
        if self.first != 0 {
            return Err(RttiError::NotZeroBased {
                hierarchy: Id::NAME,
                first: self.first,
            });
        }

        match (self.first..self.last).find(|&raw| Id::from_raw(raw).is_none()) {
            Some(missing) => Err(RttiError::NotContiguous {
                hierarchy: Id::NAME,
                missing,
            }),
            None => Ok(()),
        }
    }

    #[inline]
    pub const fn first(&self) -> i64 {
        self.first
    }

    #[inline]
    pub const fn last(&self) -> i64 {
        self.last
    }

    #[inline]
    pub const fn count(&self) -> usize {
        (self.last - self.first) as usize
    }

    #[inline]
    pub const fn contains(&self, raw: i64) -> bool {
        self.first <= raw && raw < self.last
    }
}
