/// Smallest raw value probed by default when resolving an identifier domain.
pub const DEFAULT_PROBE_MIN: i64 = -64;
/// Largest raw value probed by default when resolving an identifier domain.
pub const DEFAULT_PROBE_MAX: i64 = 128;

/// Probing window used by [`IdDomain::probe`](crate::id::IdDomain::probe).
///
/// Raw identifier values outside `[probe_min, probe_max]` are never tested
/// against the validity oracle. Enlarge the window for identifier types with
/// more than `probe_max` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainConfig {
    pub probe_min: i64,
    pub probe_max: i64,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            probe_min: DEFAULT_PROBE_MIN,
            probe_max: DEFAULT_PROBE_MAX,
        }
    }
}

/// Options consumed when an overload set is turned into a dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Reject handler sets that leave a reachable concrete combination
    /// uncovered. When disabled the hole is kept and dispatching into it
    /// panics.
    pub exhaustive: bool,

    /// Emit a warning for cases that no reachable combination selects.
    pub warn_unreachable: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            exhaustive: true,
            warn_unreachable: true,
        }
    }
}

impl DispatchConfig {
    /// Configuration accepting handler sets with holes.
    pub const fn partial() -> Self {
        Self {
            exhaustive: false,
            warn_unreachable: true,
        }
    }
}
