use thiserror::Error;

/// Failure of a checked, reference-shaped downcast.
///
/// This is the only error produced on the dispatch hot path; every other
/// [`RttiError`] is raised while registering a hierarchy or building a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bad cast in hierarchy '{hierarchy}': '{actual}' is not a '{target}'")]
pub struct BadCast {
    pub hierarchy: &'static str,
    pub actual: &'static str,
    pub target: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RttiError {
    #[error("Identifier type '{hierarchy}' has no valid value in the probing window [{min}, {max}]")]
    EmptyDomain {
        hierarchy: &'static str,
        min: i64,
        max: i64,
    },

    #[error("Identifier type '{hierarchy}' must start at 0, found first value {first}")]
    NotZeroBased { hierarchy: &'static str, first: i64 },

    #[error("Identifier type '{hierarchy}' is not contiguous: value {missing} is not a valid identifier")]
    NotContiguous { hierarchy: &'static str, missing: i64 },

    #[error("Identifier {raw} of '{hierarchy}' lies outside its domain [0, {count})")]
    OutOfDomain {
        hierarchy: &'static str,
        raw: i64,
        count: usize,
    },

    #[error("Variant '{name}' of '{hierarchy}' was registered more than once")]
    DuplicateRegistration {
        hierarchy: &'static str,
        name: &'static str,
    },

    #[error("Identifier {raw} of '{hierarchy}' was never registered")]
    MissingRegistration { hierarchy: &'static str, raw: i64 },

    #[error("Hierarchy '{hierarchy}' has no root variant")]
    MissingRoot { hierarchy: &'static str },

    #[error("Hierarchy '{hierarchy}' has several roots: {roots:?}")]
    MultipleRoots {
        hierarchy: &'static str,
        roots: Vec<&'static str>,
    },

    #[error("Root '{root}' of '{hierarchy}' must have identifier 0")]
    RootNotZero {
        hierarchy: &'static str,
        root: &'static str,
    },

    #[error("Parent chain of '{name}' in '{hierarchy}' does not reach the root")]
    Cycle {
        hierarchy: &'static str,
        name: &'static str,
    },

    #[error("Ambiguous dispatch for {combination}: candidates {candidates:?} are equally specific")]
    AmbiguousCase {
        combination: String,
        candidates: Vec<String>,
    },

    #[error("Non-exhaustive dispatch: no case handles {combination}")]
    NonExhaustive { combination: String },

    #[error(transparent)]
    BadCast(#[from] BadCast),
}

pub type RttiResult<T> = Result<T, RttiError>;
