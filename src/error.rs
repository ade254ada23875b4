use core::panic::Location;

/// An insertion or construction needed more slots than the fixed capacity provides.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("capacity of {capacity} exceeded at {location}")]
pub struct CapacityExceeded {
    /// The fixed capacity of the container.
    pub capacity: usize,
    /// Where the failing insertion was requested.
    pub location: &'static Location<'static>,
}

/// A checked lookup did not find its key.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("key not found among {size} entries at {location}")]
pub struct KeyNotFound {
    /// The number of entries at the time of the lookup.
    pub size: usize,
    /// Where the failing lookup was requested.
    pub location: &'static Location<'static>,
}

/// The errors produced by the [`Fallible`](crate::Fallible) checking policy.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    CapacityExceeded(#[from] CapacityExceeded),
    #[error(transparent)]
    KeyNotFound(#[from] KeyNotFound),
}

/// A broken tree invariant, reported by `check_invariants`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("the root node is red")]
    RedRoot,
    #[error("a red node has a red child")]
    RedChildOfRed,
    #[error("root-to-leaf paths have different black heights")]
    UnequalBlackHeight,
    #[error("keys are not in strictly increasing order")]
    OutOfOrder,
    #[error("a parent and child disagree about their link")]
    BrokenLink,
    #[error("live slot count {live} does not match tree length {len}")]
    LengthMismatch { live: usize, len: usize },
    #[error("pool slots do not partition the capacity")]
    PoolCorrupted,
}
