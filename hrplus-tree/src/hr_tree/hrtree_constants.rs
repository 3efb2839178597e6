//! Constants for the HR+Tree.

/// Default maximum number of entries per container before it is split
pub const DEFAULT_MAX_DEGREE: usize = 3;

/// Default minimum number of entries each side of a split must receive
pub const DEFAULT_MIN_DEGREE: usize = 1;

/// Smallest usable maximum fan-out
pub const MIN_ALLOWED_MAX_DEGREE: usize = 2;

/// Height of a version tree whose root holds only leaves
pub const LEAF_ONLY_HEIGHT: usize = 1;
