//! In-memory HR+Tree: one R*-style tree per version over a shared node arena.
//!
//! This module provides:
//! - Generational handles and arena storage for entries and containers
//! - The R* split heuristic (axis by margin, index by overlap)
//! - The multi-version tree facade with insert, query and version management
//! - Structural integrity checks and a lock-protected shared handle

pub mod hrtree_arena;
pub mod hrtree_config;
pub mod hrtree_constants;
pub mod hrtree_partition;
pub mod hrtree_types;
pub mod hrtree_utils;
mod hrtree_impl;
mod hrtree_integrity;
mod hrtree_shared;

pub use hrtree_arena::NodeArena;
pub use hrtree_config::HRTreeConfig;
pub use hrtree_constants::{DEFAULT_MAX_DEGREE, DEFAULT_MIN_DEGREE};
pub use hrtree_impl::HRPlusTree;
pub use hrtree_integrity::IntegrityReport;
pub use hrtree_partition::{
    choose_split, partition_by_min_overlap, Partition, SplitAxis, SplitEdge, SplitPlan,
};
pub use hrtree_shared::SharedHRPlusTree;
pub use hrtree_types::{
    Container, ContainerId, Entry, EntryId, EntryKind, HRTreeError, HRTreeResult, HRTreeStats,
    QueryMatch,
};
pub use hrtree_utils::Bounded;
