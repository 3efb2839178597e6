//! Core types and data structures for the HR+Tree.
//!
//! This module defines the fundamental types used throughout the index:
//! - Error types and result types
//! - Generational handles for entries and containers
//! - Entry (leaf or internal) and Container records
//! - Query results and statistics

use crate::bounding_box::BoundingBox;
use crate::object_id::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur in HR+Tree operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HRTreeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Stale handle: {0}")]
    StaleHandle(String),

    #[error("Corrupt structure: {0}")]
    CorruptStructure(String),
}

/// Result type for HR+Tree operations
pub type HRTreeResult<T> = Result<T, HRTreeError>;

// ============================================================================
// Handles
// ============================================================================

/// Identifier for an [`Entry`] stored in a [`NodeArena`](super::NodeArena).
///
/// A handle is a slot index plus the generation of that slot. When an entry
/// is released its slot may be reused, but the generation is bumped, so old
/// handles stop resolving instead of silently aliasing the new occupant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) u32, pub(crate) u32);

/// Identifier for a [`Container`] stored in a [`NodeArena`](super::NodeArena).
///
/// Same generational scheme as [`EntryId`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub(crate) u32, pub(crate) u32);

impl EntryId {
    pub(crate) fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn generation(self) -> u32 {
        self.1
    }
}

impl ContainerId {
    pub(crate) fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn generation(self) -> u32 {
        self.1
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({}v{})", self.0, self.1)
    }
}

impl fmt::Debug for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContainerId({}v{})", self.0, self.1)
    }
}

// ============================================================================
// Entries and Containers
// ============================================================================

/// Whether an entry is a leaf or points at a child container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Leaf entry indexing one feature
    Leaf,
    /// Internal entry owning the given child container
    Internal(ContainerId),
}

/// One bounding box tagged with a feature id and a version id.
///
/// `bounds` is set explicitly. For internal entries it is a cached copy of
/// the child's MBR that the tree refreshes on insert, never recomputed on read.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub(crate) id: EntryId,
    pub(crate) feature_id: ObjectId,
    pub(crate) version_id: ObjectId,
    pub(crate) bounds: BoundingBox,
    pub(crate) kind: EntryKind,
    pub(crate) parent_container: Option<ContainerId>,
}

impl Entry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn feature_id(&self) -> ObjectId {
        self.feature_id
    }

    pub fn version_id(&self) -> ObjectId {
        self.version_id
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// The child container, if this is an internal entry.
    pub fn child(&self) -> Option<ContainerId> {
        match self.kind {
            EntryKind::Leaf => None,
            EntryKind::Internal(child) => Some(child),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, EntryKind::Leaf)
    }

    /// The container currently holding this entry.
    pub fn parent_container(&self) -> Option<ContainerId> {
        self.parent_container
    }

    pub fn min_x(&self) -> f64 {
        self.bounds.min_x
    }

    pub fn min_y(&self) -> f64 {
        self.bounds.min_y
    }

    pub fn max_x(&self) -> f64 {
        self.bounds.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.bounds.max_y
    }
}

/// An unordered group of entries plus a link back to the entry pointing at it.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub(crate) id: ContainerId,
    pub(crate) entries: Vec<EntryId>,
    pub(crate) parent_entry: Option<EntryId>,
}

impl Container {
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Direct entries only.
    pub fn entries(&self) -> &[EntryId] {
        &self.entries
    }

    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry pointing at this container, `None` for a version root.
    pub fn parent_entry(&self) -> Option<EntryId> {
        self.parent_entry
    }
}

// ============================================================================
// Query Results
// ============================================================================

/// One leaf returned by a range query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryMatch {
    pub entry: EntryId,
    pub feature_id: ObjectId,
    pub version_id: ObjectId,
    pub bounds: BoundingBox,
}

impl From<&Entry> for QueryMatch {
    fn from(entry: &Entry) -> Self {
        QueryMatch {
            entry: entry.id,
            feature_id: entry.feature_id,
            version_id: entry.version_id,
            bounds: entry.bounds,
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Statistics about the shape of an HR+Tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HRTreeStats {
    /// Number of version roots
    pub num_roots: usize,
    /// Leaf entries across all versions
    pub leaf_count: usize,
    /// Internal (pointer) entries across all versions
    pub internal_entry_count: usize,
    /// Containers across all versions, roots included
    pub container_count: usize,
    /// Height of the tallest version tree, 0 when there are no versions
    pub max_height: usize,
}
