//! VersionedRTree trait definition for multi-version spatial indexing.

use crate::bounding_box::BoundingBox;
use crate::hr_tree::{HRTreeResult, HRTreeStats, QueryMatch};
use crate::object_id::ObjectId;

/// A spatial index holding one R-tree per version, shareable across threads.
///
/// All methods take `&self`; implementations provide their own locking.
pub trait VersionedRTree: Send + Sync {
    /// Indexes `key` for `feature_id` under `version_id`.
    fn add(
        &self,
        feature_id: ObjectId,
        key: &BoundingBox,
        version_id: ObjectId,
    ) -> HRTreeResult<()>;

    /// Finds leaves of every version intersecting `key`.
    fn find_intersecting(&self, key: &BoundingBox) -> HRTreeResult<Vec<QueryMatch>>;

    /// Finds leaves of one version intersecting `key`.
    fn find_intersecting_in_version(
        &self,
        key: &BoundingBox,
        version_id: ObjectId,
    ) -> HRTreeResult<Vec<QueryMatch>>;

    /// Finds leaves of every version lying inside `key`.
    fn find_contained(&self, key: &BoundingBox) -> HRTreeResult<Vec<QueryMatch>>;

    fn has_version(&self, version_id: ObjectId) -> bool;

    /// Number of version roots.
    fn num_roots(&self) -> usize;

    /// Number of leaf entries across all versions.
    fn size(&self) -> u64;

    /// Drops one version. Returns false if it did not exist.
    fn remove_version(&self, version_id: ObjectId) -> HRTreeResult<bool>;

    fn stats(&self) -> HRTreeStats;

    /// Drops every version.
    fn clear(&self) -> HRTreeResult<()>;
}
