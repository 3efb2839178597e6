//! Thread-safe handle over an [`HRPlusTree`].

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::hrtree_config::HRTreeConfig;
use super::hrtree_impl::HRPlusTree;
use super::hrtree_types::{HRTreeResult, HRTreeStats, QueryMatch};
use crate::bounding_box::BoundingBox;
use crate::object_id::ObjectId;
use crate::versioned_rtree::VersionedRTree;

/// A cloneable, lock-protected [`HRPlusTree`].
///
/// One reader-writer lock guards the whole structure: queries run in
/// parallel, inserts and removals are exclusive. Clones share the same tree.
///
/// # Examples
///
/// ```rust
/// use hrplus_tree::{BoundingBox, ObjectId, SharedHRPlusTree, VersionedRTree};
///
/// # fn main() -> Result<(), hrplus_tree::HRTreeError> {
/// let tree = SharedHRPlusTree::new();
/// let writer = tree.clone();
/// let v = ObjectId::for_name("v1");
///
/// std::thread::spawn(move || writer.add(ObjectId::NULL, &BoundingBox::new(0.0, 0.0, 1.0, 1.0), v))
///     .join()
///     .unwrap()?;
///
/// assert_eq!(tree.size(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct SharedHRPlusTree {
    inner: Arc<RwLock<HRPlusTree>>,
}

impl SharedHRPlusTree {
    pub fn new() -> Self {
        Self::from_tree(HRPlusTree::new())
    }

    /// # Errors
    ///
    /// Returns [`HRTreeError::InvalidConfig`](super::HRTreeError::InvalidConfig)
    /// for a configuration that does not validate.
    pub fn with_config(config: HRTreeConfig) -> HRTreeResult<Self> {
        Ok(Self::from_tree(HRPlusTree::with_config(config)?))
    }

    pub fn from_tree(tree: HRPlusTree) -> Self {
        SharedHRPlusTree {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Shared access for several reads under one lock.
    pub fn read(&self) -> RwLockReadGuard<'_, HRPlusTree> {
        self.inner.read()
    }

    /// Exclusive access for several writes under one lock.
    pub fn write(&self) -> RwLockWriteGuard<'_, HRPlusTree> {
        self.inner.write()
    }
}

impl std::fmt::Debug for SharedHRPlusTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tree = self.inner.read();
        f.debug_struct("SharedHRPlusTree")
            .field("num_roots", &tree.num_roots())
            .field("config", tree.config())
            .finish()
    }
}

impl VersionedRTree for SharedHRPlusTree {
    fn add(
        &self,
        feature_id: ObjectId,
        key: &BoundingBox,
        version_id: ObjectId,
    ) -> HRTreeResult<()> {
        self.inner.write().insert_feature(feature_id, *key, version_id)?;
        Ok(())
    }

    fn find_intersecting(&self, key: &BoundingBox) -> HRTreeResult<Vec<QueryMatch>> {
        Ok(self.inner.read().query(key))
    }

    fn find_intersecting_in_version(
        &self,
        key: &BoundingBox,
        version_id: ObjectId,
    ) -> HRTreeResult<Vec<QueryMatch>> {
        Ok(self.inner.read().query_version(key, version_id))
    }

    fn find_contained(&self, key: &BoundingBox) -> HRTreeResult<Vec<QueryMatch>> {
        Ok(self.inner.read().query_contained(key))
    }

    fn has_version(&self, version_id: ObjectId) -> bool {
        self.inner.read().has_version(version_id)
    }

    fn num_roots(&self) -> usize {
        self.inner.read().num_roots()
    }

    fn size(&self) -> u64 {
        self.inner.read().len() as u64
    }

    fn remove_version(&self, version_id: ObjectId) -> HRTreeResult<bool> {
        Ok(self.inner.write().remove_version(version_id))
    }

    fn stats(&self) -> HRTreeStats {
        self.inner.read().stats()
    }

    fn clear(&self) -> HRTreeResult<()> {
        self.inner.write().clear();
        Ok(())
    }
}
