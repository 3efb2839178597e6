//! HRPlusTree implementation.

use indexmap::IndexMap;

use super::hrtree_arena::NodeArena;
use super::hrtree_config::HRTreeConfig;
use super::hrtree_integrity::{check_tree, IntegrityReport};
use super::hrtree_partition::choose_split;
use super::hrtree_types::{
    ContainerId, Entry, EntryId, HRTreeError, HRTreeResult, HRTreeStats, QueryMatch,
};
use crate::bounding_box::BoundingBox;
use crate::object_id::ObjectId;

/// A multi-version R*-style spatial index.
///
/// Every version id gets its own root container. Versions share the node
/// storage and the split machinery but never share subtrees, so inserting
/// into one version cannot change what another version returns.
///
/// The tree is single-writer: mutating methods take `&mut self`. Wrap it in
/// [`SharedHRPlusTree`](super::SharedHRPlusTree) to share it between threads.
///
/// # Examples
///
/// ```rust
/// use hrplus_tree::{BoundingBox, HRPlusTree, ObjectId};
///
/// # fn main() -> Result<(), hrplus_tree::HRTreeError> {
/// let mut tree = HRPlusTree::new();
/// let v1 = ObjectId::for_name("v1");
/// let v2 = ObjectId::for_name("v2");
///
/// tree.insert(BoundingBox::new(0.0, 0.0, 1.0, 1.0), v1)?;
/// tree.insert(BoundingBox::new(0.0, 0.0, 1.0, 1.0), v2)?;
/// tree.insert(BoundingBox::new(5.0, 5.0, 6.0, 6.0), v2)?;
///
/// assert_eq!(tree.num_roots(), 2);
/// assert_eq!(tree.query(&BoundingBox::new(0.5, 0.5, 2.0, 2.0)).len(), 2);
/// assert_eq!(tree.query_version(&BoundingBox::new(4.0, 4.0, 7.0, 7.0), v1).len(), 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HRPlusTree {
    arena: NodeArena,
    /// Version roots in creation order
    roots: IndexMap<ObjectId, ContainerId>,
    config: HRTreeConfig,
}

impl Default for HRPlusTree {
    fn default() -> Self {
        Self::new()
    }
}

impl HRPlusTree {
    /// Creates an empty tree with the default fan-out.
    pub fn new() -> Self {
        HRPlusTree {
            arena: NodeArena::new(),
            roots: IndexMap::new(),
            config: HRTreeConfig::default(),
        }
    }

    /// Creates an empty tree with a custom fan-out.
    ///
    /// # Errors
    ///
    /// Returns [`HRTreeError::InvalidConfig`] if the configuration does not
    /// validate.
    pub fn with_config(config: HRTreeConfig) -> HRTreeResult<Self> {
        config.validate()?;
        Ok(HRPlusTree {
            arena: NodeArena::new(),
            roots: IndexMap::new(),
            config,
        })
    }

    /// Builds a tree by inserting `(feature_id, bounds, version_id)` triples
    /// in order.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration or on the first rejected insert.
    pub fn from_features<I>(config: HRTreeConfig, features: I) -> HRTreeResult<Self>
    where
        I: IntoIterator<Item = (ObjectId, BoundingBox, ObjectId)>,
    {
        let mut tree = Self::with_config(config)?;
        let mut count = 0usize;
        for (feature_id, bounds, version_id) in features {
            tree.insert_feature(feature_id, bounds, version_id)?;
            count += 1;
        }
        log::debug!(
            "Built HR+Tree from {} features across {} versions",
            count,
            tree.num_roots()
        );
        Ok(tree)
    }

    pub fn config(&self) -> &HRTreeConfig {
        &self.config
    }

    pub fn max_degree(&self) -> usize {
        self.config.max_degree()
    }

    pub fn min_degree(&self) -> usize {
        self.config.min_degree()
    }

    /// Node storage, for inspecting entries and containers.
    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Mutable node storage, for callers that build or split containers
    /// themselves. Edits made here bypass the tree's balancing.
    pub fn arena_mut(&mut self) -> &mut NodeArena {
        &mut self.arena
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.arena.entry(id)
    }

    // ------------------------------------------------------------------
    // Insert
    // ------------------------------------------------------------------

    /// Indexes `bounds` under `version_id` with a null feature id.
    ///
    /// # Errors
    ///
    /// Returns [`HRTreeError::InvalidArgument`] for non-finite coordinates.
    pub fn insert(&mut self, bounds: BoundingBox, version_id: ObjectId) -> HRTreeResult<EntryId> {
        self.insert_feature(ObjectId::NULL, bounds, version_id)
    }

    /// Indexes `bounds` for `feature_id` under `version_id`.
    ///
    /// The version's root is created on first use. Overflowing containers
    /// are split on the way back up, and a split of the root grows the
    /// version's tree by one level.
    ///
    /// # Errors
    ///
    /// Returns [`HRTreeError::InvalidArgument`] for non-finite coordinates.
    pub fn insert_feature(
        &mut self,
        feature_id: ObjectId,
        bounds: BoundingBox,
        version_id: ObjectId,
    ) -> HRTreeResult<EntryId> {
        if !bounds.is_finite() {
            log::error!("Rejected insert of non-finite box {:?}", bounds);
            return Err(HRTreeError::InvalidArgument(format!(
                "bounding box must be finite, got {:?}",
                bounds
            )));
        }
        if bounds.is_empty() && bounds != BoundingBox::empty() {
            log::error!("Rejected insert of reversed box {:?}", bounds);
            return Err(HRTreeError::InvalidArgument(format!(
                "bounding box corners are reversed, got {:?}",
                bounds
            )));
        }

        let root = match self.roots.get(&version_id) {
            Some(&root) => root,
            None => {
                let root = self.arena.new_container();
                self.roots.insert(version_id, root);
                log::debug!("Created root {:?} for version {}", root, version_id);
                root
            }
        };

        let leaf = self.arena.new_entry(feature_id, bounds, version_id);
        if let Some((low, high)) = self.insert_into(root, leaf, &bounds, version_id)? {
            let new_root = self.arena.new_container();
            self.arena.add_node(new_root, low)?;
            self.arena.add_node(new_root, high)?;
            self.roots.insert(version_id, new_root);
            log::debug!(
                "Root split for version {}, height now {}",
                version_id,
                self.arena.height(new_root)
            );
        }
        Ok(leaf)
    }

    /// Inserts `leaf` somewhere below `container`.
    ///
    /// Returns the two entries that must replace the entry pointing at
    /// `container` when it had to be split.
    fn insert_into(
        &mut self,
        container: ContainerId,
        leaf: EntryId,
        bounds: &BoundingBox,
        version_id: ObjectId,
    ) -> HRTreeResult<Option<(EntryId, EntryId)>> {
        if self.arena.is_leaf(container) {
            self.arena.add_node(container, leaf)?;
        } else {
            let slot = self.choose_subtree(container, bounds)?;
            let child = self.arena.child(slot).ok_or_else(|| {
                HRTreeError::CorruptStructure(format!("{:?} chosen for descent has no child", slot))
            })?;
            match self.insert_into(child, leaf, bounds, version_id)? {
                None => {
                    let mbr = self.arena.mbr(child);
                    self.arena.set_bounds(slot, mbr)?;
                }
                Some((low, high)) => {
                    self.arena.release_entry_shallow(slot);
                    self.arena.add_node(container, low)?;
                    self.arena.add_node(container, high)?;
                }
            }
        }

        if self.arena.num_nodes(container) > self.config.max_degree() {
            let sibling = self.key_split_container_node(container)?;
            let low = self.arena.new_internal_entry(version_id, container)?;
            let high = self.arena.new_internal_entry(version_id, sibling)?;
            return Ok(Some((low, high)));
        }
        Ok(None)
    }

    /// Picks the entry of `container` to descend into.
    ///
    /// Right above the leaves the entry overlapping the new box least wins,
    /// ties going to the least area enlargement. Higher up only the
    /// enlargement counts. Remaining ties keep the first entry.
    fn choose_subtree(
        &self,
        container: ContainerId,
        bounds: &BoundingBox,
    ) -> HRTreeResult<EntryId> {
        let above_leaves = self.arena.is_one_step_above_leaf_level(container);
        let mut best: Option<(EntryId, f64, f64)> = None;

        for &id in self.arena.nodes(container) {
            let Some(entry) = self.arena.entry(id) else {
                continue;
            };
            let overlap = if above_leaves {
                entry.bounds.intersection(bounds).area()
            } else {
                0.0
            };
            let enlargement = entry.bounds.enlargement(bounds);
            let better = match best {
                None => true,
                Some((_, best_overlap, best_enlargement)) => {
                    overlap < best_overlap
                        || (overlap == best_overlap && enlargement < best_enlargement)
                }
            };
            if better {
                best = Some((id, overlap, enlargement));
            }
        }

        best.map(|(id, _, _)| id).ok_or_else(|| {
            HRTreeError::CorruptStructure(format!("{:?} has no entry to descend into", container))
        })
    }

    // ------------------------------------------------------------------
    // Split
    // ------------------------------------------------------------------

    /// Splits `container` with the R* heuristic.
    ///
    /// `container` keeps the low group. A new detached sibling receives the
    /// high group and is returned. Parent links are not touched, so the
    /// caller decides where the sibling goes.
    ///
    /// # Errors
    ///
    /// Returns [`HRTreeError::InvalidArgument`] if `container` is not live or
    /// holds fewer than `2 * min_degree` or more than `max_degree + 1`
    /// entries.
    pub fn key_split_container_node(
        &mut self,
        container: ContainerId,
    ) -> HRTreeResult<ContainerId> {
        let Some(c) = self.arena.container(container) else {
            log::error!("Cannot split {:?}: not a live container", container);
            return Err(HRTreeError::InvalidArgument(format!(
                "{:?} is not a live container",
                container
            )));
        };

        let (min, max) = (self.config.min_degree(), self.config.max_degree());
        let n = c.num_entries();
        if n < 2 * min || n > max + 1 {
            log::error!("Cannot split {:?} holding {} entries", container, n);
            return Err(HRTreeError::InvalidArgument(format!(
                "split needs between {} and {} entries, {:?} holds {}",
                2 * min,
                max + 1,
                container,
                n
            )));
        }

        let items: Vec<Entry> = c
            .entries()
            .iter()
            .filter_map(|&id| self.arena.entry(id).cloned())
            .collect();
        if items.len() != n {
            return Err(HRTreeError::CorruptStructure(format!(
                "{:?} lists entries that are no longer live",
                container
            )));
        }

        let plan = choose_split(&items, min, max)?;
        let sibling = self.arena.new_container();
        for entry in plan.partition.group_high() {
            self.arena.add_node(sibling, entry.id())?;
        }
        Ok(sibling)
    }

    // ------------------------------------------------------------------
    // Query
    // ------------------------------------------------------------------

    fn to_matches(&self, ids: Vec<EntryId>) -> Vec<QueryMatch> {
        ids.into_iter()
            .filter_map(|id| self.arena.entry(id).map(QueryMatch::from))
            .collect()
    }

    fn collect_from(&self, root: ContainerId, query: &BoundingBox, out: &mut Vec<EntryId>) {
        self.arena.query_container(root, query, out);
    }

    /// Leaves of every version intersecting `query`, grouped by version in
    /// version creation order.
    pub fn query(&self, query: &BoundingBox) -> Vec<QueryMatch> {
        let mut ids = Vec::new();
        for &root in self.roots.values() {
            self.collect_from(root, query, &mut ids);
        }
        self.to_matches(ids)
    }

    /// Leaves of one version intersecting `query`. Empty for an unknown
    /// version.
    pub fn query_version(&self, query: &BoundingBox, version_id: ObjectId) -> Vec<QueryMatch> {
        let mut ids = Vec::new();
        if let Some(&root) = self.roots.get(&version_id) {
            self.collect_from(root, query, &mut ids);
        }
        self.to_matches(ids)
    }

    /// Leaves of every version lying entirely inside `query`.
    pub fn query_contained(&self, query: &BoundingBox) -> Vec<QueryMatch> {
        let mut matches = self.query(query);
        matches.retain(|m| query.contains(&m.bounds));
        matches
    }

    /// Leaves of one version lying entirely inside `query`.
    pub fn query_contained_in_version(
        &self,
        query: &BoundingBox,
        version_id: ObjectId,
    ) -> Vec<QueryMatch> {
        let mut matches = self.query_version(query, version_id);
        matches.retain(|m| query.contains(&m.bounds));
        matches
    }

    // ------------------------------------------------------------------
    // Versions and traversal
    // ------------------------------------------------------------------

    pub fn num_roots(&self) -> usize {
        self.roots.len()
    }

    pub fn root_for_version(&self, version_id: ObjectId) -> Option<ContainerId> {
        self.roots.get(&version_id).copied()
    }

    pub fn has_version(&self, version_id: ObjectId) -> bool {
        self.roots.contains_key(&version_id)
    }

    /// Version ids in the order their roots were created.
    pub fn versions(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.roots.keys().copied()
    }

    /// The version's root and every container below it, breadth first.
    pub fn containers_for_root(&self, version_id: ObjectId) -> Vec<ContainerId> {
        self.root_for_version(version_id)
            .map(|root| self.arena.containers_under(root))
            .unwrap_or_default()
    }

    /// Leaf entries of one version.
    pub fn leaves(&self, version_id: ObjectId) -> Vec<EntryId> {
        self.root_for_version(version_id)
            .map(|root| self.arena.leaf_entries(root))
            .unwrap_or_default()
    }

    /// Leaf entries of every version.
    pub fn nodes(&self) -> Vec<EntryId> {
        self.roots
            .values()
            .flat_map(|&root| self.arena.leaf_entries(root))
            .collect()
    }

    /// Leaf entries of one version.
    pub fn nodes_for_version(&self, version_id: ObjectId) -> Vec<EntryId> {
        self.leaves(version_id)
    }

    /// Every entry of one version, internal entries included.
    pub fn entries_for_version(&self, version_id: ObjectId) -> Vec<EntryId> {
        self.root_for_version(version_id)
            .map(|root| self.arena.descendant_entries(root))
            .unwrap_or_default()
    }

    /// Number of container levels of one version. 1 while the root holds
    /// only leaves.
    pub fn height(&self, version_id: ObjectId) -> Option<usize> {
        self.root_for_version(version_id)
            .map(|root| self.arena.height(root))
    }

    /// Number of leaf entries across all versions.
    pub fn len(&self) -> usize {
        self.roots
            .values()
            .map(|&root| self.arena.leaf_entries(root).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Drops a version and frees its whole tree. Returns false for an
    /// unknown version.
    pub fn remove_version(&mut self, version_id: ObjectId) -> bool {
        match self.roots.shift_remove(&version_id) {
            Some(root) => {
                self.arena.release_container(root);
                log::debug!("Removed version {}", version_id);
                true
            }
            None => false,
        }
    }

    /// Drops every version.
    pub fn clear(&mut self) {
        let count = self.roots.len();
        self.roots.clear();
        self.arena = NodeArena::new();
        log::debug!("Cleared {} versions", count);
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    pub fn stats(&self) -> HRTreeStats {
        let mut stats = HRTreeStats {
            num_roots: self.roots.len(),
            ..HRTreeStats::default()
        };
        for &root in self.roots.values() {
            for id in self.arena.descendant_entries(root) {
                match self.arena.entry(id) {
                    Some(e) if e.is_leaf() => stats.leaf_count += 1,
                    Some(_) => stats.internal_entry_count += 1,
                    None => {}
                }
            }
            stats.container_count += self.arena.containers_under(root).len();
            stats.max_height = stats.max_height.max(self.arena.height(root));
        }
        stats
    }

    /// Walks every version tree and reports broken structural rules.
    pub fn check_integrity(&self) -> IntegrityReport {
        check_tree(&self.arena, &self.roots, &self.config)
    }
}
