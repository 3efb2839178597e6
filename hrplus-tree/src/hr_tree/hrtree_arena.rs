//! Slot storage for entries and containers.
//!
//! Ownership runs one way: a container owns its entries and an internal entry
//! owns its child container. The upward links (`parent_container`,
//! `parent_entry`) are plain handles used for navigation only. Releasing an
//! entry or container frees its whole owned subtree.
//!
//! Read operations never fail. A stale or unknown handle behaves like an
//! empty container or an absent entry. Mutations on a stale handle return
//! [`HRTreeError::StaleHandle`].

use super::hrtree_constants::LEAF_ONLY_HEIGHT;
use super::hrtree_types::{
    Container, ContainerId, Entry, EntryId, EntryKind, HRTreeError, HRTreeResult,
};
use crate::bounding_box::BoundingBox;
use crate::object_id::ObjectId;
use std::collections::{HashSet, VecDeque};

/// Generational slot vector backing one kind of node.
#[derive(Debug, Clone)]
struct Slots<T> {
    items: Vec<Option<T>>,
    generations: Vec<u32>, // last generation per slot, kept across frees
    free_list: Vec<usize>,
    live: usize,
}

impl<T> Slots<T> {
    fn new() -> Self {
        Slots {
            items: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    fn alloc(&mut self, make: impl FnOnce(u32, u32) -> T) -> (u32, u32) {
        self.live += 1;
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].wrapping_add(1);
            self.generations[idx] = generation;
            self.items[idx] = Some(make(idx as u32, generation));
            (idx as u32, generation)
        } else {
            let idx = self.items.len() as u32;
            let generation = 1_u32;
            self.items.push(Some(make(idx, generation)));
            self.generations.push(generation);
            (idx, generation)
        }
    }

    fn get(&self, idx: usize, generation: u32) -> Option<&T> {
        match self.generations.get(idx) {
            Some(&current) if current == generation => self.items[idx].as_ref(),
            _ => None,
        }
    }

    fn get_mut(&mut self, idx: usize, generation: u32) -> Option<&mut T> {
        match self.generations.get(idx) {
            Some(&current) if current == generation => self.items[idx].as_mut(),
            _ => None,
        }
    }

    fn free(&mut self, idx: usize, generation: u32) -> Option<T> {
        self.get(idx, generation)?;
        let item = self.items[idx].take();
        self.free_list.push(idx);
        self.live -= 1;
        item
    }
}

/// Storage for every entry and container of an HR+Tree.
///
/// All entry and container operations go through the arena, addressed by
/// [`EntryId`] and [`ContainerId`] handles.
///
/// # Examples
///
/// ```rust
/// use hrplus_tree::{BoundingBox, NodeArena, ObjectId};
///
/// let mut arena = NodeArena::new();
/// let version = ObjectId::for_name("v1");
/// let container = arena.new_container();
/// let leaf = arena.new_entry(ObjectId::NULL, BoundingBox::new(0.0, 0.0, 1.0, 1.0), version);
///
/// arena.add_node(container, leaf).unwrap();
/// assert_eq!(arena.num_nodes(container), 1);
/// assert_eq!(arena.parent_container(leaf), Some(container));
///
/// let mut hits = Vec::new();
/// arena.query_container(container, &BoundingBox::new(0.5, 0.5, 2.0, 2.0), &mut hits);
/// assert_eq!(hits, vec![leaf]);
/// ```
#[derive(Debug, Clone)]
pub struct NodeArena {
    entries: Slots<Entry>,
    containers: Slots<Container>,
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena {
            entries: Slots::new(),
            containers: Slots::new(),
        }
    }

    // ------------------------------------------------------------------
    // Allocation and lookup
    // ------------------------------------------------------------------

    /// Allocates a detached leaf entry.
    pub fn new_entry(
        &mut self,
        feature_id: ObjectId,
        bounds: BoundingBox,
        version_id: ObjectId,
    ) -> EntryId {
        let (idx, generation) = self.entries.alloc(|idx, generation| Entry {
            id: EntryId::new(idx, generation),
            feature_id,
            version_id,
            bounds,
            kind: EntryKind::Leaf,
            parent_container: None,
        });
        EntryId::new(idx, generation)
    }

    /// Allocates a detached internal entry owning `child`.
    ///
    /// The entry's bounds are the child's current MBR and the child's
    /// `parent_entry` is pointed at the new entry.
    pub fn new_internal_entry(
        &mut self,
        version_id: ObjectId,
        child: ContainerId,
    ) -> HRTreeResult<EntryId> {
        if !self.contains_container(child) {
            return Err(stale_container(child));
        }
        let bounds = self.mbr(child);
        let (idx, generation) = self.entries.alloc(|idx, generation| Entry {
            id: EntryId::new(idx, generation),
            feature_id: ObjectId::NULL,
            version_id,
            bounds,
            kind: EntryKind::Internal(child),
            parent_container: None,
        });
        let id = EntryId::new(idx, generation);
        self.container_mut(child)?.parent_entry = Some(id);
        Ok(id)
    }

    /// Allocates an empty container with no parent entry.
    pub fn new_container(&mut self) -> ContainerId {
        let (idx, generation) = self.containers.alloc(|idx, generation| Container {
            id: ContainerId::new(idx, generation),
            entries: Vec::new(),
            parent_entry: None,
        });
        ContainerId::new(idx, generation)
    }

    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.idx(), id.generation())
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.idx(), id.generation())
    }

    pub fn contains_entry(&self, id: EntryId) -> bool {
        self.entry(id).is_some()
    }

    pub fn contains_container(&self, id: ContainerId) -> bool {
        self.container(id).is_some()
    }

    /// Number of live entries, leaf and internal.
    pub fn entry_count(&self) -> usize {
        self.entries.live
    }

    /// Number of live containers.
    pub fn container_count(&self) -> usize {
        self.containers.live
    }

    fn entry_mut(&mut self, id: EntryId) -> HRTreeResult<&mut Entry> {
        self.entries
            .get_mut(id.idx(), id.generation())
            .ok_or_else(|| stale_entry(id))
    }

    fn container_mut(&mut self, id: ContainerId) -> HRTreeResult<&mut Container> {
        self.containers
            .get_mut(id.idx(), id.generation())
            .ok_or_else(|| stale_container(id))
    }

    // ------------------------------------------------------------------
    // Container operations
    // ------------------------------------------------------------------

    /// Appends `entry` to `container` and points the entry back at it.
    ///
    /// An entry already held by another container is detached from it first.
    /// No overflow check is done here. An internal entry cannot be added
    /// to its own child container or anywhere below it.
    pub fn add_node(&mut self, container: ContainerId, entry: EntryId) -> HRTreeResult<()> {
        if !self.contains_container(container) {
            return Err(stale_container(container));
        }
        if let Some(child) = self.child(entry) {
            if self.reaches(child, container) {
                log::error!("Rejected adding {:?} below its own child {:?}", entry, child);
                return Err(HRTreeError::InvalidArgument(format!(
                    "{:?} owns {:?}, which holds {:?}",
                    entry, child, container
                )));
            }
        }
        let previous = self.entry_mut(entry)?.parent_container.take();
        if let Some(previous) = previous {
            if let Some(old) = self.containers.get_mut(previous.idx(), previous.generation()) {
                old.entries.retain(|&e| e != entry);
            }
        }
        self.container_mut(container)?.entries.push(entry);
        self.entry_mut(entry)?.parent_container = Some(container);
        Ok(())
    }

    /// Removes `entry` if it is a direct member of `container`.
    ///
    /// Never looks inside child containers. The removed entry stays alive,
    /// detached, until it is re-added or released.
    pub fn remove_node(&mut self, container: ContainerId, entry: EntryId) -> bool {
        let Some(c) = self.containers.get_mut(container.idx(), container.generation()) else {
            return false;
        };
        let Some(pos) = c.entries.iter().position(|&e| e == entry) else {
            return false;
        };
        c.entries.remove(pos);
        if let Some(e) = self.entries.get_mut(entry.idx(), entry.generation()) {
            e.parent_container = None;
        }
        true
    }

    /// Direct entries of `container`.
    pub fn nodes(&self, container: ContainerId) -> &[EntryId] {
        self.container(container)
            .map(|c| c.entries.as_slice())
            .unwrap_or(&[])
    }

    /// Number of direct entries of `container`.
    pub fn num_nodes(&self, container: ContainerId) -> usize {
        self.nodes(container).len()
    }

    /// True if the container is empty or holds only leaf entries.
    pub fn is_leaf(&self, container: ContainerId) -> bool {
        self.nodes(container)
            .iter()
            .all(|&e| self.entry(e).map(Entry::is_leaf).unwrap_or(true))
    }

    /// True if every direct entry is internal and points at a leaf container.
    ///
    /// An empty container, or one holding leaf entries, is not one step above
    /// the leaf level.
    pub fn is_one_step_above_leaf_level(&self, container: ContainerId) -> bool {
        let nodes = self.nodes(container);
        if nodes.is_empty() {
            return false;
        }
        nodes.iter().all(|&e| match self.child(e) {
            Some(child) => self.is_leaf(child),
            None => false,
        })
    }

    /// Union of the bounds of the direct entries.
    ///
    /// Uses each entry's own `bounds`, never the contents of child containers.
    pub fn mbr(&self, container: ContainerId) -> BoundingBox {
        self.nodes(container)
            .iter()
            .filter_map(|&e| self.entry(e))
            .fold(BoundingBox::empty(), |acc, e| acc.union(&e.bounds))
    }

    /// `mbr(container) ∩ query`.
    pub fn container_overlap(&self, container: ContainerId, query: &BoundingBox) -> BoundingBox {
        self.mbr(container).intersection(query)
    }

    /// Collects every leaf under `container` intersecting `query`.
    ///
    /// An entry is descended only when its own bounds and
    /// [`entry_overlap`](Self::entry_overlap) both meet the query, so
    /// disjoint subtrees are never visited.
    pub fn query_container(
        &self,
        container: ContainerId,
        query: &BoundingBox,
        out: &mut Vec<EntryId>,
    ) {
        for &e in self.nodes(container) {
            let Some(entry) = self.entry(e) else {
                continue;
            };
            if !entry.bounds.intersects(query) {
                continue;
            }
            if !self.entry_overlap(e, query).is_empty() {
                self.query_entry(e, query, out);
            }
        }
    }

    /// Entry pointing at `container`, `None` for a root or detached container.
    pub fn parent_entry(&self, container: ContainerId) -> Option<EntryId> {
        self.container(container).and_then(|c| c.parent_entry)
    }

    /// Sets the upward link of `container`. Does not touch the entry.
    pub fn set_parent_entry(
        &mut self,
        container: ContainerId,
        parent: Option<EntryId>,
    ) -> HRTreeResult<()> {
        self.container_mut(container)?.parent_entry = parent;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// For a leaf, `bounds ∩ query`. For an internal entry, the overlap of
    /// the child container's live MBR with the query.
    pub fn entry_overlap(&self, entry: EntryId, query: &BoundingBox) -> BoundingBox {
        match self.entry(entry) {
            None => BoundingBox::empty(),
            Some(e) => match e.kind {
                EntryKind::Leaf => e.bounds.intersection(query),
                EntryKind::Internal(child) => self.container_overlap(child, query),
            },
        }
    }

    /// A leaf adds itself to `out` when its bounds meet the query. An
    /// internal entry forwards to its child container.
    pub fn query_entry(&self, entry: EntryId, query: &BoundingBox, out: &mut Vec<EntryId>) {
        let Some(e) = self.entry(entry) else {
            return;
        };
        match e.kind {
            EntryKind::Leaf => {
                if !e.bounds.intersection(query).is_empty() {
                    out.push(entry);
                }
            }
            EntryKind::Internal(child) => self.query_container(child, query, out),
        }
    }

    /// Grows `env` to cover this entry's bounds. The entry is unchanged.
    pub fn expand(&self, entry: EntryId, env: &mut BoundingBox) {
        if let Some(e) = self.entry(entry) {
            env.expand_to_include(&e.bounds);
        }
    }

    pub fn child(&self, entry: EntryId) -> Option<ContainerId> {
        self.entry(entry).and_then(Entry::child)
    }

    /// Makes `entry` internal (`Some`) or a leaf (`None`).
    ///
    /// Only the entry is changed. The child's `parent_entry` is left for the
    /// caller to set, and a replaced child is not released.
    ///
    /// The child must be live and must not already belong to another live
    /// entry. It also must not hold the entry itself at any depth.
    pub fn set_child(&mut self, entry: EntryId, child: Option<ContainerId>) -> HRTreeResult<()> {
        if !self.contains_entry(entry) {
            return Err(stale_entry(entry));
        }
        if let Some(c) = child {
            if !self.contains_container(c) {
                return Err(stale_container(c));
            }
            if let Some(owner) = self.parent_entry(c) {
                if owner != entry && self.contains_entry(owner) {
                    log::error!("Rejected {:?} as child of {:?}, owned by {:?}", c, entry, owner);
                    return Err(HRTreeError::InvalidArgument(format!(
                        "{:?} already belongs to {:?}",
                        c, owner
                    )));
                }
            }
            if let Some(parent) = self.parent_container(entry) {
                if self.reaches(c, parent) {
                    log::error!("Rejected {:?} as child of {:?}, it holds the entry", c, entry);
                    return Err(HRTreeError::InvalidArgument(format!(
                        "{:?} holds {:?} and cannot be its child",
                        c, entry
                    )));
                }
            }
        }
        let e = self.entry_mut(entry)?;
        e.kind = match child {
            Some(c) => EntryKind::Internal(c),
            None => EntryKind::Leaf,
        };
        Ok(())
    }

    pub fn parent_container(&self, entry: EntryId) -> Option<ContainerId> {
        self.entry(entry).and_then(|e| e.parent_container)
    }

    /// Sets the upward link of `entry`. Does not touch container membership.
    pub fn set_parent_container(
        &mut self,
        entry: EntryId,
        parent: Option<ContainerId>,
    ) -> HRTreeResult<()> {
        self.entry_mut(entry)?.parent_container = parent;
        Ok(())
    }

    pub fn set_bounds(&mut self, entry: EntryId, bounds: BoundingBox) -> HRTreeResult<()> {
        self.entry_mut(entry)?.bounds = bounds;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Release
    // ------------------------------------------------------------------

    /// Detaches `entry` from its container and frees it with everything it
    /// owns. Returns false for a stale handle.
    pub fn release_entry(&mut self, entry: EntryId) -> bool {
        let Some(parent) = self.entry(entry).map(|e| e.parent_container) else {
            return false;
        };
        if let Some(parent) = parent {
            self.remove_node(parent, entry);
        }
        self.free_entry_subtree(entry);
        true
    }

    /// Frees `container` with all its entries and their subtrees.
    ///
    /// An entry still pointing at the container is turned into a leaf.
    pub fn release_container(&mut self, container: ContainerId) -> bool {
        let Some(parent) = self.container(container).map(|c| c.parent_entry) else {
            return false;
        };
        if let Some(parent) = parent {
            if let Some(e) = self.entries.get_mut(parent.idx(), parent.generation()) {
                if e.kind == EntryKind::Internal(container) {
                    e.kind = EntryKind::Leaf;
                }
            }
        }
        self.free_container_subtree(container);
        true
    }

    /// Frees an entry record only. Its child, if any, survives detached.
    pub(crate) fn release_entry_shallow(&mut self, entry: EntryId) -> bool {
        let Some(e) = self.entry(entry) else {
            return false;
        };
        let (parent, kind) = (e.parent_container, e.kind);
        if let Some(parent) = parent {
            self.remove_node(parent, entry);
        }
        if let EntryKind::Internal(child) = kind {
            if let Some(c) = self.containers.get_mut(child.idx(), child.generation()) {
                if c.parent_entry == Some(entry) {
                    c.parent_entry = None;
                }
            }
        }
        self.entries.free(entry.idx(), entry.generation());
        true
    }

    fn free_entry_subtree(&mut self, entry: EntryId) {
        if let Some(e) = self.entries.free(entry.idx(), entry.generation()) {
            if let EntryKind::Internal(child) = e.kind {
                self.free_container_subtree(child);
            }
        }
    }

    fn free_container_subtree(&mut self, container: ContainerId) {
        if let Some(c) = self.containers.free(container.idx(), container.generation()) {
            for entry in c.entries {
                self.free_entry_subtree(entry);
            }
        }
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Every leaf entry reachable from `container`, depth first.
    pub fn leaf_entries(&self, container: ContainerId) -> Vec<EntryId> {
        let mut out = Vec::new();
        self.collect_entries(container, false, &mut out);
        out
    }

    /// Every entry reachable from `container`, internal ones included,
    /// each internal entry listed before its subtree.
    pub fn descendant_entries(&self, container: ContainerId) -> Vec<EntryId> {
        let mut out = Vec::new();
        self.collect_entries(container, true, &mut out);
        out
    }

    fn collect_entries(&self, container: ContainerId, with_internal: bool, out: &mut Vec<EntryId>) {
        for &id in self.nodes(container) {
            match self.entry(id).map(|e| e.kind) {
                Some(EntryKind::Leaf) => out.push(id),
                Some(EntryKind::Internal(child)) => {
                    if with_internal {
                        out.push(id);
                    }
                    self.collect_entries(child, with_internal, out);
                }
                None => {}
            }
        }
    }

    /// `container` and every container below it, breadth first.
    pub fn containers_under(&self, container: ContainerId) -> Vec<ContainerId> {
        let mut out = Vec::new();
        if !self.contains_container(container) {
            return out;
        }
        let mut queue = VecDeque::from([container]);
        while let Some(current) = queue.pop_front() {
            out.push(current);
            queue.extend(self.nodes(current).iter().filter_map(|&e| self.child(e)));
        }
        out
    }

    /// Number of container levels from `container` down to the leaves along
    /// the first internal path. 1 for a leaf container, 0 for a stale handle.
    pub fn height(&self, container: ContainerId) -> usize {
        if !self.contains_container(container) {
            return 0;
        }
        let mut height = LEAF_ONLY_HEIGHT;
        let mut current = container;
        while let Some(child) = self.nodes(current).iter().find_map(|&e| self.child(e)) {
            height += 1;
            current = child;
        }
        height
    }

    /// True if `target` is `from` or lies anywhere below it.
    fn reaches(&self, from: ContainerId, target: ContainerId) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(c) = stack.pop() {
            if c == target {
                return true;
            }
            if !seen.insert(c) {
                continue;
            }
            stack.extend(self.nodes(c).iter().filter_map(|&e| self.child(e)));
        }
        false
    }
}

fn stale_entry(id: EntryId) -> HRTreeError {
    HRTreeError::StaleHandle(format!("{:?} does not refer to a live entry", id))
}

fn stale_container(id: ContainerId) -> HRTreeError {
    HRTreeError::StaleHandle(format!("{:?} does not refer to a live container", id))
}
