//! Structural checks over every version tree.

use indexmap::IndexMap;

use super::hrtree_arena::NodeArena;
use super::hrtree_config::HRTreeConfig;
use super::hrtree_types::{ContainerId, EntryKind};
use crate::object_id::ObjectId;

/// Result of [`HRPlusTree::check_integrity`](super::HRPlusTree::check_integrity).
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrityReport {
    /// Containers visited
    pub containers_checked: usize,
    /// Entries visited, leaves and internal ones
    pub entries_checked: usize,
    /// True when no rule was broken
    pub is_valid: bool,
    /// One message per broken rule
    pub errors: Vec<String>,
}

impl IntegrityReport {
    pub fn new() -> Self {
        Self {
            containers_checked: 0,
            entries_checked: 0,
            is_valid: true,
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, message: String) {
        self.is_valid = false;
        self.errors.push(message);
    }
}

impl Default for IntegrityReport {
    fn default() -> Self {
        Self::new()
    }
}

struct Checker<'a> {
    arena: &'a NodeArena,
    config: &'a HRTreeConfig,
    version: ObjectId,
    leaf_depth: Option<usize>,
    report: IntegrityReport,
}

pub(crate) fn check_tree(
    arena: &NodeArena,
    roots: &IndexMap<ObjectId, ContainerId>,
    config: &HRTreeConfig,
) -> IntegrityReport {
    let mut report = IntegrityReport::new();
    for (&version, &root) in roots {
        let mut checker = Checker {
            arena,
            config,
            version,
            leaf_depth: None,
            report,
        };
        checker.check_root(root);
        report = checker.report;
    }
    if !report.is_valid {
        log::warn!("Integrity check found {} problems", report.errors.len());
    }
    report
}

impl Checker<'_> {
    fn check_root(&mut self, root: ContainerId) {
        match self.arena.container(root) {
            None => self.report.fail(format!(
                "version {}: root {:?} is not a live container",
                self.version, root
            )),
            Some(c) => {
                if let Some(parent) = c.parent_entry() {
                    self.report.fail(format!(
                        "version {}: root {:?} has parent entry {:?}",
                        self.version, root, parent
                    ));
                }
                self.check_container(root, 1, true);
            }
        }
    }

    fn check_container(&mut self, id: ContainerId, depth: usize, is_root: bool) {
        let arena = self.arena;
        let Some(container) = arena.container(id) else {
            self.report.fail(format!("{:?} is not a live container", id));
            return;
        };
        self.report.containers_checked += 1;

        let n = container.num_entries();
        if n > self.config.max_degree() {
            self.report.fail(format!(
                "{:?} holds {} entries, more than {}",
                id,
                n,
                self.config.max_degree()
            ));
        }
        if !is_root && n < self.config.min_degree() {
            self.report.fail(format!(
                "{:?} holds {} entries, fewer than {}",
                id,
                n,
                self.config.min_degree()
            ));
        }

        let mut leaves = 0usize;
        for &entry_id in container.entries() {
            let Some(entry) = arena.entry(entry_id) else {
                self.report
                    .fail(format!("{:?} lists dead entry {:?}", id, entry_id));
                continue;
            };
            self.report.entries_checked += 1;

            if entry.parent_container() != Some(id) {
                self.report.fail(format!(
                    "{:?} sits in {:?} but points at {:?}",
                    entry_id,
                    id,
                    entry.parent_container()
                ));
            }
            if entry.version_id() != self.version {
                self.report.fail(format!(
                    "{:?} carries version {} inside version {}",
                    entry_id,
                    entry.version_id(),
                    self.version
                ));
            }

            match entry.kind() {
                EntryKind::Leaf => leaves += 1,
                EntryKind::Internal(child) => {
                    if arena.parent_entry(child) != Some(entry_id) {
                        self.report.fail(format!(
                            "{:?} owns {:?} but the child points at {:?}",
                            entry_id,
                            child,
                            arena.parent_entry(child)
                        ));
                    }
                    let mbr = arena.mbr(child);
                    if *entry.bounds() != mbr {
                        self.report.fail(format!(
                            "{:?} bounds {} differ from child MBR {}",
                            entry_id,
                            entry.bounds(),
                            mbr
                        ));
                    }
                    self.check_container(child, depth + 1, false);
                }
            }
        }

        if leaves > 0 && leaves < n {
            self.report
                .fail(format!("{:?} mixes leaf and internal entries", id));
        }
        if leaves > 0 || n == 0 {
            match self.leaf_depth {
                None => self.leaf_depth = Some(depth),
                Some(expected) if expected != depth => self.report.fail(format!(
                    "version {}: leaves at depth {} and {}",
                    self.version, expected, depth
                )),
                Some(_) => {}
            }
        }
    }
}
