//! # HR+Tree - Multi-Version Spatial Index
//!
//! This crate provides a Historical R+ Tree: an in-memory R*-style index of
//! axis-aligned bounding boxes where every entry belongs to a version, and
//! every version is its own independently queryable tree.
//!
//! ## Features
//!
//! - **Multi-Version Roots**: One root per version id, created on first insert
//! - **R* Splits**: Split axis chosen by margin, split index by overlap then area
//! - **Arena Storage**: Entries and containers addressed by generational handles
//! - **Integrity Checks**: Fan-out, back-reference and bounds verification
//! - **Thread Safe Handle**: `SharedHRPlusTree` behind a single reader-writer lock
//!
//! ## Quick Start
//!
//! ```rust
//! use hrplus_tree::{BoundingBox, HRPlusTree, ObjectId};
//!
//! # fn main() -> Result<(), hrplus_tree::HRTreeError> {
//! let mut tree = HRPlusTree::new();
//! let v1 = ObjectId::for_name("commit-1");
//!
//! for i in 0..10 {
//!     let x = i as f64 * 2.0;
//!     tree.insert(BoundingBox::new(x, 0.0, x + 1.0, 1.0), v1)?;
//! }
//!
//! let hits = tree.query_version(&BoundingBox::new(0.0, 0.0, 4.5, 1.0), v1);
//! assert_eq!(hits.len(), 3);
//! assert!(tree.check_integrity().is_valid);
//! # Ok(())
//! # }
//! ```

pub mod bounding_box;
pub mod hr_tree;
pub mod object_id;
pub mod versioned_rtree;

pub use bounding_box::BoundingBox;
pub use hr_tree::{
    HRPlusTree, HRTreeConfig, HRTreeError, HRTreeResult, HRTreeStats, IntegrityReport, NodeArena,
    QueryMatch, SharedHRPlusTree,
};
pub use object_id::ObjectId;
pub use versioned_rtree::VersionedRTree;

#[cfg(test)]
#[ctor::ctor]
fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
