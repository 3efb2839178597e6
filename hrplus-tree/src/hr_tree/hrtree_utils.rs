//! Geometric helpers shared by the split algorithm.
//!
//! Everything here works on any slice of [`Bounded`] items, so the same code
//! runs on tree entries and on bare boxes.

use super::hrtree_types::Entry;
use crate::bounding_box::BoundingBox;

/// Anything with a rectangular extent.
pub trait Bounded {
    fn envelope(&self) -> BoundingBox;
}

impl Bounded for BoundingBox {
    fn envelope(&self) -> BoundingBox {
        *self
    }
}

impl Bounded for Entry {
    fn envelope(&self) -> BoundingBox {
        self.bounds
    }
}

impl<T: Bounded + ?Sized> Bounded for &T {
    fn envelope(&self) -> BoundingBox {
        (**self).envelope()
    }
}

fn sorted_by<T, F>(items: &[T], key: F) -> Vec<T>
where
    T: Bounded + Clone,
    F: Fn(&BoundingBox) -> f64,
{
    let mut sorted = items.to_vec();
    // sort_by is stable: equal edges keep their input order
    sorted.sort_by(|a, b| key(&a.envelope()).total_cmp(&key(&b.envelope())));
    sorted
}

/// Ascending by lower X edge.
pub fn min_x_sort<T: Bounded + Clone>(items: &[T]) -> Vec<T> {
    sorted_by(items, |b| b.min_x)
}

/// Ascending by upper X edge.
pub fn max_x_sort<T: Bounded + Clone>(items: &[T]) -> Vec<T> {
    sorted_by(items, |b| b.max_x)
}

/// Ascending by lower Y edge.
pub fn min_y_sort<T: Bounded + Clone>(items: &[T]) -> Vec<T> {
    sorted_by(items, |b| b.min_y)
}

/// Ascending by upper Y edge.
pub fn max_y_sort<T: Bounded + Clone>(items: &[T]) -> Vec<T> {
    sorted_by(items, |b| b.max_y)
}

/// Union of all item bounds, empty for an empty slice.
pub fn bounding_box_of<T: Bounded>(items: &[T]) -> BoundingBox {
    items
        .iter()
        .fold(BoundingBox::empty(), |acc, item| acc.union(&item.envelope()))
}

/// Area shared by the bounding boxes of two groups.
pub fn group_overlap<T: Bounded>(group_a: &[T], group_b: &[T]) -> f64 {
    bounding_box_of(group_a)
        .intersection(&bounding_box_of(group_b))
        .area()
}

pub fn total_area_of_two_regions<T: Bounded>(group_a: &[T], group_b: &[T]) -> f64 {
    bounding_box_of(group_a).area() + bounding_box_of(group_b).area()
}

pub fn total_margin_of_two_regions<T: Bounded>(group_a: &[T], group_b: &[T]) -> f64 {
    bounding_box_of(group_a).margin() + bounding_box_of(group_b).margin()
}

/// Split indices `k` allowed for `n` items: each group gets at least
/// `min_degree` items and neither group is empty.
pub(crate) fn split_range(n: usize, min_degree: usize) -> std::ops::RangeInclusive<usize> {
    let low = min_degree.max(1);
    let high = n.saturating_sub(min_degree.max(1));
    low..=high
}

/// Sum of `margin(low) + margin(high)` over every allowed split of one
/// ordering.
///
/// With fewer than two items there is nothing to split and the margin of
/// the single group is returned.
pub fn sum_of_margins<T: Bounded>(ordered: &[T], min_degree: usize) -> f64 {
    if ordered.len() <= 1 {
        return bounding_box_of(ordered).margin();
    }
    split_range(ordered.len(), min_degree)
        .map(|k| total_margin_of_two_regions(&ordered[..k], &ordered[k..]))
        .sum()
}
