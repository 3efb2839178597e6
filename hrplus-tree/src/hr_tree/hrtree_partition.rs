//! R*-tree split selection.
//!
//! [`Partition`] evaluates every allowed split point of one ordering and keeps
//! the best. [`choose_split`] runs the full heuristic: pick the axis with the
//! smaller total margin, then the ordering and split point with the least
//! overlap between the two halves.

use super::hrtree_types::{HRTreeError, HRTreeResult};
use super::hrtree_utils::{
    bounding_box_of, group_overlap, max_x_sort, max_y_sort, min_x_sort, min_y_sort,
    split_range, sum_of_margins, total_area_of_two_regions, total_margin_of_two_regions, Bounded,
};
use std::fmt;

/// Best split of one ordered group of items.
///
/// Split points are tried from the smallest upwards. A later point replaces
/// the current best only if it has strictly less overlap, or equal overlap
/// and strictly less area.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<T> {
    area: f64,
    margin: f64,
    overlap: f64,
    split_point: usize,
    group_low: Vec<T>,
    group_high: Vec<T>,
}

impl<T: Bounded + Clone> Partition<T> {
    /// Evaluates all split points of `sorted`.
    ///
    /// # Errors
    ///
    /// Returns [`HRTreeError::InvalidArgument`] when `sorted` has fewer than
    /// 2 or more than `max_degree + 1` items, or when no split point leaves
    /// `min_degree` items on both sides.
    pub fn new(sorted: &[T], min_degree: usize, max_degree: usize) -> HRTreeResult<Self> {
        let n = sorted.len();
        if n < 2 || n > max_degree + 1 {
            log::error!("Cannot partition {} entries with max_degree {}", n, max_degree);
            return Err(HRTreeError::InvalidArgument(format!(
                "partition needs between 2 and {} entries, got {}",
                max_degree + 1,
                n
            )));
        }

        let mut best: Option<(usize, f64, f64)> = None;
        for k in split_range(n, min_degree) {
            let (low, high) = sorted.split_at(k);
            let overlap = group_overlap(low, high);
            let area = total_area_of_two_regions(low, high);
            let better = match best {
                None => true,
                Some((_, best_overlap, best_area)) => {
                    overlap < best_overlap || (overlap == best_overlap && area < best_area)
                }
            };
            if better {
                best = Some((k, overlap, area));
            }
        }

        let Some((k, overlap, area)) = best else {
            log::error!("No split of {} entries satisfies min_degree {}", n, min_degree);
            return Err(HRTreeError::InvalidArgument(format!(
                "no split of {} entries leaves {} on each side",
                n, min_degree
            )));
        };

        let (low, high) = sorted.split_at(k);
        Ok(Partition {
            area,
            margin: total_margin_of_two_regions(low, high),
            overlap,
            split_point: k,
            group_low: low.to_vec(),
            group_high: high.to_vec(),
        })
    }
}

impl<T> Partition<T> {
    /// Sum of the areas of both halves.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Sum of the margins of both halves.
    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Area shared by the bounding boxes of both halves.
    pub fn overlap(&self) -> f64 {
        self.overlap
    }

    /// Number of items in the low half.
    pub fn split_point(&self) -> usize {
        self.split_point
    }

    pub fn group_low(&self) -> &[T] {
        &self.group_low
    }

    pub fn group_high(&self) -> &[T] {
        &self.group_high
    }

    pub fn into_groups(self) -> (Vec<T>, Vec<T>) {
        (self.group_low, self.group_high)
    }

    /// Ordering key: overlap, then area, then split point.
    fn beats(&self, other: &Partition<T>) -> bool {
        if self.overlap != other.overlap {
            return self.overlap < other.overlap;
        }
        if self.area != other.area {
            return self.area < other.area;
        }
        self.split_point < other.split_point
    }
}

/// Axis a split runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAxis {
    X,
    Y,
}

/// Edge used to order items along the split axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitEdge {
    Min,
    Max,
}

impl fmt::Display for SplitAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitAxis::X => write!(f, "x"),
            SplitAxis::Y => write!(f, "y"),
        }
    }
}

impl fmt::Display for SplitEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitEdge::Min => write!(f, "min"),
            SplitEdge::Max => write!(f, "max"),
        }
    }
}

/// Outcome of [`choose_split`]: where to cut and the resulting halves.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPlan<T> {
    pub axis: SplitAxis,
    pub edge: SplitEdge,
    pub partition: Partition<T>,
}

/// Picks between the min-edge and max-edge partitions of one axis.
///
/// Lower overlap wins, then lower area, then the smaller split point. A
/// full tie goes to the min-edge ordering.
fn pick_partition<T: Bounded + Clone>(
    min_sorted: &[T],
    max_sorted: &[T],
    min_degree: usize,
    max_degree: usize,
) -> HRTreeResult<(SplitEdge, Partition<T>)> {
    let by_min = Partition::new(min_sorted, min_degree, max_degree)?;
    let by_max = Partition::new(max_sorted, min_degree, max_degree)?;
    if by_max.beats(&by_min) {
        Ok((SplitEdge::Max, by_max))
    } else {
        Ok((SplitEdge::Min, by_min))
    }
}

/// Returns the low group of the better of the two orderings.
///
/// # Errors
///
/// Fails with the same preconditions as [`Partition::new`].
pub fn partition_by_min_overlap<T: Bounded + Clone>(
    min_sorted: &[T],
    max_sorted: &[T],
    min_degree: usize,
    max_degree: usize,
) -> HRTreeResult<Vec<T>> {
    let (_, partition) = pick_partition(min_sorted, max_sorted, min_degree, max_degree)?;
    Ok(partition.into_groups().0)
}

/// Runs the R* ChooseSplitAxis / ChooseSplitIndex heuristic on `items`.
///
/// The axis whose two orderings have the smaller total margin wins, X on a
/// tie. Within that axis the partition with the least overlap is chosen.
///
/// # Errors
///
/// Returns [`HRTreeError::InvalidArgument`] when `items` has fewer than 2 or
/// more than `max_degree + 1` entries.
pub fn choose_split<T: Bounded + Clone>(
    items: &[T],
    min_degree: usize,
    max_degree: usize,
) -> HRTreeResult<SplitPlan<T>> {
    let n = items.len();
    if n < 2 || n > max_degree + 1 {
        log::error!("Cannot split {} entries with max_degree {}", n, max_degree);
        return Err(HRTreeError::InvalidArgument(format!(
            "split needs between 2 and {} entries, got {}",
            max_degree + 1,
            n
        )));
    }

    let min_x = min_x_sort(items);
    let max_x = max_x_sort(items);
    let min_y = min_y_sort(items);
    let max_y = max_y_sort(items);

    let margin_x = sum_of_margins(&min_x, min_degree) + sum_of_margins(&max_x, min_degree);
    let margin_y = sum_of_margins(&min_y, min_degree) + sum_of_margins(&max_y, min_degree);

    let (axis, (edge, partition)) = if margin_y < margin_x {
        (SplitAxis::Y, pick_partition(&min_y, &max_y, min_degree, max_degree)?)
    } else {
        (SplitAxis::X, pick_partition(&min_x, &max_x, min_degree, max_degree)?)
    };

    log::trace!(
        "split {} entries on {}-axis by {} edge at {} (overlap {}, area {}, bbox {})",
        n,
        axis,
        edge,
        partition.split_point(),
        partition.overlap(),
        partition.area(),
        bounding_box_of(items)
    );

    Ok(SplitPlan {
        axis,
        edge,
        partition,
    })
}
