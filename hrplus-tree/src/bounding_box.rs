use std::hash::Hash;

/// An axis-aligned 2D rectangle, or the distinguished empty box.
///
/// The empty box covers nothing. It is the identity for [`BoundingBox::union`]
/// and intersecting anything with it yields the empty box again. Internally it
/// is stored with `min = +inf` and `max = -inf`, so unions with it need no
/// special casing.
///
/// A non-empty box always satisfies `min_x <= max_x` and `min_y <= max_y`:
/// [`BoundingBox::new`] swaps reversed corners.
///
/// # Examples
///
/// ```rust
/// use hrplus_tree::BoundingBox;
///
/// let a = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
/// let b = BoundingBox::new(1.0, 1.0, 3.0, 3.0);
///
/// assert_eq!(a.intersection(&b), BoundingBox::new(1.0, 1.0, 2.0, 2.0));
/// assert_eq!(a.union(&b).area(), 9.0);
/// assert!(a.intersection(&BoundingBox::empty()).is_empty());
/// ```
#[derive(Clone, Copy, PartialEq, Debug, serde::Deserialize, serde::Serialize)]
pub struct BoundingBox {
    /// Minimum X coordinate
    pub min_x: f64,
    /// Minimum Y coordinate
    pub min_y: f64,
    /// Maximum X coordinate
    pub max_x: f64,
    /// Maximum Y coordinate
    pub max_y: f64,
}

impl Eq for BoundingBox {}

impl Hash for BoundingBox {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.min_x.to_bits().hash(state);
        self.min_y.to_bits().hash(state);
        self.max_x.to_bits().hash(state);
        self.max_y.to_bits().hash(state);
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "BoundingBox(EMPTY)")
        } else {
            write!(f, "BoundingBox({}, {}, {}, {})", self.min_x, self.min_y, self.max_x, self.max_y)
        }
    }
}

impl BoundingBox {
    /// Creates a new bounding box from two corners.
    ///
    /// Corners given in reverse order on either axis are swapped, so
    /// `new(2.0, 2.0, 0.0, 0.0)` equals `new(0.0, 0.0, 2.0, 2.0)`.
    /// A NaN coordinate is kept as given so [`is_finite`](Self::is_finite)
    /// still reports it.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundingBox {
        let (min_x, max_x) = if min_x > max_x { (max_x, min_x) } else { (min_x, max_x) };
        let (min_y, max_y) = if min_y > max_y { (max_y, min_y) } else { (min_y, max_y) };
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates a degenerate box covering a single point.
    pub fn point(x: f64, y: f64) -> BoundingBox {
        BoundingBox::new(x, y, x, y)
    }

    /// Returns the empty box.
    pub const fn empty() -> BoundingBox {
        BoundingBox {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Returns true if this box covers nothing.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Returns true if the box is empty or all four coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.is_empty()
            || (self.min_x.is_finite()
                && self.min_y.is_finite()
                && self.max_x.is_finite()
                && self.max_y.is_finite())
    }

    /// Returns the width of the bounding box, 0 when empty.
    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    /// Returns the height of the bounding box, 0 when empty.
    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    /// Returns the area of the bounding box.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Returns the perimeter, `2 * (width + height)`.
    pub fn margin(&self) -> f64 {
        2.0 * (self.width() + self.height())
    }

    /// Returns the center point, or `None` for the empty box.
    pub fn center(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        Some(((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0))
    }

    /// Checks if this bounding box contains a point.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Checks if this bounding box fully contains another one.
    /// Nothing contains, or is contained by, the empty box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Checks if the two boxes share at least one point. Touching edges count.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Returns the smallest box covering both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grows this box in place to also cover `other`.
    pub fn expand_to_include(&mut self, other: &BoundingBox) {
        *self = self.union(other);
    }

    /// Returns the overlapping rectangle, or the empty box when disjoint.
    /// Boxes that only touch produce a degenerate, zero-area box.
    pub fn intersection(&self, other: &BoundingBox) -> BoundingBox {
        if !self.intersects(other) {
            return BoundingBox::empty();
        }
        BoundingBox {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        }
    }

    /// Area growth needed for this box to also cover `other`.
    pub fn enlargement(&self, other: &BoundingBox) -> f64 {
        self.union(other).area() - self.area()
    }

    /// Checks if this bounding box is a point (zero extent on both axes).
    pub fn is_point(&self) -> bool {
        !self.is_empty() && self.min_x == self.max_x && self.min_y == self.max_y
    }
}
