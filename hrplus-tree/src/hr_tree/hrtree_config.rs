//! Fan-out configuration for the HR+Tree.

use super::hrtree_constants::{DEFAULT_MAX_DEGREE, DEFAULT_MIN_DEGREE, MIN_ALLOWED_MAX_DEGREE};
use super::hrtree_types::{HRTreeError, HRTreeResult};
use serde::{Deserialize, Serialize};

/// Container fan-out bounds.
///
/// A container holding more than `max_degree` entries is split. Each half of
/// a split receives at least `min_degree` entries.
///
/// # Examples
///
/// ```rust
/// use hrplus_tree::HRTreeConfig;
///
/// let config = HRTreeConfig::default()
///     .with_max_degree(8)
///     .with_min_degree(3);
/// assert!(config.validate().is_ok());
///
/// let bad = HRTreeConfig::default().with_max_degree(4).with_min_degree(3);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HRTreeConfig {
    max_degree: usize,
    min_degree: usize,
}

impl Default for HRTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HRTreeConfig {
    /// Creates a configuration with the default fan-out (3 / 1).
    pub fn new() -> Self {
        HRTreeConfig {
            max_degree: DEFAULT_MAX_DEGREE,
            min_degree: DEFAULT_MIN_DEGREE,
        }
    }

    pub fn with_max_degree(mut self, max_degree: usize) -> Self {
        self.max_degree = max_degree;
        self
    }

    pub fn with_min_degree(mut self, min_degree: usize) -> Self {
        self.min_degree = min_degree;
        self
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// Checks that a split of an overflowed container can always honour
    /// both bounds.
    ///
    /// # Errors
    ///
    /// Returns [`HRTreeError::InvalidConfig`] if `min_degree` is zero,
    /// `max_degree` is below 2, or `2 * min_degree > max_degree + 1`.
    pub fn validate(&self) -> HRTreeResult<()> {
        if self.min_degree == 0 {
            log::error!("min_degree must be at least 1");
            return Err(HRTreeError::InvalidConfig(
                "min_degree must be at least 1".to_string(),
            ));
        }
        if self.max_degree < MIN_ALLOWED_MAX_DEGREE {
            log::error!("max_degree {} is too small", self.max_degree);
            return Err(HRTreeError::InvalidConfig(format!(
                "max_degree must be at least {}, got {}",
                MIN_ALLOWED_MAX_DEGREE, self.max_degree
            )));
        }
        if 2 * self.min_degree > self.max_degree + 1 {
            log::error!(
                "min_degree {} too large for max_degree {}",
                self.min_degree,
                self.max_degree
            );
            return Err(HRTreeError::InvalidConfig(format!(
                "2 * min_degree ({}) must not exceed max_degree + 1 ({})",
                2 * self.min_degree,
                self.max_degree + 1
            )));
        }
        Ok(())
    }
}
