//! Problem and enumerator configuration.

use crate::error::{BinPackError, Result};

/// Item weights of the sample instance.
pub const SAMPLE_WEIGHTS: [i64; 12] = [2, 5, 3, 4, 12, 9, 1, 0, 5, 6, 2, 4];

/// Bin count of the sample instance.
pub const SAMPLE_BINS: usize = 3;

/// Default upper bound on a bin's load.
pub const DEFAULT_MAX_LOAD: i64 = 1000;

/// Input of a load-balanced bin packing problem.
///
/// The default is the sample instance: twelve items in three bins, loads
/// bounded by 1000.
///
/// # Examples
///
/// ```
/// use u_binpack::binpack::BinPackingConfig;
///
/// let config = BinPackingConfig::default()
///     .with_weights(vec![4, 3, 3, 2])
///     .with_bins(2)
///     .with_max_load(10);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.total_weight(), 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinPackingConfig {
    /// Weight of each item.
    pub weights: Vec<i64>,

    /// Number of bins.
    pub bins: usize,

    /// Upper bound of every bin load and of the minimum load.
    pub max_load: i64,
}

impl Default for BinPackingConfig {
    fn default() -> Self {
        Self {
            weights: SAMPLE_WEIGHTS.to_vec(),
            bins: SAMPLE_BINS,
            max_load: DEFAULT_MAX_LOAD,
        }
    }
}

impl BinPackingConfig {
    /// Creates a problem with the default load bound.
    pub fn new(weights: Vec<i64>, bins: usize) -> Self {
        Self {
            weights,
            bins,
            max_load: DEFAULT_MAX_LOAD,
        }
    }

    /// Replaces the item weights.
    pub fn with_weights(mut self, weights: Vec<i64>) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the number of bins.
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Sets the upper bound of every bin load.
    pub fn with_max_load(mut self, max_load: i64) -> Self {
        self.max_load = max_load;
        self
    }

    /// Sum of all item weights.
    pub fn total_weight(&self) -> i64 {
        self.weights.iter().sum()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.bins == 0 {
            return Err(BinPackError::InvalidBinCount(self.bins));
        }
        if let Some((index, &weight)) = self.weights.iter().enumerate().find(|&(_, &w)| w < 0) {
            return Err(BinPackError::NegativeWeight { index, weight });
        }
        if self.max_load < 0 {
            return Err(BinPackError::InvalidLoadBound(self.max_load));
        }
        Ok(())
    }
}

/// How the enumerator treats engine state left by earlier runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModelReuse {
    /// Reset the search and clear any objective before running. A model
    /// already pinned by an earlier run is rejected with
    /// [`BinPackError::ModelPinned`](crate::BinPackError::ModelPinned),
    /// since the pin cannot be removed from the engine.
    #[default]
    ResetSearch,
    /// Run on the engine exactly as the previous run left it.
    Continue,
}

/// Configuration of the [`Enumerator`](super::Enumerator).
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumeratorConfig {
    /// Engine state policy at the start of a run.
    pub reuse: ModelReuse,

    /// Maximum number of optimal solutions to record. 0 = no limit.
    ///
    /// When the cap is reached the enumeration stops early and the result
    /// is marked truncated.
    pub max_solutions: usize,
}

impl EnumeratorConfig {
    /// Sets the engine state policy.
    pub fn with_reuse(mut self, reuse: ModelReuse) -> Self {
        self.reuse = reuse;
        self
    }

    /// Caps the number of recorded solutions. 0 = no limit.
    pub fn with_max_solutions(mut self, n: usize) -> Self {
        self.max_solutions = n;
        self
    }
}
