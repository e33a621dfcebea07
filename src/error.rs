//! Error types for u-binpack.

use crate::cp::EngineError;
use thiserror::Error;

/// Errors from building or solving a bin packing problem.
///
/// Configuration errors are raised before any engine call. Engine errors are
/// passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BinPackError {
    /// The bin count is zero.
    #[error("bin count must be positive, got {0}")]
    InvalidBinCount(usize),

    /// An item weight is negative.
    #[error("weight of item {index} is negative: {weight}")]
    NegativeWeight { index: usize, weight: i64 },

    /// The bin load upper bound is negative.
    #[error("load bound must be non-negative, got {0}")]
    InvalidLoadBound(i64),

    /// The mode selector names no known search mode.
    #[error("unsupported search mode: {0}")]
    UnsupportedMode(String),

    /// Fixed-target enumeration was requested without a target.
    #[error("fixed-target enumeration requires a target minimum load")]
    MissingTarget,

    /// A reset run was requested on a model whose minimum load is already
    /// pinned by an earlier run.
    #[error("model already pins the minimum load to {0}; build a fresh model")]
    ModelPinned(i64),

    /// Failure inside the constraint engine.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl BinPackError {
    /// Whether this error was raised before the engine was involved.
    pub fn is_config(&self) -> bool {
        !matches!(self, BinPackError::Engine(_))
    }
}

/// Result type alias for u-binpack operations.
pub type Result<T> = std::result::Result<T, BinPackError>;
