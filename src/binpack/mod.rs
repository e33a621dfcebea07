//! Load-balanced bin packing.
//!
//! Puts items into bins so that the lightest bin is as heavy as possible,
//! and enumerates every assignment that reaches this optimum.
//!
//! # Components
//!
//! - [`BinPackingModel`]: declares assignment, load and minimum-load
//!   variables on a [`CpEngine`](crate::cp::CpEngine) and posts the bin
//!   packing and min constraints.
//! - [`Enumerator`]: drives the engine through a [`SearchMode`]:
//!   - [`SearchMode::FixedTarget`]: pin the minimum load to a known value
//!     and enumerate every solution.
//!   - [`SearchMode::Maximize`]: a single optimization pass; finds one
//!     optimum.
//!   - [`SearchMode::OptimizeThenEnumerate`]: find and prove the optimum,
//!     restart, then enumerate every optimal solution.
//!
//! # Example
//!
//! ```
//! use u_binpack::binpack::{solve, BinPackingConfig, SearchMode};
//! use u_binpack::cp::ExhaustiveEngine;
//!
//! let config = BinPackingConfig::new(vec![4, 3, 3, 2], 2);
//! let result = solve(ExhaustiveEngine::new(), &config, &SearchMode::OptimizeThenEnumerate).unwrap();
//! assert_eq!(result.optimum, Some(6));
//! assert!(result.solutions.iter().all(|s| s.min_load == 6));
//! ```

mod config;
mod model;
mod runner;
mod types;

pub use config::{
    BinPackingConfig, EnumeratorConfig, ModelReuse, DEFAULT_MAX_LOAD, SAMPLE_BINS, SAMPLE_WEIGHTS,
};
pub use model::BinPackingModel;
pub use runner::{
    solve, Enumerator, FixedTargetEnumeration, OptimizeThenEnumerate, SearchStrategy,
    SinglePassMaximize,
};
pub use types::{EnumerationResult, ModeKind, SearchMode, SearchState, SolutionRecord};
