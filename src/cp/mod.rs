//! Constraint Programming (CP) engine layer.
//!
//! Defines the contract the bin packing orchestration needs from a
//! constraint-solving engine, plus a small reference engine.
//!
//! # Key Components
//!
//! - **Variables**: [`IntVar`] declarations addressed by [`IntVarId`] handles
//! - **Constraints**: [`Constraint`] — BinPacking, Min, Equal
//! - **Model**: [`CpModel`] — container for variables, constraints, objective
//! - **Engine**: [`CpEngine`] trait — declare, post, step-solve, reset, read
//! - **Reference engine**: [`ExhaustiveEngine`] — generate-and-test
//!
//! # Design
//!
//! This module does NOT include a constraint propagation engine. The
//! [`CpEngine`] trait allows plugging in external solvers; the bundled
//! [`ExhaustiveEngine`] only scans candidate assignments and is meant for
//! small instances and tests.
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod engine;
mod exhaustive;
mod model;
mod variables;

pub use engine::{CpEngine, EngineError, SearchStatus};
pub use exhaustive::{ExhaustiveConfig, ExhaustiveEngine, ValueOrder};
pub use model::{Constraint, CpModel, Direction, Objective};
pub use variables::{IntVar, IntVarId};
