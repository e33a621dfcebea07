//! Load-balanced bin packing on a pluggable constraint programming engine.
//!
//! Formulates bin packing as a constraint model (item-to-bin assignment,
//! per-bin loads, minimum load) and drives an engine through three search
//! strategies to find the best achievable minimum load and enumerate every
//! assignment that reaches it.
//!
//! - **CP layer** ([`cp`]): the [`CpEngine`](cp::CpEngine) contract
//!   (declare, post, step-solve, reset, read) and a generate-and-test
//!   reference engine for small instances.
//! - **Bin packing** ([`binpack`]): model construction and the
//!   optimal-solution enumerator.
//!
//! # Architecture
//!
//! The crate does not implement constraint propagation or search. All
//! combinatorial work is delegated to the engine; this crate only states
//! the problem and decides when to optimize, reset and enumerate.

pub mod binpack;
pub mod cp;
pub mod error;

pub use error::{BinPackError, Result};
