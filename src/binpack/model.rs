//! Bin packing model built on a CP engine.

use super::config::BinPackingConfig;
use super::types::SolutionRecord;
use crate::cp::{CpEngine, IntVarId};
use crate::error::{BinPackError, Result};
use tracing::debug;

/// Load-balanced bin packing formulated over a [`CpEngine`].
///
/// Declares one assignment variable per item with domain
/// `[0, bins - 1]`, one load variable per bin and a minimum-load variable,
/// both with domain `[0, max_load]`, then posts:
///
/// - `bin_packing(assignment, weights, loads, 0)`
/// - `min_load == min(loads)`
///
/// The model owns its engine exclusively. Pinning the minimum load posts
/// a constraint the engine cannot retract, so the model remembers the pin.
///
/// # Examples
///
/// ```
/// use u_binpack::binpack::{BinPackingConfig, BinPackingModel};
/// use u_binpack::cp::ExhaustiveEngine;
///
/// let config = BinPackingConfig::new(vec![3, 4, 5], 2);
/// let model = BinPackingModel::build(ExhaustiveEngine::new(), &config).unwrap();
/// assert_eq!(model.assignment().len(), 3);
/// assert_eq!(model.loads().len(), 2);
/// ```
#[derive(Debug)]
pub struct BinPackingModel<E> {
    engine: E,
    weights: Vec<i64>,
    assignment: Vec<IntVarId>,
    loads: Vec<IntVarId>,
    min_load: IntVarId,
    pinned: Option<i64>,
}

impl<E: CpEngine> BinPackingModel<E> {
    /// Validates `config` and builds the model.
    ///
    /// The engine is not touched when validation fails.
    pub fn build(mut engine: E, config: &BinPackingConfig) -> Result<Self> {
        config.validate()?;
        let last_bin = i64::try_from(config.bins - 1)
            .map_err(|_| BinPackError::InvalidBinCount(config.bins))?;

        let assignment = engine.int_var_array("bin", config.weights.len(), 0, last_bin)?;
        let loads = engine.int_var_array("load", config.bins, 0, config.max_load)?;
        let min_load = engine.int_var("min_load", 0, config.max_load)?;

        engine.post_bin_packing(&assignment, &config.weights, &loads, 0)?;
        engine.post_min(min_load, &loads)?;

        debug!(
            event = "model_built",
            items = config.weights.len(),
            bins = config.bins,
            max_load = config.max_load,
        );

        Ok(Self {
            engine,
            weights: config.weights.clone(),
            assignment,
            loads,
            min_load,
            pinned: None,
        })
    }

    /// Snapshot of the engine's current solution.
    pub fn record(&self) -> Result<SolutionRecord> {
        let read = |vars: &[IntVarId]| {
            vars.iter()
                .map(|&v| self.engine.value(v))
                .collect::<std::result::Result<Vec<_>, _>>()
        };
        Ok(SolutionRecord {
            bins: read(&self.assignment)?,
            loads: read(&self.loads)?,
            min_load: self.engine.value(self.min_load)?,
        })
    }

    /// Current value of the minimum-load variable.
    pub fn min_load_value(&self) -> Result<i64> {
        Ok(self.engine.value(self.min_load)?)
    }

    /// Posts `min_load == value` and remembers it.
    pub(crate) fn pin(&mut self, value: i64) -> Result<()> {
        self.engine.post_equal(self.min_load, value)?;
        self.pinned = Some(value);
        debug!(event = "min_load_pinned", value);
        Ok(())
    }
}

impl<E> BinPackingModel<E> {
    pub fn weights(&self) -> &[i64] {
        &self.weights
    }

    /// Item-to-bin assignment variables.
    pub fn assignment(&self) -> &[IntVarId] {
        &self.assignment
    }

    /// Bin load variables.
    pub fn loads(&self) -> &[IntVarId] {
        &self.loads
    }

    pub fn min_load(&self) -> IntVarId {
        self.min_load
    }

    /// Value the minimum load was last pinned to, if any.
    pub fn pinned(&self) -> Option<i64> {
        self.pinned
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}
