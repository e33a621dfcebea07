//! Generate-and-test reference engine.

use super::engine::{CpEngine, EngineError, SearchStatus};
use super::model::{Constraint, CpModel, Direction, Objective};
use super::variables::{IntVar, IntVarId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::trace;

/// Order in which each enumerated variable's values are tried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueOrder {
    /// Smallest value first.
    #[default]
    Ascending,
    /// Random permutation per variable, drawn when the search starts.
    Shuffled,
}

/// Configuration of the [`ExhaustiveEngine`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExhaustiveConfig {
    /// Value order for enumerated variables.
    pub value_order: ValueOrder,

    /// Seed for [`ValueOrder::Shuffled`]. `None` draws a fresh seed.
    pub seed: Option<u64>,

    /// Maximum number of candidate assignments the engine agrees to scan.
    pub max_search_space: u128,
}

impl Default for ExhaustiveConfig {
    fn default() -> Self {
        Self {
            value_order: ValueOrder::Ascending,
            seed: None,
            max_search_space: 100_000_000,
        }
    }
}

impl ExhaustiveConfig {
    /// Sets the value order of enumerated variables.
    pub fn with_value_order(mut self, order: ValueOrder) -> Self {
        self.value_order = order;
        self
    }

    /// Fixes the shuffle seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the largest search space the engine accepts.
    pub fn with_max_search_space(mut self, limit: u128) -> Self {
        self.max_search_space = limit;
        self
    }
}

/// How the engine splits the model for one search.
#[derive(Debug, Clone)]
struct SearchPlan {
    /// Variables enumerated by the odometer.
    free: Vec<usize>,
    /// Value list per free variable.
    values: Vec<Vec<i64>>,
    /// Constraints that compute their outputs, in evaluation order.
    defining: Vec<usize>,
    /// Constraints checked on complete assignments.
    checking: Vec<usize>,
}

/// A generate-and-test engine for small models.
///
/// Variables that a constraint fully determines (the loads of a bin
/// packing constraint, the target of a min constraint) are computed; every
/// other variable is enumerated over its domain like an odometer. Each
/// complete candidate is then checked against the domains, the remaining
/// constraints and the objective cut.
///
/// # Limitations
///
/// - No propagation: cost grows with the product of the free domain sizes
/// - Refuses models whose search space exceeds
///   [`ExhaustiveConfig::max_search_space`]
/// - Constraints posted after the search started are only checked, never
///   used to compute values
///
/// # Examples
///
/// ```
/// use u_binpack::cp::{CpEngine, ExhaustiveEngine};
///
/// let mut engine = ExhaustiveEngine::new();
/// let x = engine.int_var("x", 0, 2).unwrap();
/// let mut seen = Vec::new();
/// while engine.step_solve().unwrap() {
///     seen.push(engine.value(x).unwrap());
/// }
/// assert_eq!(seen, vec![0, 1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct ExhaustiveEngine {
    model: CpModel,
    config: ExhaustiveConfig,
    plan: Option<SearchPlan>,
    status: SearchStatus,
    next: Option<Vec<usize>>,
    current: Option<Vec<i64>>,
    incumbent: Option<i64>,
    candidates: u64,
}

impl ExhaustiveEngine {
    /// Creates an empty engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ExhaustiveConfig::default())
    }

    pub fn with_config(config: ExhaustiveConfig) -> Self {
        Self {
            model: CpModel::new("exhaustive"),
            config,
            plan: None,
            status: SearchStatus::NotStarted,
            next: None,
            current: None,
            incumbent: None,
            candidates: 0,
        }
    }

    /// The model built so far.
    pub fn model(&self) -> &CpModel {
        &self.model
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    /// Candidate assignments evaluated since construction.
    pub fn candidates_evaluated(&self) -> u64 {
        self.candidates
    }

    fn build_plan(&self) -> Result<SearchPlan, EngineError> {
        let n = self.model.var_count();
        let mut defined = vec![false; n];
        let mut read = vec![false; n];
        let mut defining = Vec::new();
        let mut checking = Vec::new();

        for (index, constraint) in self.model.constraints.iter().enumerate() {
            let outputs = constraint.outputs();
            let inputs = constraint.inputs();
            let mut distinct = outputs.clone();
            distinct.sort_unstable();
            distinct.dedup();
            let can_define = !outputs.is_empty()
                && distinct.len() == outputs.len()
                && outputs
                    .iter()
                    .all(|v| !defined[v.0] && !read[v.0] && !inputs.contains(v));
            if can_define {
                outputs.iter().for_each(|v| defined[v.0] = true);
                inputs.iter().for_each(|v| read[v.0] = true);
                defining.push(index);
            } else {
                checking.push(index);
            }
        }

        let free: Vec<usize> = (0..n).filter(|&i| !defined[i]).collect();
        let size = free.iter().fold(1u128, |acc, &i| {
            acc.saturating_mul(self.model.int_vars[i].domain_size())
        });
        if size > self.config.max_search_space {
            return Err(EngineError::SearchSpaceTooLarge {
                size,
                limit: self.config.max_search_space,
            });
        }

        let mut rng = match self.config.value_order {
            ValueOrder::Ascending => None,
            ValueOrder::Shuffled => Some(StdRng::seed_from_u64(
                self.config.seed.unwrap_or_else(rand::random),
            )),
        };
        let values = free
            .iter()
            .map(|&i| {
                let var = &self.model.int_vars[i];
                let mut domain: Vec<i64> = (var.min..=var.max).collect();
                if let Some(rng) = rng.as_mut() {
                    domain.shuffle(rng);
                }
                domain
            })
            .collect();

        trace!(
            free = free.len(),
            defining = defining.len(),
            checking = checking.len(),
            search_space = %size,
            "search plan built"
        );

        Ok(SearchPlan {
            free,
            values,
            defining,
            checking,
        })
    }

    /// Evaluates the candidate at `cursor`; returns the full assignment if
    /// it is accepted.
    fn evaluate(&self, plan: &SearchPlan, cursor: &[usize]) -> Option<Vec<i64>> {
        let mut values = vec![0i64; self.model.var_count()];
        for (k, &var) in plan.free.iter().enumerate() {
            values[var] = plan.values[k][cursor[k]];
        }

        for &index in &plan.defining {
            let constraint = &self.model.constraints[index];
            let computed = constraint.compute(&values)?;
            for (var, value) in constraint.outputs().into_iter().zip(computed) {
                if !self.model.int_vars[var.0].contains(value) {
                    return None;
                }
                values[var.0] = value;
            }
        }

        let satisfied = plan
            .checking
            .iter()
            .all(|&index| self.model.constraints[index].is_satisfied(&values));
        if !satisfied {
            return None;
        }

        if let (Some(objective), Some(incumbent)) = (self.model.objective, self.incumbent) {
            if !objective.improves(values[objective.var.0], incumbent) {
                return None;
            }
        }
        Some(values)
    }

    fn start(&mut self) -> Result<(), EngineError> {
        let plan = self.build_plan()?;
        self.next = if plan.values.iter().all(|v| !v.is_empty()) {
            Some(vec![0; plan.free.len()])
        } else {
            None
        };
        self.plan = Some(plan);
        Ok(())
    }
}

impl Default for ExhaustiveEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Next odometer position after `cursor`, or `None` past the last one.
fn advance(cursor: &[usize], values: &[Vec<i64>]) -> Option<Vec<usize>> {
    let mut next = cursor.to_vec();
    for k in (0..next.len()).rev() {
        next[k] += 1;
        if next[k] < values[k].len() {
            return Some(next);
        }
        next[k] = 0;
    }
    None
}

impl CpEngine for ExhaustiveEngine {
    fn int_var(&mut self, name: &str, lb: i64, ub: i64) -> Result<IntVarId, EngineError> {
        if lb > ub {
            return Err(EngineError::EmptyDomain {
                name: name.to_string(),
                min: lb,
                max: ub,
            });
        }
        if self.status != SearchStatus::NotStarted {
            return Err(EngineError::Internal(format!(
                "cannot declare {name} while a search is in progress"
            )));
        }
        Ok(self.model.add_int_var(IntVar::new(name, lb, ub)))
    }

    fn post(&mut self, constraint: Constraint) -> Result<(), EngineError> {
        self.model.add_constraint(constraint)?;
        if let Some(plan) = self.plan.as_mut() {
            plan.checking.push(self.model.constraint_count() - 1);
        }
        Ok(())
    }

    fn set_objective(&mut self, direction: Direction, var: IntVarId) -> Result<(), EngineError> {
        self.model.set_objective(Objective { direction, var })?;
        self.incumbent = None;
        Ok(())
    }

    fn clear_objective(&mut self) {
        self.model.clear_objective();
        self.incumbent = None;
    }

    fn step_solve(&mut self) -> Result<bool, EngineError> {
        if self.status == SearchStatus::Exhausted {
            return Ok(false);
        }
        if self.plan.is_none() {
            self.start()?;
        }
        let Some(plan) = self.plan.take() else {
            return Err(EngineError::Internal("search plan missing".into()));
        };

        let mut found = None;
        while let Some(cursor) = self.next.take() {
            self.next = advance(&cursor, &plan.values);
            self.candidates += 1;
            if let Some(values) = self.evaluate(&plan, &cursor) {
                found = Some(values);
                break;
            }
        }
        self.plan = Some(plan);

        match found {
            Some(values) => {
                if let Some(objective) = self.model.objective {
                    self.incumbent = Some(values[objective.var.0]);
                }
                self.current = Some(values);
                self.status = SearchStatus::Running;
                Ok(true)
            }
            None => {
                self.current = None;
                self.status = SearchStatus::Exhausted;
                Ok(false)
            }
        }
    }

    fn reset_search(&mut self) {
        self.plan = None;
        self.next = None;
        self.current = None;
        self.incumbent = None;
        self.status = SearchStatus::NotStarted;
    }

    fn value(&self, var: IntVarId) -> Result<i64, EngineError> {
        self.model.var(var)?;
        self.current
            .as_ref()
            .map(|values| values[var.0])
            .ok_or(EngineError::NoSolution(var))
    }
}
