//! CP engine interface.

use super::model::{Constraint, Direction};
use super::variables::IntVarId;
use thiserror::Error;

/// Errors raised by a [`CpEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A handle that the engine never issued.
    #[error("unknown variable: {0}")]
    UnknownVariable(IntVarId),

    /// Declared bounds form an empty domain.
    #[error("empty domain for variable {name}: [{min}, {max}]")]
    EmptyDomain { name: String, min: i64, max: i64 },

    /// Parallel arrays of a constraint differ in length.
    #[error("{constraint}: expected {expected} entries, found {found}")]
    ArityMismatch {
        constraint: &'static str,
        expected: usize,
        found: usize,
    },

    /// A constraint that needs at least one variable got none.
    #[error("{0}: empty variable scope")]
    EmptyScope(&'static str),

    /// A value was read while the engine holds no solution.
    #[error("no current solution to read {0} from")]
    NoSolution(IntVarId),

    /// The engine refuses to search a model this large.
    #[error("search space of {size} candidates exceeds the limit of {limit}")]
    SearchSpaceTooLarge { size: u128, limit: u128 },

    /// Engine-specific failure.
    #[error("engine failure: {0}")]
    Internal(String),
}

/// State of the search owned by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// No step has run since construction or the last reset.
    NotStarted,
    /// The last step produced a solution; more may follow.
    Running,
    /// The last step reported that no further solution exists.
    Exhausted,
}

/// Contract of a constraint-solving engine.
///
/// The engine owns the variables, posted constraints and search state.
/// Calls are synchronous: [`step_solve`](CpEngine::step_solve) runs to
/// completion before returning.
///
/// Search semantics follow the usual solve-in-place protocol:
///
/// - Without an objective, successive steps enumerate every solution once.
/// - With an objective, every step after the first only accepts solutions
///   strictly better than the previous one, so the last solution returned
///   before exhaustion is optimal.
/// - [`reset_search`](CpEngine::reset_search) restarts the search and
///   forgets the incumbent. Posted constraints are kept.
///
/// This can wrap an external solver or the bundled
/// [`ExhaustiveEngine`](super::ExhaustiveEngine).
pub trait CpEngine {
    /// Declares an integer variable with domain `[lb, ub]`.
    fn int_var(&mut self, name: &str, lb: i64, ub: i64) -> Result<IntVarId, EngineError>;

    /// Declares `count` integer variables named `name[i]`.
    fn int_var_array(
        &mut self,
        name: &str,
        count: usize,
        lb: i64,
        ub: i64,
    ) -> Result<Vec<IntVarId>, EngineError> {
        (0..count)
            .map(|i| self.int_var(&format!("{name}[{i}]"), lb, ub))
            .collect()
    }

    /// Posts a constraint.
    fn post(&mut self, constraint: Constraint) -> Result<(), EngineError>;

    /// Posts a bin packing constraint. See [`Constraint::BinPacking`].
    fn post_bin_packing(
        &mut self,
        bins: &[IntVarId],
        weights: &[i64],
        loads: &[IntVarId],
        origin: i64,
    ) -> Result<(), EngineError> {
        self.post(Constraint::BinPacking {
            bins: bins.to_vec(),
            weights: weights.to_vec(),
            loads: loads.to_vec(),
            origin,
        })
    }

    /// Posts `target == min(sources)`.
    fn post_min(&mut self, target: IntVarId, sources: &[IntVarId]) -> Result<(), EngineError> {
        self.post(Constraint::Min {
            target,
            sources: sources.to_vec(),
        })
    }

    /// Posts `var == value`.
    fn post_equal(&mut self, var: IntVarId, value: i64) -> Result<(), EngineError> {
        self.post(Constraint::Equal { var, value })
    }

    /// Sets the objective, replacing any previous one.
    fn set_objective(&mut self, direction: Direction, var: IntVarId) -> Result<(), EngineError>;

    /// Removes the objective.
    fn clear_objective(&mut self);

    /// Runs the search to the next solution.
    ///
    /// Returns `true` if a new solution was found and variable values were
    /// updated, `false` if the search is exhausted.
    fn step_solve(&mut self) -> Result<bool, EngineError>;

    /// Restarts the search from the root.
    fn reset_search(&mut self);

    /// Reads the value of `var` in the current solution.
    fn value(&self, var: IntVarId) -> Result<i64, EngineError>;
}

impl<E: CpEngine + ?Sized> CpEngine for &mut E {
    fn int_var(&mut self, name: &str, lb: i64, ub: i64) -> Result<IntVarId, EngineError> {
        (**self).int_var(name, lb, ub)
    }

    fn post(&mut self, constraint: Constraint) -> Result<(), EngineError> {
        (**self).post(constraint)
    }

    fn set_objective(&mut self, direction: Direction, var: IntVarId) -> Result<(), EngineError> {
        (**self).set_objective(direction, var)
    }

    fn clear_objective(&mut self) {
        (**self).clear_objective()
    }

    fn step_solve(&mut self) -> Result<bool, EngineError> {
        (**self).step_solve()
    }

    fn reset_search(&mut self) {
        (**self).reset_search()
    }

    fn value(&self, var: IntVarId) -> Result<i64, EngineError> {
        (**self).value(var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::ArityMismatch {
            constraint: "bin_packing",
            expected: 3,
            found: 2,
        };
        assert_eq!(err.to_string(), "bin_packing: expected 3 entries, found 2");
        assert_eq!(
            EngineError::NoSolution(IntVarId(2)).to_string(),
            "no current solution to read x2 from"
        );
    }
}
