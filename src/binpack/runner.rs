//! Optimal-solution enumeration.

use super::config::{BinPackingConfig, EnumeratorConfig, ModelReuse};
use super::model::BinPackingModel;
use super::types::{EnumerationResult, SearchMode, SearchState};
use crate::cp::{CpEngine, Direction};
use crate::error::{BinPackError, Result};
use tracing::{debug, info};

/// One way of driving the engine to (optimal) solutions.
pub trait SearchStrategy {
    /// Runs the strategy on `model` and collects the solutions.
    fn run<E: CpEngine>(
        &self,
        model: &mut BinPackingModel<E>,
        config: &EnumeratorConfig,
    ) -> Result<EnumerationResult>;
}

/// Pins the minimum load to a known target, then enumerates every
/// solution satisfying the pin.
#[derive(Debug, Clone, Copy)]
pub struct FixedTargetEnumeration {
    pub target: i64,
}

/// Maximizes the minimum load in a single pass.
///
/// Each step only accepts strictly improving solutions, so only the last
/// one is guaranteed optimal. Does not enumerate all optima.
#[derive(Debug, Clone, Copy)]
pub struct SinglePassMaximize;

/// Finds and proves the optimum, then restarts the search pinned to it and
/// enumerates every optimal solution.
#[derive(Debug, Clone, Copy)]
pub struct OptimizeThenEnumerate;

/// Step-solves until exhaustion, recording each solution into
/// `result.solutions`. Honors the solution cap.
fn enumerate_all<E: CpEngine>(
    model: &mut BinPackingModel<E>,
    config: &EnumeratorConfig,
    result: &mut EnumerationResult,
) -> Result<()> {
    while model.engine_mut().step_solve()? {
        let record = model.record()?;
        debug!(event = "solution", min_load = record.min_load, loads = ?record.loads);
        result.solutions.push(record);
        if config.max_solutions > 0 && result.solutions.len() >= config.max_solutions {
            result.truncated = true;
            break;
        }
    }
    Ok(())
}

/// Maximizes the minimum load, recording each improving solution into
/// `result.improvements`. Returns the best value, `None` if the problem is
/// infeasible.
fn maximize<E: CpEngine>(
    model: &mut BinPackingModel<E>,
    result: &mut EnumerationResult,
) -> Result<Option<i64>> {
    let min_load = model.min_load();
    model
        .engine_mut()
        .set_objective(Direction::Maximize, min_load)?;

    let mut best = None;
    while model.engine_mut().step_solve()? {
        let record = model.record()?;
        info!(event = "better_solution", min_load = record.min_load);
        best = Some(record.min_load);
        result.improvements.push(record);
    }
    Ok(best)
}

impl SearchStrategy for FixedTargetEnumeration {
    fn run<E: CpEngine>(
        &self,
        model: &mut BinPackingModel<E>,
        config: &EnumeratorConfig,
    ) -> Result<EnumerationResult> {
        let mut result = EnumerationResult::new(SearchMode::FixedTarget {
            target: self.target,
        });
        model.pin(self.target)?;
        result.target = Some(self.target);

        enumerate_all(model, config, &mut result)?;
        info!(event = "optima_counted", target = self.target, count = result.count());
        Ok(result)
    }
}

impl SearchStrategy for SinglePassMaximize {
    fn run<E: CpEngine>(
        &self,
        model: &mut BinPackingModel<E>,
        _config: &EnumeratorConfig,
    ) -> Result<EnumerationResult> {
        let mut result = EnumerationResult::new(SearchMode::Maximize);
        let optimum = maximize(model, &mut result)?;
        result.optimum = optimum;
        if let Some(last) = result.improvements.last() {
            result.solutions.push(last.clone());
        }
        Ok(result)
    }
}

impl SearchStrategy for OptimizeThenEnumerate {
    fn run<E: CpEngine>(
        &self,
        model: &mut BinPackingModel<E>,
        config: &EnumeratorConfig,
    ) -> Result<EnumerationResult> {
        let mut result = EnumerationResult::new(SearchMode::OptimizeThenEnumerate);
        let mut state = SearchState::SearchingOptimum;
        let mut optimum = None;

        loop {
            result.states.push(state);
            debug!(event = "state", state = ?state);
            state = match state {
                SearchState::SearchingOptimum => {
                    optimum = maximize(model, &mut result)?;
                    match optimum {
                        Some(_) => SearchState::OptimumFound,
                        None => SearchState::Exhausted,
                    }
                }
                SearchState::OptimumFound => {
                    result.optimum = optimum;
                    info!(event = "optimum_found", optimum = ?optimum);
                    SearchState::Reset
                }
                SearchState::Reset => {
                    let engine = model.engine_mut();
                    engine.reset_search();
                    engine.clear_objective();
                    if let Some(opt) = optimum {
                        model.pin(opt)?;
                        result.target = Some(opt);
                    }
                    SearchState::Enumerating
                }
                SearchState::Enumerating => {
                    enumerate_all(model, config, &mut result)?;
                    info!(event = "optima_counted", count = result.count());
                    SearchState::Done
                }
                SearchState::Exhausted => {
                    info!(event = "no_solution");
                    SearchState::Done
                }
                SearchState::Done => break,
            };
        }
        Ok(result)
    }
}

/// Drives a [`BinPackingModel`] through a [`SearchMode`].
///
/// # Examples
///
/// ```
/// use u_binpack::binpack::{BinPackingConfig, BinPackingModel, Enumerator, SearchMode};
/// use u_binpack::cp::ExhaustiveEngine;
///
/// let config = BinPackingConfig::new(vec![3, 4, 5], 2);
/// let mut model = BinPackingModel::build(ExhaustiveEngine::new(), &config).unwrap();
/// let result = Enumerator::default()
///     .run(&SearchMode::OptimizeThenEnumerate, &mut model)
///     .unwrap();
/// assert_eq!(result.optimum, Some(5));
/// assert_eq!(result.count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Enumerator {
    config: EnumeratorConfig,
}

impl Enumerator {
    /// Creates an enumerator with the given configuration.
    pub fn new(config: EnumeratorConfig) -> Self {
        Self { config }
    }

    /// Runs `mode` on `model`.
    ///
    /// Under [`ModelReuse::ResetSearch`] a model pinned by an earlier run
    /// is rejected before the engine is touched.
    pub fn run<E: CpEngine>(
        &self,
        mode: &SearchMode,
        model: &mut BinPackingModel<E>,
    ) -> Result<EnumerationResult> {
        if self.config.reuse == ModelReuse::ResetSearch {
            if let Some(value) = model.pinned() {
                return Err(BinPackError::ModelPinned(value));
            }
            let engine = model.engine_mut();
            engine.reset_search();
            engine.clear_objective();
        }

        info!(event = "run_start", mode = %mode, reuse = ?self.config.reuse);
        let result = match *mode {
            SearchMode::FixedTarget { target } => {
                FixedTargetEnumeration { target }.run(model, &self.config)
            }
            SearchMode::Maximize => SinglePassMaximize.run(model, &self.config),
            SearchMode::OptimizeThenEnumerate => OptimizeThenEnumerate.run(model, &self.config),
        }?;
        info!(
            event = "run_end",
            mode = %mode,
            solutions = result.count(),
            optimum = ?result.optimum,
            truncated = result.truncated,
        );
        Ok(result)
    }
}

/// Builds a fresh model on `engine` and runs `mode` on it.
///
/// Configuration errors are reported before the engine is touched.
pub fn solve<E: CpEngine>(
    engine: E,
    config: &BinPackingConfig,
    mode: &SearchMode,
) -> Result<EnumerationResult> {
    let mut model = BinPackingModel::build(engine, config)?;
    Enumerator::default().run(mode, &mut model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{Constraint, EngineError, ExhaustiveEngine, IntVarId, Objective};
    use std::collections::{BTreeSet, VecDeque};

    type EngineResult<T> = std::result::Result<T, EngineError>;

    // ---- Scripted engine: replays canned solutions and logs every call ----

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Declare,
        Post(Constraint),
        SetObjective(Direction),
        ClearObjective,
        Step,
        Reset,
    }

    #[derive(Debug, Default)]
    struct ScriptedEngine {
        vars: usize,
        script: VecDeque<Option<Vec<i64>>>,
        current: Option<Vec<i64>>,
        objective: Option<Objective>,
        calls: Vec<Call>,
    }

    impl ScriptedEngine {
        fn new(script: Vec<Option<Vec<i64>>>) -> Self {
            Self {
                script: script.into(),
                ..Self::default()
            }
        }

        fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls.iter().filter(|c| pred(c)).count()
        }
    }

    impl CpEngine for ScriptedEngine {
        fn int_var(&mut self, _name: &str, _lb: i64, _ub: i64) -> EngineResult<IntVarId> {
            self.calls.push(Call::Declare);
            self.vars += 1;
            Ok(IntVarId(self.vars - 1))
        }

        fn post(&mut self, constraint: Constraint) -> EngineResult<()> {
            self.calls.push(Call::Post(constraint));
            Ok(())
        }

        fn set_objective(&mut self, direction: Direction, var: IntVarId) -> EngineResult<()> {
            self.calls.push(Call::SetObjective(direction));
            self.objective = Some(Objective { direction, var });
            Ok(())
        }

        fn clear_objective(&mut self) {
            self.calls.push(Call::ClearObjective);
            self.objective = None;
        }

        fn step_solve(&mut self) -> EngineResult<bool> {
            self.calls.push(Call::Step);
            self.current = self.script.pop_front().flatten();
            Ok(self.current.is_some())
        }

        fn reset_search(&mut self) {
            self.calls.push(Call::Reset);
        }

        fn value(&self, var: IntVarId) -> EngineResult<i64> {
            self.current
                .as_ref()
                .and_then(|values| values.get(var.index()).copied())
                .ok_or(EngineError::NoSolution(var))
        }
    }

    /// Two items in two bins: variables are bin[0], bin[1], load[0], load[1], min_load.
    fn two_item_config() -> BinPackingConfig {
        BinPackingConfig::new(vec![3, 5], 2)
    }

    fn values(bins: [i64; 2], loads: [i64; 2]) -> Option<Vec<i64>> {
        let min = loads[0].min(loads[1]);
        Some(vec![bins[0], bins[1], loads[0], loads[1], min])
    }

    #[test]
    fn test_config_error_before_engine() {
        let config = BinPackingConfig::new(vec![1, 2, 3], 0);
        let mut engine = ScriptedEngine::new(vec![]);
        let err = BinPackingModel::build(&mut engine, &config).unwrap_err();
        assert_eq!(err, BinPackError::InvalidBinCount(0));
        assert!(err.is_config());
        assert!(engine.calls.is_empty());
    }

    #[test]
    fn test_fixed_target_posts_pin_and_enumerates() {
        let engine = ScriptedEngine::new(vec![
            values([0, 1], [3, 5]),
            values([1, 0], [5, 3]),
            None,
        ]);
        let mut model = BinPackingModel::build(engine, &two_item_config()).unwrap();
        let result = Enumerator::default()
            .run(&SearchMode::FixedTarget { target: 3 }, &mut model)
            .unwrap();

        assert_eq!(result.count(), 2);
        assert_eq!(result.target, Some(3));
        assert_eq!(result.optimum, None);
        assert!(result.states.is_empty());
        let min_load = model.min_load();
        assert!(model.engine().calls.contains(&Call::Post(Constraint::Equal {
            var: min_load,
            value: 3
        })));
        assert_eq!(model.engine().count(|c| *c == Call::Step), 3);
    }

    #[test]
    fn test_single_pass_keeps_last() {
        let engine = ScriptedEngine::new(vec![
            values([0, 0], [8, 0]),
            values([0, 1], [3, 5]),
            None,
        ]);
        let mut model = BinPackingModel::build(engine, &two_item_config()).unwrap();
        let result = Enumerator::default()
            .run(&SearchMode::Maximize, &mut model)
            .unwrap();

        assert_eq!(result.improvements.len(), 2);
        assert_eq!(result.count(), 1);
        assert_eq!(result.optimum, Some(3));
        assert_eq!(result.best().map(|r| r.loads.clone()), Some(vec![3, 5]));
        assert_eq!(
            model.engine().count(|c| *c == Call::SetObjective(Direction::Maximize)),
            1
        );
    }

    #[test]
    fn test_two_phase_pins_phase_one_best() {
        let engine = ScriptedEngine::new(vec![
            // phase 1
            values([0, 0], [8, 0]),
            values([0, 1], [3, 5]),
            None,
            // phase 2
            values([0, 1], [3, 5]),
            values([1, 0], [5, 3]),
            None,
        ]);
        let mut model = BinPackingModel::build(engine, &two_item_config()).unwrap();
        let enumerator = Enumerator::new(EnumeratorConfig::default().with_reuse(ModelReuse::Continue));
        let result = enumerator
            .run(&SearchMode::OptimizeThenEnumerate, &mut model)
            .unwrap();

        assert_eq!(result.optimum, Some(3));
        assert_eq!(result.target, Some(3));
        assert_eq!(
            result.improvements.last().map(|r| r.min_load),
            result.target
        );
        assert_eq!(result.count(), 2);
        assert_eq!(
            result.states,
            vec![
                SearchState::SearchingOptimum,
                SearchState::OptimumFound,
                SearchState::Reset,
                SearchState::Enumerating,
                SearchState::Done,
            ]
        );

        // reset, clear objective, then pin, in that order
        let calls = &model.engine().calls;
        let reset = calls.iter().position(|c| *c == Call::Reset).unwrap();
        assert_eq!(calls[reset + 1], Call::ClearObjective);
        assert!(matches!(
            calls[reset + 2],
            Call::Post(Constraint::Equal { value: 3, .. })
        ));
        assert!(model.engine().objective.is_none());
    }

    #[test]
    fn test_two_phase_infeasible_skips_phase_two() {
        let engine = ScriptedEngine::new(vec![None]);
        let mut model = BinPackingModel::build(engine, &two_item_config()).unwrap();
        let enumerator = Enumerator::new(EnumeratorConfig::default().with_reuse(ModelReuse::Continue));
        let result = enumerator
            .run(&SearchMode::OptimizeThenEnumerate, &mut model)
            .unwrap();

        assert!(result.is_empty());
        assert_eq!(result.optimum, None);
        assert_eq!(result.target, None);
        assert_eq!(
            result.states,
            vec![
                SearchState::SearchingOptimum,
                SearchState::Exhausted,
                SearchState::Done
            ]
        );
        let engine = model.engine();
        assert_eq!(engine.count(|c| *c == Call::Reset), 0);
        assert_eq!(
            engine.count(|c| matches!(c, Call::Post(Constraint::Equal { .. }))),
            0
        );
        assert_eq!(engine.count(|c| *c == Call::Step), 1);
    }

    #[test]
    fn test_reset_policy() {
        let engine = ScriptedEngine::new(vec![None]);
        let mut model = BinPackingModel::build(engine, &two_item_config()).unwrap();
        Enumerator::default()
            .run(&SearchMode::Maximize, &mut model)
            .unwrap();
        let calls = &model.engine().calls;
        let first_runtime_call = calls
            .iter()
            .position(|c| !matches!(c, Call::Declare | Call::Post(_)))
            .unwrap();
        assert_eq!(calls[first_runtime_call], Call::Reset);
        assert_eq!(calls[first_runtime_call + 1], Call::ClearObjective);
    }

    #[test]
    fn test_engine_error_propagates() {
        // script says "solution" but provides too few values to read
        let engine = ScriptedEngine::new(vec![Some(vec![0])]);
        let mut model = BinPackingModel::build(engine, &two_item_config()).unwrap();
        let err = Enumerator::default()
            .run(&SearchMode::FixedTarget { target: 0 }, &mut model)
            .unwrap_err();
        assert!(matches!(err, BinPackError::Engine(EngineError::NoSolution(_))));
    }

    #[test]
    fn test_solution_cap() {
        let engine = ScriptedEngine::new(vec![
            values([0, 1], [3, 5]),
            values([1, 0], [5, 3]),
            None,
        ]);
        let mut model = BinPackingModel::build(engine, &two_item_config()).unwrap();
        let enumerator = Enumerator::new(EnumeratorConfig::default().with_max_solutions(1));
        let result = enumerator
            .run(&SearchMode::FixedTarget { target: 3 }, &mut model)
            .unwrap();
        assert_eq!(result.count(), 1);
        assert!(result.truncated);
    }

    // ---- End to end on the reference engine ----

    #[test]
    fn test_sample_fixed_target_17() {
        let config = BinPackingConfig::default();
        let result = solve(
            ExhaustiveEngine::new(),
            &config,
            &SearchMode::FixedTarget { target: 17 },
        )
        .unwrap();

        assert!(!result.is_empty());
        for record in &result.solutions {
            assert_eq!(record.min_load, 17);
            assert_eq!(record.total_load(), 53);
            assert!(record.is_consistent(&config.weights));
        }
    }

    #[test]
    fn test_sample_two_phase() {
        let config = BinPackingConfig::default();
        let result = solve(
            ExhaustiveEngine::new(),
            &config,
            &SearchMode::OptimizeThenEnumerate,
        )
        .unwrap();

        // 53 over three bins: the best minimum is 17
        assert_eq!(result.optimum, Some(17));
        assert_eq!(result.target, Some(17));
        assert!(result.solutions.iter().all(|r| r.min_load == 17));

        let direct = solve(
            ExhaustiveEngine::new(),
            &config,
            &SearchMode::FixedTarget { target: 17 },
        )
        .unwrap();
        let a: BTreeSet<_> = result.solutions.into_iter().collect();
        let b: BTreeSet<_> = direct.solutions.into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_infeasible_load_bound() {
        let config = BinPackingConfig::new(vec![5, 5, 5], 2).with_max_load(7);
        let result = solve(
            ExhaustiveEngine::new(),
            &config,
            &SearchMode::OptimizeThenEnumerate,
        )
        .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.states.last(), Some(&SearchState::Done));
        assert!(result.states.contains(&SearchState::Exhausted));
    }

    #[test]
    fn test_reset_rejects_pinned_model() {
        let config = BinPackingConfig::new(vec![3, 4, 5], 2);
        let mut model = BinPackingModel::build(ExhaustiveEngine::new(), &config).unwrap();
        let enumerator = Enumerator::default();

        let first = enumerator
            .run(&SearchMode::FixedTarget { target: 5 }, &mut model)
            .unwrap();
        assert_eq!(first.count(), 2);
        assert_eq!(model.pinned(), Some(5));

        let err = enumerator
            .run(&SearchMode::FixedTarget { target: 4 }, &mut model)
            .unwrap_err();
        assert_eq!(err, BinPackError::ModelPinned(5));
        assert!(err.is_config());
    }

    #[test]
    fn test_two_phase_after_fixed_target_on_same_model() {
        let config = BinPackingConfig::new(vec![3, 4, 5], 2);
        let mut model = BinPackingModel::build(ExhaustiveEngine::new(), &config).unwrap();
        let enumerator = Enumerator::default();

        let fixed = enumerator
            .run(&SearchMode::FixedTarget { target: 0 }, &mut model)
            .unwrap();
        assert_eq!(fixed.count(), 2);
        let candidates = model.engine().candidates_evaluated();

        // a stale min_load == 0 pin must not be reported as the optimum
        let err = enumerator
            .run(&SearchMode::OptimizeThenEnumerate, &mut model)
            .unwrap_err();
        assert_eq!(err, BinPackError::ModelPinned(0));
        assert_eq!(model.engine().candidates_evaluated(), candidates);

        let fresh = solve(
            ExhaustiveEngine::new(),
            &config,
            &SearchMode::OptimizeThenEnumerate,
        )
        .unwrap();
        assert_eq!(fresh.optimum, Some(5));
        assert_eq!(fresh.count(), 2);
    }

    #[test]
    fn test_continue_keeps_pins() {
        let config = BinPackingConfig::new(vec![3, 4, 5], 2);
        let mut model = BinPackingModel::build(ExhaustiveEngine::new(), &config).unwrap();
        let enumerator =
            Enumerator::new(EnumeratorConfig::default().with_reuse(ModelReuse::Continue));

        enumerator
            .run(&SearchMode::FixedTarget { target: 5 }, &mut model)
            .unwrap();
        model.engine_mut().reset_search();

        // the min_load == 5 pin is still posted, so no solution has min 4
        let second = enumerator
            .run(&SearchMode::FixedTarget { target: 4 }, &mut model)
            .unwrap();
        assert!(second.is_empty());
        assert_eq!(model.pinned(), Some(4));
    }
}
