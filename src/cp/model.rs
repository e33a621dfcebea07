//! CP model definition.

use super::engine::EngineError;
use super::variables::{IntVar, IntVarId};

/// A constraint in the CP model.
///
/// Only the constraints needed to express load-balanced bin packing are
/// provided. Variables are referenced by the handles an engine issued.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Constraint {
    /// Bin packing: `loads[b]` equals the summed weight of the items whose
    /// bin variable takes the value `origin + b`.
    ///
    /// Every bin variable must take a value in
    /// `[origin, origin + loads.len() - 1]`.
    BinPacking {
        /// Bin chosen for each item.
        bins: Vec<IntVarId>,
        /// Weight of each item (parallel to `bins`).
        weights: Vec<i64>,
        /// Load of each bin.
        loads: Vec<IntVarId>,
        /// Value of the first bin index.
        origin: i64,
    },

    /// `target == min(sources)`.
    Min {
        target: IntVarId,
        sources: Vec<IntVarId>,
    },

    /// `var == value`.
    Equal { var: IntVarId, value: i64 },
}

impl Constraint {
    /// Variables whose value this constraint can fully determine from the
    /// others.
    pub fn outputs(&self) -> Vec<IntVarId> {
        match self {
            Constraint::BinPacking { loads, .. } => loads.clone(),
            Constraint::Min { target, .. } => vec![*target],
            Constraint::Equal { .. } => Vec::new(),
        }
    }

    /// Variables this constraint reads to determine its outputs.
    pub fn inputs(&self) -> Vec<IntVarId> {
        match self {
            Constraint::BinPacking { bins, .. } => bins.clone(),
            Constraint::Min { sources, .. } => sources.clone(),
            Constraint::Equal { var, .. } => vec![*var],
        }
    }

    /// Computes the outputs from a (partial) assignment in which every input
    /// is already set. Returns `None` if the inputs admit no output value,
    /// e.g. an item assigned outside the bin range.
    pub fn compute(&self, values: &[i64]) -> Option<Vec<i64>> {
        match self {
            Constraint::BinPacking {
                bins,
                weights,
                loads,
                origin,
            } => {
                let mut totals = vec![0i64; loads.len()];
                for (bin, weight) in bins.iter().zip(weights) {
                    let slot = values[bin.0].checked_sub(*origin)?;
                    let slot = usize::try_from(slot).ok()?;
                    let total = totals.get_mut(slot)?;
                    *total = total.checked_add(*weight)?;
                }
                Some(totals)
            }
            Constraint::Min { sources, .. } => sources
                .iter()
                .map(|v| values[v.0])
                .min()
                .map(|m| vec![m]),
            Constraint::Equal { .. } => Some(Vec::new()),
        }
    }

    /// Whether a complete assignment satisfies this constraint.
    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        match self {
            Constraint::Equal { var, value } => values[var.0] == *value,
            _ => match self.compute(values) {
                Some(expected) => self
                    .outputs()
                    .iter()
                    .zip(&expected)
                    .all(|(var, value)| values[var.0] == *value),
                None => false,
            },
        }
    }

    /// Checks arities and that every referenced variable exists.
    pub fn validate(&self, var_count: usize) -> Result<(), EngineError> {
        let known = |var: &IntVarId| {
            if var.0 < var_count {
                Ok(())
            } else {
                Err(EngineError::UnknownVariable(*var))
            }
        };
        match self {
            Constraint::BinPacking {
                bins,
                weights,
                loads,
                ..
            } => {
                if bins.len() != weights.len() {
                    return Err(EngineError::ArityMismatch {
                        constraint: "bin_packing",
                        expected: bins.len(),
                        found: weights.len(),
                    });
                }
                if loads.is_empty() && !bins.is_empty() {
                    return Err(EngineError::EmptyScope("bin_packing"));
                }
            }
            Constraint::Min { sources, .. } => {
                if sources.is_empty() {
                    return Err(EngineError::EmptyScope("min"));
                }
            }
            Constraint::Equal { .. } => {}
        }
        self.inputs().iter().try_for_each(known)?;
        self.outputs().iter().try_for_each(known)
    }
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Maximize,
    Minimize,
}

/// Objective function for the CP model: a single integer variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Objective {
    pub direction: Direction,
    pub var: IntVarId,
}

impl Objective {
    /// Whether `candidate` is strictly better than `incumbent`.
    pub fn improves(&self, candidate: i64, incumbent: i64) -> bool {
        match self.direction {
            Direction::Maximize => candidate > incumbent,
            Direction::Minimize => candidate < incumbent,
        }
    }
}

/// A constraint programming model.
///
/// Contains variables, posted constraints, and an optional objective.
///
/// # Examples
///
/// ```
/// use u_binpack::cp::{Constraint, CpModel, IntVar};
///
/// let mut model = CpModel::new("example");
/// let x = model.add_int_var(IntVar::new("x", 0, 3));
/// let y = model.add_int_var(IntVar::new("y", 0, 3));
/// model.add_constraint(Constraint::Min { target: y, sources: vec![x] }).unwrap();
/// assert_eq!(model.constraint_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    /// Integer variables, indexed by [`IntVarId`].
    pub int_vars: Vec<IntVar>,
    /// Constraints in posting order.
    pub constraints: Vec<Constraint>,
    /// Objective function.
    pub objective: Option<Objective>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            int_vars: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Adds an integer variable and returns its handle.
    pub fn add_int_var(&mut self, var: IntVar) -> IntVarId {
        self.int_vars.push(var);
        IntVarId(self.int_vars.len() - 1)
    }

    /// Validates and adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), EngineError> {
        constraint.validate(self.int_vars.len())?;
        self.constraints.push(constraint);
        Ok(())
    }

    /// Sets the objective function.
    pub fn set_objective(&mut self, objective: Objective) -> Result<(), EngineError> {
        self.var(objective.var)?;
        self.objective = Some(objective);
        Ok(())
    }

    /// Removes the objective function.
    pub fn clear_objective(&mut self) {
        self.objective = None;
    }

    /// Looks up a variable declaration.
    pub fn var(&self, id: IntVarId) -> Result<&IntVar, EngineError> {
        self.int_vars
            .get(id.0)
            .ok_or(EngineError::UnknownVariable(id))
    }

    /// Whether a complete assignment satisfies every domain and constraint.
    pub fn is_solution(&self, values: &[i64]) -> bool {
        values.len() == self.int_vars.len()
            && self.int_vars.iter().zip(values).all(|(v, &x)| v.contains(x))
            && self.constraints.iter().all(|c| c.is_satisfied(values))
    }

    /// Returns the number of variables.
    pub fn var_count(&self) -> usize {
        self.int_vars.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}
