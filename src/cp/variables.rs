//! CP variable types.

use std::fmt;

/// Handle to an integer variable declared in a [`CpEngine`](super::CpEngine).
///
/// Handles are only meaningful for the engine that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntVarId(pub(crate) usize);

impl IntVarId {
    /// Position of the variable in declaration order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for IntVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// An integer variable with a domain [min, max].
///
/// This is the declaration an engine keeps for each [`IntVarId`]; the
/// value itself only exists while the engine holds a solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntVar {
    /// Variable name (for diagnostics, not required to be unique).
    pub name: String,
    /// Minimum value.
    pub min: i64,
    /// Maximum value.
    pub max: i64,
}

impl IntVar {
    /// Creates a new integer variable with the given bounds.
    pub fn new(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }

    /// Whether the domain holds a single value.
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Domain size (max - min + 1), zero for an empty domain.
    pub fn domain_size(&self) -> u128 {
        if self.max < self.min {
            0
        } else {
            u128::from(self.max.abs_diff(self.min)) + 1
        }
    }

    /// Whether `value` lies inside the domain.
    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}
