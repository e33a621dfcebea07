//! Search modes, solution records and run results.

use crate::error::{BinPackError, Result};
use std::fmt;
use std::str::FromStr;

/// Immutable snapshot of one solution reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolutionRecord {
    /// Bin index of each item.
    pub bins: Vec<i64>,
    /// Load of each bin.
    pub loads: Vec<i64>,
    /// Value of the minimum-load variable.
    pub min_load: i64,
}

impl SolutionRecord {
    /// Sum of all bin loads.
    pub fn total_load(&self) -> i64 {
        self.loads.iter().sum()
    }

    /// Smallest bin load, `None` when there are no bins.
    pub fn smallest_load(&self) -> Option<i64> {
        self.loads.iter().copied().min()
    }

    /// Checks the record against the item weights: loads match the
    /// assignment, total load equals total weight, and the minimum-load
    /// variable equals the smallest load.
    pub fn is_consistent(&self, weights: &[i64]) -> bool {
        if self.bins.len() != weights.len() {
            return false;
        }
        let mut expected = vec![0i64; self.loads.len()];
        for (&bin, &weight) in self.bins.iter().zip(weights) {
            match usize::try_from(bin).ok().and_then(|b| expected.get_mut(b)) {
                Some(load) => *load += weight,
                None => return false,
            }
        }
        expected == self.loads
            && self.total_load() == weights.iter().sum::<i64>()
            && self.smallest_load() == Some(self.min_load)
    }
}

impl fmt::Display for SolutionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bins={:?} loads={:?} min_load={}",
            self.bins, self.loads, self.min_load
        )
    }
}

/// Untyped mode name, as given on a command line or by the legacy integer
/// selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModeKind {
    FixedTarget,
    Maximize,
    OptimizeThenEnumerate,
}

impl ModeKind {
    /// Maps the integer selector `0`, `1`, `2` to a mode.
    pub fn from_selector(selector: i64) -> Result<Self> {
        match selector {
            0 => Ok(ModeKind::FixedTarget),
            1 => Ok(ModeKind::Maximize),
            2 => Ok(ModeKind::OptimizeThenEnumerate),
            other => Err(BinPackError::UnsupportedMode(other.to_string())),
        }
    }
}

impl FromStr for ModeKind {
    type Err = BinPackError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        if let Ok(selector) = name.parse::<i64>() {
            return Self::from_selector(selector);
        }
        match name.to_ascii_lowercase().as_str() {
            "fixed-target" | "fixed" => Ok(ModeKind::FixedTarget),
            "maximize" | "max" => Ok(ModeKind::Maximize),
            "two-phase" | "optimize-then-enumerate" => Ok(ModeKind::OptimizeThenEnumerate),
            _ => Err(BinPackError::UnsupportedMode(s.to_string())),
        }
    }
}

/// How the enumerator drives the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchMode {
    /// Pin the minimum load to a known target and enumerate every solution.
    FixedTarget { target: i64 },

    /// Maximize the minimum load in a single pass. Finds one optimum.
    Maximize,

    /// Find and prove the optimum, then enumerate every optimal solution.
    OptimizeThenEnumerate,
}

impl SearchMode {
    /// Builds a mode from its kind; `target` is required for
    /// [`ModeKind::FixedTarget`] and ignored otherwise.
    pub fn new(kind: ModeKind, target: Option<i64>) -> Result<Self> {
        match kind {
            ModeKind::FixedTarget => target
                .map(|target| SearchMode::FixedTarget { target })
                .ok_or(BinPackError::MissingTarget),
            ModeKind::Maximize => Ok(SearchMode::Maximize),
            ModeKind::OptimizeThenEnumerate => Ok(SearchMode::OptimizeThenEnumerate),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::FixedTarget { target } => write!(f, "fixed-target({target})"),
            SearchMode::Maximize => write!(f, "maximize"),
            SearchMode::OptimizeThenEnumerate => write!(f, "two-phase"),
        }
    }
}

/// States visited by the two-phase mode.
///
/// `SearchingOptimum -> OptimumFound -> Reset -> Enumerating -> Done`, or
/// `SearchingOptimum -> Exhausted -> Done` when phase 1 finds nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchState {
    SearchingOptimum,
    OptimumFound,
    Reset,
    Enumerating,
    Exhausted,
    Done,
}

/// Result of an enumerator run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumerationResult {
    /// Mode that produced this result.
    pub mode: SearchMode,

    /// Solutions in discovery order. For fixed-target and two-phase runs
    /// these are all solutions with the pinned minimum load; for a
    /// single-pass maximize run, only the final (optimal) solution.
    pub solutions: Vec<SolutionRecord>,

    /// Strictly improving solutions of the optimization pass, in order.
    pub improvements: Vec<SolutionRecord>,

    /// Best minimum load proven by an optimization pass.
    pub optimum: Option<i64>,

    /// Value the minimum load was pinned to for enumeration.
    pub target: Option<i64>,

    /// Two-phase state trace. Empty for the other modes.
    pub states: Vec<SearchState>,

    /// Whether enumeration stopped at the configured solution cap.
    pub truncated: bool,
}

impl EnumerationResult {
    pub(crate) fn new(mode: SearchMode) -> Self {
        Self {
            mode,
            solutions: Vec::new(),
            improvements: Vec::new(),
            optimum: None,
            target: None,
            states: Vec::new(),
            truncated: false,
        }
    }

    /// Number of recorded solutions.
    pub fn count(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// The last recorded solution.
    pub fn best(&self) -> Option<&SolutionRecord> {
        self.solutions.last()
    }
}
