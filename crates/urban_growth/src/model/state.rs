//! Cross-step scalar state of a run.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::grid::CategoryCounts;

/// Scalar state threaded through every step: passed in, returned updated.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunState {
    /// Number of committed steps.
    pub step: u32,
    /// Population after the last committed step.
    pub population: f64,
    /// Unplanned pixels redeveloped as planned over all committed steps.
    pub total_moved_pixels: u64,
}

impl RunState {
    pub fn new(initial_population: f64) -> Self {
        Self {
            step: 0,
            population: initial_population,
            total_moved_pixels: 0,
        }
    }

    /// State after committing one more step.
    pub(crate) fn advanced(self, population: f64, moved_pixels: usize) -> Self {
        Self {
            step: self.step + 1,
            population,
            total_moved_pixels: self.total_moved_pixels + moved_pixels as u64,
        }
    }
}

/// Everything recorded about one committed step.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct StepStats {
    pub step: u32,
    pub year: i32,
    /// Population after this step.
    pub population: f64,
    pub planned_requested: usize,
    pub planned_assigned: usize,
    pub unplanned_requested: usize,
    pub unplanned_assigned: usize,
    /// Unplanned pixels redeveloped as planned in this step.
    pub moved_pixels: usize,
    pub cumulative_moved_pixels: u64,
    pub cumulative_moved_population: f64,
    pub counts: CategoryCounts,
}

impl StepStats {
    pub fn planned_shortfall(&self) -> usize {
        self.planned_requested.saturating_sub(self.planned_assigned)
    }

    pub fn unplanned_shortfall(&self) -> usize {
        self.unplanned_requested.saturating_sub(self.unplanned_assigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advanced_accumulates_moves() {
        let state = RunState::new(100.0)
            .advanced(110.0, 3)
            .advanced(120.0, 2);
        assert_eq!(state.step, 2);
        assert_eq!(state.population, 120.0);
        assert_eq!(state.total_moved_pixels, 5);
    }
}
