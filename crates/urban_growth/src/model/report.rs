//! Run reporting: per-step statistics, before/after counts and class histograms.
//!
//! [`ReportCollector`] accumulates [`StepStats`] while a run progresses and produces a
//! [`RunReport`]. [`class_change`] compares a reference land-cover classification before
//! and after the run, with urbanized cells re-coded to a single urban class.
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::{CategoryCounts, GridShape, LandCover, LandCoverGrid, Raster};
use crate::model::state::StepStats;

/// Summary of a run.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    pub shape: GridShape,
    pub initial_counts: CategoryCounts,
    pub final_counts: CategoryCounts,
    pub steps: Vec<StepStats>,
    /// `true` if the run stopped before the configured number of steps.
    pub cancelled: bool,
}

impl RunReport {
    pub fn completed_steps(&self) -> u32 {
        self.steps.last().map_or(0, |s| s.step)
    }

    /// Signed change in pixel count of `category` over the run.
    pub fn growth(&self, category: LandCover) -> i64 {
        self.final_counts.get(category) as i64 - self.initial_counts.get(category) as i64
    }

    pub fn total_moved_pixels(&self) -> u64 {
        self.steps.last().map_or(0, |s| s.cumulative_moved_pixels)
    }

    /// Requested pixels that could not be placed, summed over steps and categories.
    pub fn total_shortfall(&self) -> usize {
        self.steps
            .iter()
            .map(|s| s.planned_shortfall() + s.unplanned_shortfall())
            .sum()
    }
}

/// Accumulates step statistics into a [`RunReport`].
#[derive(Clone, Debug)]
pub struct ReportCollector {
    shape: GridShape,
    initial_counts: CategoryCounts,
    steps: Vec<StepStats>,
}

impl ReportCollector {
    pub fn new(initial: &LandCoverGrid) -> Self {
        Self {
            shape: initial.shape(),
            initial_counts: initial.counts(),
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, stats: StepStats) {
        self.steps.push(stats);
    }

    pub fn steps(&self) -> &[StepStats] {
        &self.steps
    }

    pub fn finish(self, last: &LandCoverGrid, cancelled: bool) -> RunReport {
        RunReport {
            shape: self.shape,
            initial_counts: self.initial_counts,
            final_counts: last.counts(),
            steps: self.steps,
            cancelled,
        }
    }
}

/// Number of cells per distinct value, in ascending value order.
pub fn unique_counts(values: &Raster<i64>) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for &v in values.as_slice() {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
}

/// Before/after pixel count of one reference class.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ClassChange {
    pub class: i64,
    pub before: usize,
    pub after: usize,
    /// `round((before - after) / before * 100)`, `None` for classes absent before.
    pub percent_lost: Option<f64>,
}

/// Compare a reference classification with itself after urbanization.
///
/// Every cell that is planned or unplanned in `simulated` is re-coded to `urban_class`
/// in the "after" histogram.
pub fn class_change(
    reference: &Raster<i64>,
    simulated: &LandCoverGrid,
    urban_class: i64,
) -> Result<Vec<ClassChange>> {
    reference.ensure_shape("reference_classes", simulated.shape())?;
    let before = unique_counts(reference);
    let after_raster = Raster::from_vec(
        reference.shape(),
        reference
            .as_slice()
            .iter()
            .zip(simulated.as_slice())
            .map(|(&class, cover)| match cover {
                LandCover::Planned | LandCover::Unplanned => urban_class,
                _ => class,
            })
            .collect(),
    )?;
    let after = unique_counts(&after_raster);

    let mut classes: Vec<i64> = before.keys().chain(after.keys()).copied().collect();
    classes.sort_unstable();
    classes.dedup();

    Ok(classes
        .into_iter()
        .map(|class| {
            let b = before.get(&class).copied().unwrap_or(0);
            let a = after.get(&class).copied().unwrap_or(0);
            let percent_lost = (b > 0)
                .then(|| ((b as f64 - a as f64) / b as f64 * 100.0).round_ties_even());
            ClassChange {
                class,
                before: b,
                after: a,
                percent_lost,
            }
        })
        .collect())
}
