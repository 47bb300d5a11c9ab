//! Step-by-step execution of a simulation run.
//!
//! [`run_step`] is a pure transition from the committed grid of step `k - 1` to a new
//! grid for step `k`: neighborhood, utilities, demand, planned allocation, displacement
//! accounting, unplanned allocation. [`Simulation`] owns the [`GridStore`] and the
//! [`RunState`], commits each outcome and collects the report.
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::grid::{GridStore, LandCover, LandCoverGrid, Raster};
use crate::model::config::SimulationConfig;
use crate::model::demand::{Demand, DemandCalculator, DensityMode};
use crate::model::events::{EventSink, SimulationEvent, SimulationEventKind};
use crate::model::neighborhood::neighborhood_density;
use crate::model::ranking::{select_top_n, Allocation};
use crate::model::report::{ReportCollector, RunReport};
use crate::model::state::{RunState, StepStats};
use crate::model::utility::compute_utility;

/// Everything one step produced, before it is committed.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    /// Land cover of the new step.
    pub land_cover: LandCoverGrid,
    /// Run state after the step.
    pub state: RunState,
    pub stats: StepStats,
    pub demand: Demand,
    /// Cells that became planned.
    pub planned: Allocation,
    /// Cells that became unplanned.
    pub unplanned: Allocation,
}

/// Final land cover and report of a run.
#[derive(Clone, Debug)]
pub struct SimulationOutput {
    pub land_cover: LandCoverGrid,
    pub report: RunReport,
}

/// Compute the next step from the store's committed land cover without committing it.
pub fn run_step(
    store: &GridStore,
    state: RunState,
    config: &SimulationConfig,
    sink: &mut dyn EventSink,
) -> Result<StepOutcome> {
    let step = state.step + 1;
    let year = config.start_year + step as i32;
    let previous = store.current();
    let layers = store.layers();

    if sink.wants(SimulationEventKind::StepStarted) {
        sink.send(SimulationEvent::StepStarted { step, year });
    }

    let neighborhood = (config.planned_weights.uses_neighborhood()
        || config.unplanned_weights.uses_neighborhood())
    .then(|| neighborhood_density(&previous.mask(LandCover::Unplanned)));
    let planned_utility = compute_utility(&config.planned_weights, layers, neighborhood.as_ref())?;
    let unplanned_utility =
        compute_utility(&config.unplanned_weights, layers, neighborhood.as_ref())?;

    let calculator = DemandCalculator::new(&config.population, config.rounding, config.zero_density);
    let demand = match config.density_mode {
        DensityMode::Initial => calculator.compute(
            step,
            config.population.initial_population,
            &store.initial().counts(),
        )?,
        DensityMode::Dynamic => calculator.compute(step, state.population, &previous.counts())?,
    };
    debug!(
        "Step {}: demand planned={} unplanned={} (densities {:?} / {:?}).",
        step,
        demand.planned_pixels,
        demand.unplanned_pixels,
        demand.planned_density,
        demand.unplanned_density
    );
    if sink.wants(SimulationEventKind::DemandComputed) {
        sink.send(SimulationEvent::DemandComputed { demand });
    }

    // Planned growth may redevelop unplanned cells.
    let planned_eligible = previous
        .cells()
        .map(|c| *c != LandCover::Planned && *c != LandCover::NoData);
    let planned = select_top_n(&planned_utility, &planned_eligible, demand.planned_pixels)
        .map_err(scored_for(LandCover::Planned))?;
    let mut working = previous.clone();
    paint(&mut working, &planned.assigned, LandCover::Planned);
    report_allocation(step, LandCover::Planned, &planned, sink);

    let displaced = previous.count(LandCover::Unplanned) - working.count(LandCover::Unplanned);

    let unplanned_eligible = Raster::from_vec(
        working.shape(),
        working
            .as_slice()
            .iter()
            .map(|c| {
                *c != LandCover::Planned && *c != LandCover::NoData && *c != LandCover::Unplanned
            })
            .collect(),
    )?;
    let unplanned = select_top_n(
        &unplanned_utility,
        &unplanned_eligible,
        demand.unplanned_with_displacement(displaced)?,
    )
    .map_err(scored_for(LandCover::Unplanned))?;
    debug_assert!(planned
        .assigned
        .as_slice()
        .iter()
        .zip(unplanned.assigned.as_slice())
        .all(|(p, u)| !(*p && *u)));
    paint(&mut working, &unplanned.assigned, LandCover::Unplanned);
    report_allocation(step, LandCover::Unplanned, &unplanned, sink);

    let next_state = state.advanced(config.population.population_at(step), displaced);
    let stats = StepStats {
        step,
        year,
        population: next_state.population,
        planned_requested: planned.requested,
        planned_assigned: planned.assigned_count,
        unplanned_requested: unplanned.requested,
        unplanned_assigned: unplanned.assigned_count,
        moved_pixels: displaced,
        cumulative_moved_pixels: next_state.total_moved_pixels,
        cumulative_moved_population: demand.unplanned_population(next_state.total_moved_pixels),
        counts: working.counts(),
    };

    Ok(StepOutcome {
        land_cover: working,
        state: next_state,
        stats,
        demand,
        planned,
        unplanned,
    })
}

fn paint(grid: &mut LandCoverGrid, assigned: &Raster<bool>, category: LandCover) {
    for (cell, &hit) in grid.as_mut_slice().iter_mut().zip(assigned.as_slice()) {
        if hit {
            *cell = category;
        }
    }
}

/// Attach the category to a non-finite utility reported by the allocator.
fn scored_for(category: LandCover) -> impl Fn(Error) -> Error {
    move |err| match err {
        Error::NonFiniteUtility { row, col, .. } => Error::NonFiniteUtility {
            category: Some(category),
            row,
            col,
        },
        other => other,
    }
}

fn report_allocation(
    step: u32,
    category: LandCover,
    allocation: &Allocation,
    sink: &mut dyn EventSink,
) {
    if sink.wants(SimulationEventKind::CategoryAllocated) {
        sink.send(SimulationEvent::CategoryAllocated {
            step,
            category,
            requested: allocation.requested,
            assigned: allocation.assigned_count,
        });
    }
    if allocation.is_under_allocated() {
        warn!(
            "Step {}: only {} of {} {:?} pixels could be allocated.",
            step, allocation.assigned_count, allocation.requested, category
        );
        if sink.wants(SimulationEventKind::UnderAllocation) {
            sink.send(SimulationEvent::UnderAllocation {
                step,
                category,
                requested: allocation.requested,
                assigned: allocation.assigned_count,
            });
        }
    }
}

/// A run in progress: configuration, committed land cover and accumulated state.
pub struct Simulation {
    config: SimulationConfig,
    store: GridStore,
    state: RunState,
    collector: ReportCollector,
}

impl Simulation {
    /// Validates the configuration against the store and prepares step 0.
    pub fn try_new(config: SimulationConfig, store: GridStore) -> Result<Self> {
        config.validate_layers(store.layers())?;
        // Every density mode derives step 1 from the initial counts.
        let calculator =
            DemandCalculator::new(&config.population, config.rounding, config.zero_density);
        let initial_counts = store.initial().counts();
        for category in [LandCover::Planned, LandCover::Unplanned] {
            calculator.density(category, config.population.initial_population, &initial_counts)?;
        }
        let state = RunState::new(config.population.initial_population);
        let collector = ReportCollector::new(store.current());
        Ok(Self {
            config,
            store,
            state,
            collector,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn store(&self) -> &GridStore {
        &self.store
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// The most recently committed land cover.
    pub fn land_cover(&self) -> &LandCoverGrid {
        self.store.current()
    }

    pub fn is_finished(&self) -> bool {
        self.state.step >= self.config.steps
    }

    /// Runs and commits one step.
    pub fn step(&mut self) -> Result<StepStats> {
        self.step_with_events(&mut ())
    }

    pub fn step_with_events(&mut self, sink: &mut dyn EventSink) -> Result<StepStats> {
        if self.is_finished() {
            return Err(Error::Other(format!(
                "simulation already ran all {} steps",
                self.config.steps
            )));
        }
        let outcome = run_step(&self.store, self.state, &self.config, sink)?;
        self.store.commit(outcome.land_cover)?;
        self.state = outcome.state;

        let stats = outcome.stats;
        info!(
            "Year {}: population {} | unplanned pixels moved {} | unplanned population moved {}.",
            stats.year,
            stats.population,
            stats.cumulative_moved_pixels,
            stats.cumulative_moved_population
        );
        if sink.wants(SimulationEventKind::StepFinished) {
            sink.send(SimulationEvent::StepFinished {
                stats: stats.clone(),
            });
        }
        self.collector.record(stats.clone());
        Ok(stats)
    }

    /// Runs all remaining steps.
    pub fn run(self) -> Result<SimulationOutput> {
        self.run_until(&mut (), |_| false)
    }

    pub fn run_with_events(self, sink: &mut dyn EventSink) -> Result<SimulationOutput> {
        self.run_until(sink, |_| false)
    }

    /// Runs remaining steps, asking `should_stop` before each one.
    pub fn run_until(
        mut self,
        sink: &mut dyn EventSink,
        mut should_stop: impl FnMut(&RunState) -> bool,
    ) -> Result<SimulationOutput> {
        if sink.wants(SimulationEventKind::RunStarted) {
            sink.send(SimulationEvent::RunStarted {
                shape: self.store.shape(),
                steps: self.config.steps,
                initial_counts: self.store.initial().counts(),
            });
        }

        let mut cancelled = false;
        while !self.is_finished() {
            if should_stop(&self.state) {
                cancelled = true;
                info!("Run cancelled after {} steps.", self.state.step);
                if sink.wants(SimulationEventKind::Cancelled) {
                    sink.send(SimulationEvent::Cancelled {
                        completed_steps: self.state.step,
                    });
                }
                break;
            }
            self.step_with_events(sink)?;
        }

        let report = self.collector.finish(self.store.current(), cancelled);
        info!(
            "Planned pixels {} -> {} | unplanned pixels {} -> {}.",
            report.initial_counts.planned,
            report.final_counts.planned,
            report.initial_counts.unplanned,
            report.final_counts.unplanned
        );
        if !cancelled && sink.wants(SimulationEventKind::RunFinished) {
            sink.send(SimulationEvent::RunFinished {
                report: report.clone(),
            });
        }

        Ok(SimulationOutput {
            land_cover: self.store.current().clone(),
            report,
        })
    }
}

/// Validates inputs and runs every step of `config` on `store`.
pub fn run_simulation(
    config: SimulationConfig,
    store: GridStore,
    sink: Option<&mut dyn EventSink>,
) -> Result<SimulationOutput> {
    let simulation = Simulation::try_new(config, store)?;
    match sink {
        Some(s) => simulation.run_with_events(s),
        None => simulation.run(),
    }
}
