//! Urban growth model: scoring, demand and the per-step allocation loop.
//!
//! Each step ranks cells by a per-category utility and converts the best ones to
//! planned, then unplanned settlement, with pixel counts driven by population growth.
pub mod config;
pub mod demand;
pub mod events;
pub mod neighborhood;
pub mod ranking;
pub mod report;
pub mod runner;
pub mod state;
pub mod utility;

pub use config::SimulationConfig;
pub use demand::{
    Demand, DemandCalculator, DensityMode, PopulationModel, RoundingRule, ZeroDensityPolicy,
};
pub use neighborhood::neighborhood_density;
pub use ranking::{select_top_n, Allocation, RankResult};
pub use report::{class_change, unique_counts, ClassChange, ReportCollector, RunReport};
pub use runner::{run_simulation, run_step, Simulation, SimulationOutput, StepOutcome};
pub use state::{RunState, StepStats};
pub use utility::{compute_utility, layer_ids, UtilityWeights, WeightedLayer};
