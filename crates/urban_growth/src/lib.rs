#![forbid(unsafe_code)]
//! urban_growth: year-by-year planned and unplanned urban expansion on a land-cover raster.
//!
//! Modules:
//! - grid: rasters, the categorical land-cover grid, suitability layers and normalization
//! - model: neighborhood, utility, ranking, demand and the simulation loop with reporting
//! - ascii_grid: reading and writing georeferenced ESRI ASCII grids
//!
//! For a runnable end-to-end example, see the `urban_growth_examples` crate.
pub mod ascii_grid;
pub mod error;
pub mod grid;
pub mod model;

/// Convenient re-exports for common types. Import with `use urban_growth::prelude::*;`.
pub mod prelude {
    pub use crate::ascii_grid::{AsciiGrid, GeoRaster, GeoReference, RasterReader, RasterWriter};
    pub use crate::error::{Error, Result};
    pub use crate::grid::{
        normalize, CategoryCounts, DegeneratePolicy, GridShape, GridStore, LandCover,
        LandCoverGrid, LayerRegistry, Raster,
    };
    pub use crate::model::events::{
        EventSink, FnSink, MultiSink, SimulationEvent, SimulationEventKind, VecSink,
    };
    pub use crate::model::{
        class_change, compute_utility, layer_ids, neighborhood_density, run_simulation,
        run_step, select_top_n, Allocation, ClassChange, Demand, DemandCalculator, DensityMode,
        PopulationModel, RoundingRule, RunReport, RunState, Simulation, SimulationConfig,
        SimulationOutput, StepStats, UtilityWeights, WeightedLayer, ZeroDensityPolicy,
    };
}
