//! Grid subsystem holding the land-cover state and the static suitability layers.
//!
//! This module groups the row-major [`Raster`] container, the categorical
//! [`LandCoverGrid`], the [`LayerRegistry`] of normalized suitability layers and the
//! [`GridStore`] that owns both for the duration of a run.
pub mod land_cover;
pub mod layers;
pub mod normalize;
pub mod raster;
pub mod shape;
pub mod store;

pub use land_cover::{CategoryCounts, LandCover, LandCoverGrid};
pub use layers::{LayerId, LayerRegistry};
pub use normalize::{normalize, DegeneratePolicy};
pub use raster::Raster;
pub use shape::GridShape;
pub use store::GridStore;
