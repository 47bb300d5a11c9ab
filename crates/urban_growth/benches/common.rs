#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use urban_growth::prelude::*;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

pub fn random_layer(shape: GridShape, seed: u64) -> Raster<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Raster::from_fn(shape, |_, _| rng.random::<f64>())
}

/// Mostly expansion land with scattered settlements and a no-data frame.
pub fn random_land_cover(shape: GridShape, seed: u64) -> LandCoverGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    let cells = Raster::from_fn(shape, |row, col| {
        if row == 0 || col == 0 || row + 1 == shape.rows || col + 1 == shape.cols {
            return LandCover::NoData;
        }
        let roll = rng.random::<f64>();
        if roll < 0.05 {
            LandCover::Planned
        } else if roll < 0.12 {
            LandCover::Unplanned
        } else {
            LandCover::Expansion
        }
    });
    LandCoverGrid::new(cells)
}

/// Store with every layer the default weights reference.
pub fn default_store(shape: GridShape, seed: u64) -> GridStore {
    use urban_growth::model::layer_ids::*;
    let mut layers = LayerRegistry::new(shape);
    let ids = [
        SLOPE,
        DISTANCE_TO_CENTER,
        DISTANCE_TO_PRIMARY_ROAD,
        INFRASTRUCTURE_SUITABILITY,
        INVESTMENT_DIFFICULTY,
        AREAS_OF_INTEREST,
        DISTANCE_TO_RIVER,
        DISTANCE_TO_WORSHIP,
        DISTANCE_TO_LOCAL_ROAD,
    ];
    for (i, id) in ids.into_iter().enumerate() {
        layers
            .register(id, random_layer(shape, seed ^ (i as u64 + 1)))
            .expect("layer shape");
    }
    GridStore::new(random_land_cover(shape, seed), layers).expect("store")
}
