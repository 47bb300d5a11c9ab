use glam::DVec2;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use urban_growth::model::layer_ids;
use urban_growth::prelude::*;

/// A procedurally generated city: a planned core, an unplanned ring, open land around
/// it and a no-data area outside the municipal boundary.
#[derive(Clone, Debug)]
pub struct SyntheticCity {
    pub shape: GridShape,
    pub seed: u64,
    /// Radius of the planned core, in cells.
    pub core_radius: f64,
    /// Outer radius of the unplanned ring, in cells.
    pub ring_radius: f64,
    /// Cells farther than this from the center are outside the boundary.
    pub boundary_radius: f64,
    /// Number of worship sites and areas of interest each.
    pub landmarks: usize,
}

impl SyntheticCity {
    pub fn new(rows: usize, cols: usize, seed: u64) -> Self {
        let half = rows.min(cols) as f64 / 2.0;
        Self {
            shape: GridShape::new(rows, cols),
            seed,
            core_radius: half * 0.15,
            ring_radius: half * 0.3,
            boundary_radius: half * 0.95,
            landmarks: 6,
        }
    }

    fn center(&self) -> DVec2 {
        DVec2::new(self.shape.cols as f64, self.shape.rows as f64) / 2.0
    }

    fn cell(row: usize, col: usize) -> DVec2 {
        DVec2::new(col as f64 + 0.5, row as f64 + 0.5)
    }

    pub fn land_cover(&self) -> LandCoverGrid {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let center = self.center();
        let cells = Raster::from_fn(self.shape, |row, col| {
            let d = Self::cell(row, col).distance(center);
            let jitter = rng.random::<f64>() * 2.0 - 1.0;
            if d > self.boundary_radius {
                LandCover::NoData
            } else if d + jitter < self.core_radius {
                LandCover::Planned
            } else if d + jitter * 2.0 < self.ring_radius && rng.random::<f64>() < 0.7 {
                LandCover::Unplanned
            } else {
                LandCover::Expansion
            }
        });
        LandCoverGrid::new(cells)
    }

    /// Raw, unnormalized suitability layers keyed by the ids the default weights use.
    pub fn raw_layers(&self) -> Vec<(&'static str, Raster<f64>)> {
        let mut rng = StdRng::seed_from_u64(self.seed ^ 0x9E37_79B9_7F4A_7C15);
        let shape = self.shape;
        let center = self.center();
        let extent = DVec2::new(shape.cols as f64, shape.rows as f64);

        let mut sites = |n: usize| -> Vec<DVec2> {
            (0..n)
                .map(|_| DVec2::new(rng.random::<f64>(), rng.random::<f64>()) * extent)
                .collect()
        };
        let worship = sites(self.landmarks);
        let interest = sites(self.landmarks);
        let nearest = |p: DVec2, pts: &[DVec2]| {
            pts.iter()
                .map(|q| p.distance(*q))
                .fold(f64::INFINITY, f64::min)
        };

        let river_amplitude = extent.y * 0.1;
        let river_y = |x: f64| extent.y * 0.7 + river_amplitude * (x / extent.x * 6.0).sin();
        let hill = center + DVec2::new(extent.x * 0.25, -extent.y * 0.2);

        let distance_to_center = Raster::from_fn(shape, |r, c| Self::cell(r, c).distance(center));
        let slope = Raster::from_fn(shape, |r, c| {
            let p = Self::cell(r, c);
            (-(p.distance(hill) / (extent.x * 0.2)).powi(2)).exp() + 0.05 * (p.x * 0.3).sin()
        });
        let distance_to_primary_road = Raster::from_fn(shape, |r, c| {
            let d = Self::cell(r, c) - center;
            d.x.abs().min(d.y.abs())
        });
        let distance_to_local_road = Raster::from_fn(shape, |r, c| {
            let p = Self::cell(r, c);
            let spacing = 8.0;
            let dx = (p.x % spacing).min(spacing - p.x % spacing);
            let dy = (p.y % spacing).min(spacing - p.y % spacing);
            dx.min(dy)
        });
        let distance_to_river = Raster::from_fn(shape, |r, c| {
            let p = Self::cell(r, c);
            (p.y - river_y(p.x)).abs()
        });
        let distance_to_worship = Raster::from_fn(shape, |r, c| nearest(Self::cell(r, c), &worship));
        let areas_of_interest = Raster::from_fn(shape, |r, c| {
            let p = Self::cell(r, c);
            interest
                .iter()
                .map(|q| (-(p.distance(*q) / 6.0).powi(2)).exp())
                .sum::<f64>()
        });
        let infrastructure_suitability = distance_to_center.map(|d| 1.0 / (1.0 + d));
        let investment_difficulty = Raster::from_fn(shape, |r, c| {
            slope.at(r, c) + 0.3 * (1.0 - (-distance_to_center.at(r, c) / extent.x).exp())
        });

        vec![
            (layer_ids::SLOPE, slope),
            (layer_ids::DISTANCE_TO_CENTER, distance_to_center),
            (layer_ids::DISTANCE_TO_PRIMARY_ROAD, distance_to_primary_road),
            (layer_ids::INFRASTRUCTURE_SUITABILITY, infrastructure_suitability),
            (layer_ids::INVESTMENT_DIFFICULTY, investment_difficulty),
            (layer_ids::AREAS_OF_INTEREST, areas_of_interest),
            (layer_ids::DISTANCE_TO_RIVER, distance_to_river),
            (layer_ids::DISTANCE_TO_WORSHIP, distance_to_worship),
            (layer_ids::DISTANCE_TO_LOCAL_ROAD, distance_to_local_road),
        ]
    }

    /// Land cover plus normalized layers, ready to simulate.
    pub fn build_store(&self, policy: DegeneratePolicy) -> urban_growth::error::Result<GridStore> {
        let mut layers = LayerRegistry::new(self.shape);
        for (id, raw) in self.raw_layers() {
            layers.register_normalized(id, &raw, policy)?;
        }
        GridStore::new(self.land_cover(), layers)
    }

    /// Georeference placing the grid at the origin with unit cells.
    pub fn georeference(&self) -> GeoReference {
        GeoReference {
            lower_left: DVec2::ZERO,
            cell_size: 1.0,
            no_data: None,
            projection: None,
        }
    }
}
