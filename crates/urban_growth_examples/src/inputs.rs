use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use urban_growth::prelude::*;

/// Reads a RON-encoded [`SimulationConfig`]. Missing fields keep their defaults.
pub fn load_config(path: &Path) -> anyhow::Result<SimulationConfig> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: SimulationConfig =
        ron::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Input rasters of a run, as listed in a RON manifest.
///
/// ```ron
/// (
///     land_cover: "land_cover.asc",
///     layers: {
///         "slope": "slope.asc",
///         "distance_to_center": "dist_center.asc",
///     },
///     raw_layers: {
///         "areas_of_interest": "aoi.asc",
///     },
/// )
/// ```
///
/// Relative paths resolve against the manifest's directory.
#[derive(Clone, Debug, Deserialize)]
pub struct LayerManifest {
    pub land_cover: PathBuf,
    /// Layers that are min-max normalized on load.
    pub layers: BTreeMap<String, PathBuf>,
    /// Layers already in `[0, 1]`, registered as read.
    #[serde(default)]
    pub raw_layers: BTreeMap<String, PathBuf>,
    /// Optional reference classification for the before/after class histogram.
    #[serde(default)]
    pub reference_classes: Option<PathBuf>,
}

impl LayerManifest {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let mut manifest: LayerManifest =
            ron::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        if let Some(base) = path.parent() {
            manifest.resolve(base);
        }
        Ok(manifest)
    }

    fn resolve(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.land_cover);
        self.layers.values_mut().for_each(join);
        self.raw_layers.values_mut().for_each(join);
        if let Some(p) = self.reference_classes.as_mut() {
            join(p);
        }
    }

    /// Reads every input, normalizes the suitability layers and builds the store.
    ///
    /// Returns the georeference of the land-cover grid for exporting results.
    pub fn load_store(
        &self,
        reader: &impl RasterReader,
        policy: DegeneratePolicy,
    ) -> anyhow::Result<(GridStore, GeoReference)> {
        let land = reader
            .read(&self.land_cover)
            .with_context(|| format!("land cover {}", self.land_cover.display()))?;
        let georef = land.georef.clone();
        let land_cover = LandCoverGrid::from_raster(&land.fill_no_data(0.0).raster)?;

        let mut layers = LayerRegistry::new(land_cover.shape());
        for (id, path) in &self.layers {
            let grid = reader
                .read(path)
                .with_context(|| format!("layer '{id}' from {}", path.display()))?;
            layers.register_normalized(id.as_str(), &grid.raster, policy)?;
        }
        for (id, path) in &self.raw_layers {
            let grid = reader
                .read(path)
                .with_context(|| format!("layer '{id}' from {}", path.display()))?;
            layers.register(id.as_str(), grid.raster)?;
        }
        Ok((GridStore::new(land_cover, layers)?, georef))
    }

    /// Reads the reference classification, if the manifest names one.
    pub fn load_reference_classes(
        &self,
        reader: &impl RasterReader,
    ) -> anyhow::Result<Option<Raster<i64>>> {
        let Some(path) = &self.reference_classes else {
            return Ok(None);
        };
        let grid = reader
            .read(path)
            .with_context(|| format!("reference classes {}", path.display()))?;
        // No-data cells form their own class.
        Ok(Some(
            grid.raster
                .map(|v| if v.is_nan() { -1 } else { v.round() as i64 }),
        ))
    }
}
