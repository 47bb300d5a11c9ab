//! Run configuration.
//!
//! [`SimulationConfig`] collects every parameter of a run: step count, population
//! model, per-category utility weights and the numeric policies (rounding, density
//! basis, zero-density fallback). The default reproduces the calibrated ten-year run.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::LayerRegistry;
use crate::model::demand::{DensityMode, PopulationModel, RoundingRule, ZeroDensityPolicy};
use crate::model::utility::UtilityWeights;

/// Configuration for a simulation run.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Number of annual steps to simulate.
    pub steps: u32,
    /// Calendar year of the initial land cover; step `k` is labelled `start_year + k`.
    pub start_year: i32,
    pub population: PopulationModel,
    pub planned_weights: UtilityWeights,
    pub unplanned_weights: UtilityWeights,
    pub rounding: RoundingRule,
    pub density_mode: DensityMode,
    pub zero_density: ZeroDensityPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps: 10,
            start_year: 2023,
            population: PopulationModel::default(),
            planned_weights: UtilityWeights::planned_default(),
            unplanned_weights: UtilityWeights::unplanned_default(),
            rounding: RoundingRule::default(),
            density_mode: DensityMode::default(),
            zero_density: ZeroDensityPolicy::default(),
        }
    }
}

impl SimulationConfig {
    /// Creates a default configuration with the given population model.
    pub fn new(population: PopulationModel) -> Self {
        Self {
            population,
            ..Default::default()
        }
    }

    /// Sets the number of steps.
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the year of the initial land cover.
    pub fn with_start_year(mut self, start_year: i32) -> Self {
        self.start_year = start_year;
        self
    }

    /// Sets the planned utility weights.
    pub fn with_planned_weights(mut self, weights: UtilityWeights) -> Self {
        self.planned_weights = weights;
        self
    }

    /// Sets the unplanned utility weights.
    pub fn with_unplanned_weights(mut self, weights: UtilityWeights) -> Self {
        self.unplanned_weights = weights;
        self
    }

    /// Sets the rounding rule for pixel demand.
    pub fn with_rounding(mut self, rounding: RoundingRule) -> Self {
        self.rounding = rounding;
        self
    }

    /// Sets where densities are derived from.
    pub fn with_density_mode(mut self, density_mode: DensityMode) -> Self {
        self.density_mode = density_mode;
        self
    }

    /// Sets the fallback for categories without pixels.
    pub fn with_zero_density(mut self, zero_density: ZeroDensityPolicy) -> Self {
        self.zero_density = zero_density;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(Error::InvalidConfig("steps must be > 0".into()));
        }
        self.population.validate()?;
        self.planned_weights.validate("planned")?;
        self.unplanned_weights.validate("unplanned")?;
        if let ZeroDensityPolicy::FixedDensity(d) = self.zero_density {
            if !d.is_finite() || d <= 0.0 {
                return Err(Error::InvalidConfig(
                    "fixed fallback density must be finite and > 0".into(),
                ));
            }
        }
        Ok(())
    }

    /// Validates the configuration against the available layers.
    pub fn validate_layers(&self, layers: &LayerRegistry) -> Result<()> {
        self.validate()?;
        self.planned_weights.ensure_layers(layers)?;
        self.unplanned_weights.ensure_layers(layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridShape, Raster};
    use crate::model::utility::layer_ids;

    #[test]
    fn default_is_ten_years_from_2023() {
        let config = SimulationConfig::default();
        assert_eq!(config.steps, 10);
        assert_eq!(config.start_year, 2023);
        assert_eq!(config.rounding, RoundingRule::HalfEven);
        assert_eq!(config.density_mode, DensityMode::Initial);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_steps_and_bad_fallback() {
        assert!(SimulationConfig::default().with_steps(0).validate().is_err());
        assert!(SimulationConfig::default()
            .with_zero_density(ZeroDensityPolicy::FixedDensity(0.0))
            .validate()
            .is_err());
    }

    #[test]
    fn validate_layers_names_missing_layer() {
        let shape = GridShape::new(2, 2);
        let mut layers = LayerRegistry::new(shape);
        for id in SimulationConfig::default().planned_weights.layer_ids() {
            layers.register(id, Raster::filled(shape, 0.5)).unwrap();
        }
        let err = SimulationConfig::default()
            .validate_layers(&layers)
            .unwrap_err();
        assert!(
            matches!(err, Error::MissingLayer { ref id } if id == layer_ids::AREAS_OF_INTEREST)
        );
    }
}
