//! Utility fields: weighted linear combinations of suitability layers.
//!
//! `utility = scale * (sum_i w_i * layer_i + w_nh * neighborhood)`. Terms are summed in
//! the order they are listed so the field is bit-for-bit reproducible. Distance-like and
//! unfavorable factors carry negative weights. Only the unplanned utility has a
//! neighborhood term by default; it is recomputed every step from the previous grid.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::{LayerId, LayerRegistry, Raster};

/// Well-known suitability layer identifiers used by the default weights.
pub mod layer_ids {
    pub const SLOPE: &str = "slope";
    pub const DISTANCE_TO_CENTER: &str = "distance_to_center";
    pub const DISTANCE_TO_PRIMARY_ROAD: &str = "distance_to_primary_road";
    pub const INFRASTRUCTURE_SUITABILITY: &str = "infrastructure_suitability";
    pub const INVESTMENT_DIFFICULTY: &str = "investment_difficulty";
    pub const AREAS_OF_INTEREST: &str = "areas_of_interest";
    pub const DISTANCE_TO_RIVER: &str = "distance_to_river";
    pub const DISTANCE_TO_WORSHIP: &str = "distance_to_worship";
    pub const DISTANCE_TO_LOCAL_ROAD: &str = "distance_to_local_road";
}

/// Multiplier that spreads utilities apart for ranking.
pub const DEFAULT_UTILITY_SCALE: f64 = 1000.0;

/// One signed term of a utility function.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedLayer {
    pub layer: LayerId,
    pub weight: f64,
}

impl WeightedLayer {
    pub fn new(layer: impl Into<LayerId>, weight: f64) -> Self {
        Self {
            layer: layer.into(),
            weight,
        }
    }
}

/// Named, overridable weights of a utility function.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct UtilityWeights {
    /// Layer terms, summed in order.
    pub terms: Vec<WeightedLayer>,
    /// Weight of the neighborhood score, if the function uses one.
    pub neighborhood: Option<f64>,
    /// Constant factor applied to the weighted sum.
    pub scale: f64,
}

impl Default for UtilityWeights {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            neighborhood: None,
            scale: DEFAULT_UTILITY_SCALE,
        }
    }
}

impl UtilityWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calibrated weights for planned settlement.
    pub fn planned_default() -> Self {
        use layer_ids::*;
        Self::new()
            .with_term(SLOPE, -0.144)
            .with_term(DISTANCE_TO_CENTER, -0.214)
            .with_term(DISTANCE_TO_PRIMARY_ROAD, -0.156)
            .with_term(INFRASTRUCTURE_SUITABILITY, -0.244)
            .with_term(INVESTMENT_DIFFICULTY, -0.242)
    }

    /// Calibrated weights for unplanned settlement, including the neighborhood term.
    pub fn unplanned_default() -> Self {
        use layer_ids::*;
        Self::new()
            .with_term(AREAS_OF_INTEREST, 0.24)
            .with_term(DISTANCE_TO_RIVER, -0.152)
            .with_term(DISTANCE_TO_WORSHIP, -0.128)
            .with_term(DISTANCE_TO_LOCAL_ROAD, -0.244)
            .with_neighborhood(0.236)
    }

    /// Append a term, or overwrite the weight if `layer` is already present.
    pub fn with_term(mut self, layer: impl Into<LayerId>, weight: f64) -> Self {
        self.set_weight(layer, weight);
        self
    }

    pub fn with_neighborhood(mut self, weight: f64) -> Self {
        self.neighborhood = Some(weight);
        self
    }

    pub fn without_neighborhood(mut self) -> Self {
        self.neighborhood = None;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Override the weight of `layer`, appending a new term if it is not listed.
    pub fn set_weight(&mut self, layer: impl Into<LayerId>, weight: f64) {
        let layer = layer.into();
        match self.terms.iter_mut().find(|t| t.layer == layer) {
            Some(term) => term.weight = weight,
            None => self.terms.push(WeightedLayer { layer, weight }),
        }
    }

    pub fn weight(&self, layer: &str) -> Option<f64> {
        self.terms
            .iter()
            .find(|t| t.layer == layer)
            .map(|t| t.weight)
    }

    pub fn layer_ids(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.layer.as_str())
    }

    pub fn uses_neighborhood(&self) -> bool {
        self.neighborhood.is_some()
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "{name} utility scale must be finite and > 0"
            )));
        }
        for (i, term) in self.terms.iter().enumerate() {
            if !term.weight.is_finite() {
                return Err(Error::InvalidConfig(format!(
                    "{name} weight for '{}' must be finite",
                    term.layer
                )));
            }
            if self.terms[..i].iter().any(|t| t.layer == term.layer) {
                return Err(Error::InvalidConfig(format!(
                    "{name} utility lists layer '{}' twice",
                    term.layer
                )));
            }
        }
        if let Some(w) = self.neighborhood {
            if !w.is_finite() {
                return Err(Error::InvalidConfig(format!(
                    "{name} neighborhood weight must be finite"
                )));
            }
        }
        Ok(())
    }

    /// Fail with [`Error::MissingLayer`] if a term references an unregistered layer.
    pub fn ensure_layers(&self, layers: &LayerRegistry) -> Result<()> {
        for id in self.layer_ids() {
            layers.require(id)?;
        }
        Ok(())
    }
}

/// Evaluate a utility field over the whole grid.
///
/// `neighborhood` is required when the weights carry a neighborhood term and ignored
/// otherwise. Every input must have the registry's shape.
pub fn compute_utility(
    weights: &UtilityWeights,
    layers: &LayerRegistry,
    neighborhood: Option<&Raster<f64>>,
) -> Result<Raster<f64>> {
    let shape = layers.shape();
    let mut field: Raster<f64> = Raster::new(shape);

    for term in &weights.terms {
        let layer = layers.require(&term.layer)?;
        layer.ensure_shape(&term.layer, shape)?;
        for (acc, v) in field.as_mut_slice().iter_mut().zip(layer.as_slice()) {
            *acc += v * term.weight;
        }
    }

    if let Some(w) = weights.neighborhood {
        let nh = neighborhood.ok_or_else(|| {
            Error::InvalidConfig("utility has a neighborhood weight but no score was given".into())
        })?;
        nh.ensure_shape("neighborhood", shape)?;
        for (acc, v) in field.as_mut_slice().iter_mut().zip(nh.as_slice()) {
            *acc += v * w;
        }
    }

    for v in field.as_mut_slice() {
        *v *= weights.scale;
    }
    Ok(field)
}
