//! Min-max normalization of raw suitability inputs.
//!
//! `(v - min) / (max - min)` over the whole grid, computed once before a run. A layer
//! whose values are all equal has no spread; [`DegeneratePolicy`] fixes what it maps to
//! instead of dividing by zero.
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::raster::Raster;

/// Value assigned to every cell of a layer with `max == min`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DegeneratePolicy {
    #[default]
    Zero,
    One,
}

impl DegeneratePolicy {
    fn value(self) -> f64 {
        match self {
            DegeneratePolicy::Zero => 0.0,
            DegeneratePolicy::One => 1.0,
        }
    }
}

/// Rescale `raw` into `[0, 1]`. NaN cells stay NaN.
pub fn normalize(raw: &Raster<f64>, policy: DegeneratePolicy) -> Raster<f64> {
    let Some((min, max)) = raw.min_max() else {
        return raw.clone();
    };
    let span = max - min;
    if span == 0.0 {
        warn!(
            "Layer is constant ({}); normalizing to {} everywhere.",
            min,
            policy.value()
        );
        return raw.map(|v| if v.is_nan() { *v } else { policy.value() });
    }
    raw.map(|v| (v - min) / span)
}
