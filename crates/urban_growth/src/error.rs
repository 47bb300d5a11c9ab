//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! structural input problems detected before a run (shape mismatch, invalid land-cover codes,
//! missing layers, invalid configuration), per-step numeric failures, raster parsing, IO,
//! and generic errors.
use thiserror::Error;

use crate::grid::{GridShape, LandCover};

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("layer '{layer}' has shape {found}, expected {expected}")]
    ShapeMismatch {
        layer: String,
        expected: GridShape,
        found: GridShape,
    },

    #[error("invalid land-cover code {value} at row {row}, col {col}")]
    InvalidCategory { value: i64, row: usize, col: usize },

    #[error("missing suitability layer '{id}'")]
    MissingLayer { id: String },

    #[error("population density for {category:?} is undefined: no pixels {}", density_origin(.step))]
    ZeroDensity {
        category: LandCover,
        /// Step whose demand failed, `None` when checked before the run.
        step: Option<u32>,
    },

    #[error("step {step}: demand for {category:?} is {value}, expected a finite non-negative value")]
    InvalidDemand {
        step: u32,
        category: LandCover,
        value: f64,
    },

    #[error("non-finite {} at row {row}, col {col}", utility_name(.category))]
    NonFiniteUtility {
        /// Category the utility was scored for, when known.
        category: Option<LandCover>,
        row: usize,
        col: usize,
    },

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

fn density_origin(step: &Option<u32>) -> String {
    match step {
        Some(step) => format!("at step {step}"),
        None => "at run start".to_string(),
    }
}

fn utility_name(category: &Option<LandCover>) -> String {
    match category {
        Some(category) => format!("{category:?} utility"),
        None => "utility".to_string(),
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_uses_other_variant() {
        let err: Error = String::from("boom").into();
        matches!(err, Error::Other(_))
            .then_some(())
            .expect("expected Other variant");
    }

    #[test]
    fn from_str_allocates_owned_message() {
        let err: Error = "issue".into();
        assert!(matches!(err, Error::Other(ref msg) if msg == "issue"));
    }

    #[test]
    fn shape_mismatch_names_layer_and_shapes() {
        let err = Error::ShapeMismatch {
            layer: "slope".into(),
            expected: GridShape::new(4, 4),
            found: GridShape::new(3, 4),
        };
        assert_eq!(err.to_string(), "layer 'slope' has shape 3x4, expected 4x4");
    }

    #[test]
    fn zero_density_names_the_failing_step() {
        let mid_run = Error::ZeroDensity {
            category: LandCover::Unplanned,
            step: Some(4),
        };
        assert_eq!(
            mid_run.to_string(),
            "population density for Unplanned is undefined: no pixels at step 4"
        );
        let upfront = Error::ZeroDensity {
            category: LandCover::Planned,
            step: None,
        };
        assert!(upfront.to_string().ends_with("no pixels at run start"));
    }
}
