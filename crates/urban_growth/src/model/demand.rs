//! Population-driven pixel demand.
//!
//! The population grows linearly by `initial * growth_per_step` each step and is split
//! between planned and unplanned settlement by fixed shares. Each category converts its
//! share of the growth into pixels through its density (people per pixel):
//!
//! ```text
//! density = population * share / pixel_count
//! pixels  = round(extra_population * share / density)
//! ```
//!
//! With [`DensityMode::Initial`] the densities use the initial population and the
//! step-0 pixel counts, so they are identical every step. [`DensityMode::Dynamic`] uses
//! the previous step's population and counts instead.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::{CategoryCounts, LandCover};

/// Rounding applied to fractional pixel demand.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoundingRule {
    /// Round half to even (`2.5 -> 2`, `3.5 -> 4`).
    #[default]
    HalfEven,
    /// Round half away from zero (`2.5 -> 3`).
    HalfAwayFromZero,
}

impl RoundingRule {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            RoundingRule::HalfEven => value.round_ties_even(),
            RoundingRule::HalfAwayFromZero => value.round(),
        }
    }
}

/// Which population and pixel counts the densities are derived from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DensityMode {
    /// Initial population over step-0 counts; constant for the whole run.
    #[default]
    Initial,
    /// Previous step's population over the previous step's counts.
    Dynamic,
}

/// What to do when a category has no pixels to derive a density from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ZeroDensityPolicy {
    /// Abort the run with [`Error::ZeroDensity`].
    #[default]
    Fail,
    /// Request no new pixels for the category.
    HoldConstant,
    /// Use this many people per pixel instead.
    FixedDensity(f64),
}

/// Population size, split and growth.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PopulationModel {
    pub initial_population: f64,
    pub planned_share: f64,
    pub unplanned_share: f64,
    /// Fraction of the initial population added every step.
    pub growth_per_step: f64,
}

impl Default for PopulationModel {
    fn default() -> Self {
        Self {
            initial_population: 250_000.0,
            planned_share: 0.45,
            unplanned_share: 0.55,
            growth_per_step: 0.1,
        }
    }
}

impl PopulationModel {
    pub fn new(initial_population: f64) -> Self {
        Self {
            initial_population,
            ..Default::default()
        }
    }

    /// Sets the planned share; the unplanned share becomes its complement.
    pub fn with_planned_share(mut self, planned_share: f64) -> Self {
        self.planned_share = planned_share;
        self.unplanned_share = 1.0 - planned_share;
        self
    }

    pub fn with_growth_per_step(mut self, growth_per_step: f64) -> Self {
        self.growth_per_step = growth_per_step;
        self
    }

    /// People added every step.
    pub fn extra_population(&self) -> f64 {
        self.initial_population * self.growth_per_step
    }

    /// Total population after `step` steps.
    pub fn population_at(&self, step: u32) -> f64 {
        self.initial_population + self.extra_population() * step as f64
    }

    pub fn share(&self, category: LandCover) -> f64 {
        match category {
            LandCover::Planned => self.planned_share,
            LandCover::Unplanned => self.unplanned_share,
            _ => 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.initial_population.is_finite() || self.initial_population <= 0.0 {
            return Err(Error::InvalidConfig(
                "initial_population must be finite and > 0".into(),
            ));
        }
        for (name, share) in [
            ("planned_share", self.planned_share),
            ("unplanned_share", self.unplanned_share),
        ] {
            if !(0.0..=1.0).contains(&share) {
                return Err(Error::InvalidConfig(format!("{name} must be in [0, 1]")));
            }
        }
        if (self.planned_share + self.unplanned_share - 1.0).abs() > 1e-9 {
            return Err(Error::InvalidConfig(
                "planned_share and unplanned_share must sum to 1".into(),
            ));
        }
        if !self.growth_per_step.is_finite() || self.growth_per_step < 0.0 {
            return Err(Error::InvalidConfig(
                "growth_per_step must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }
}

/// Pixel demand of one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Demand {
    pub step: u32,
    pub extra_population: f64,
    /// People per planned pixel, `None` when held constant for lack of pixels.
    pub planned_density: Option<f64>,
    pub unplanned_density: Option<f64>,
    /// New planned pixels from growth.
    pub planned_pixels: usize,
    /// New unplanned pixels from growth, before displacement.
    pub unplanned_pixels: usize,
}

impl Demand {
    /// Unplanned pixels to allocate once `displaced` unplanned cells were redeveloped.
    pub fn unplanned_with_displacement(&self, displaced: usize) -> Result<usize> {
        self.unplanned_pixels
            .checked_add(displaced)
            .ok_or(Error::InvalidDemand {
                step: self.step,
                category: LandCover::Unplanned,
                value: self.unplanned_pixels as f64 + displaced as f64,
            })
    }

    /// Population represented by `pixels` unplanned pixels.
    pub fn unplanned_population(&self, pixels: u64) -> f64 {
        self.unplanned_density.unwrap_or(0.0) * pixels as f64
    }
}

/// Converts population growth into per-category pixel demand.
#[derive(Clone, Debug)]
pub struct DemandCalculator<'a> {
    pub model: &'a PopulationModel,
    pub rounding: RoundingRule,
    pub zero_density: ZeroDensityPolicy,
}

impl<'a> DemandCalculator<'a> {
    pub fn new(
        model: &'a PopulationModel,
        rounding: RoundingRule,
        zero_density: ZeroDensityPolicy,
    ) -> Self {
        Self {
            model,
            rounding,
            zero_density,
        }
    }

    /// People per pixel of `category`, given the population basis and pixel counts.
    pub fn density(
        &self,
        category: LandCover,
        population: f64,
        counts: &CategoryCounts,
    ) -> Result<Option<f64>> {
        self.density_at(None, category, population, counts)
    }

    fn density_at(
        &self,
        step: Option<u32>,
        category: LandCover,
        population: f64,
        counts: &CategoryCounts,
    ) -> Result<Option<f64>> {
        let pixels = counts.get(category);
        if pixels == 0 {
            return match self.zero_density {
                ZeroDensityPolicy::Fail => Err(Error::ZeroDensity { category, step }),
                ZeroDensityPolicy::HoldConstant => Ok(None),
                ZeroDensityPolicy::FixedDensity(d) => Ok(Some(d)),
            };
        }
        Ok(Some(population * self.model.share(category) / pixels as f64))
    }

    /// Demand for `step` from the population basis and the counts densities derive from.
    pub fn compute(&self, step: u32, population: f64, counts: &CategoryCounts) -> Result<Demand> {
        let extra_population = self.model.extra_population();
        let planned_density =
            self.density_at(Some(step), LandCover::Planned, population, counts)?;
        let unplanned_density =
            self.density_at(Some(step), LandCover::Unplanned, population, counts)?;

        Ok(Demand {
            step,
            extra_population,
            planned_density,
            unplanned_density,
            planned_pixels: self.pixels(step, LandCover::Planned, planned_density)?,
            unplanned_pixels: self.pixels(step, LandCover::Unplanned, unplanned_density)?,
        })
    }

    fn pixels(&self, step: u32, category: LandCover, density: Option<f64>) -> Result<usize> {
        let Some(density) = density else {
            return Ok(0);
        };
        let people = self.model.extra_population() * self.model.share(category);
        if people == 0.0 {
            return Ok(0);
        }
        let value = self.rounding.apply(people / density);
        // `usize::MAX as f64` rounds up to 2^64, which no usize can hold.
        if !value.is_finite() || value < 0.0 || value >= usize::MAX as f64 {
            return Err(Error::InvalidDemand {
                step,
                category,
                value,
            });
        }
        Ok(value as usize)
    }
}
