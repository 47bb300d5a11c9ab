//! Categorical land-cover grid.
//!
//! Codes: `0` no data, `1` planned settlement, `2` unplanned settlement and `5` expansion
//! area (undeveloped land). The allocator only ever writes `Planned` and `Unplanned`;
//! `Expansion` cells are consumed by growth but never produced.
use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::raster::Raster;
use super::shape::GridShape;

/// Land-cover category of a single cell.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LandCover {
    #[default]
    NoData,
    Planned,
    Unplanned,
    Expansion,
}

impl LandCover {
    pub const ALL: [LandCover; 4] = [
        LandCover::NoData,
        LandCover::Planned,
        LandCover::Unplanned,
        LandCover::Expansion,
    ];

    /// Raster code for this category.
    pub const fn code(self) -> i64 {
        match self {
            LandCover::NoData => 0,
            LandCover::Planned => 1,
            LandCover::Unplanned => 2,
            LandCover::Expansion => 5,
        }
    }

    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(LandCover::NoData),
            1 => Some(LandCover::Planned),
            2 => Some(LandCover::Unplanned),
            5 => Some(LandCover::Expansion),
            _ => None,
        }
    }

    /// Whether growth may ever be allocated onto this cell.
    pub const fn is_data(self) -> bool {
        !matches!(self, LandCover::NoData)
    }
}

/// Pixel counts per category.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub no_data: usize,
    pub planned: usize,
    pub unplanned: usize,
    pub expansion: usize,
}

impl CategoryCounts {
    pub fn get(&self, category: LandCover) -> usize {
        match category {
            LandCover::NoData => self.no_data,
            LandCover::Planned => self.planned,
            LandCover::Unplanned => self.unplanned,
            LandCover::Expansion => self.expansion,
        }
    }

    pub fn total(&self) -> usize {
        self.no_data + self.planned + self.unplanned + self.expansion
    }

    fn bump(&mut self, category: LandCover) {
        match category {
            LandCover::NoData => self.no_data += 1,
            LandCover::Planned => self.planned += 1,
            LandCover::Unplanned => self.unplanned += 1,
            LandCover::Expansion => self.expansion += 1,
        }
    }
}

/// The evolving land-cover state of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct LandCoverGrid {
    cells: Raster<LandCover>,
}

impl LandCoverGrid {
    pub fn new(cells: Raster<LandCover>) -> Self {
        Self { cells }
    }

    /// Build a grid from integer codes, rejecting anything outside `{0, 1, 2, 5}`.
    pub fn from_codes(shape: GridShape, codes: &[i64]) -> Result<Self> {
        if codes.len() != shape.len() {
            return Err(Error::InvalidConfig(format!(
                "land cover has {} cells, shape {} needs {}",
                codes.len(),
                shape,
                shape.len()
            )));
        }
        let mut cells = Vec::with_capacity(codes.len());
        for (i, &code) in codes.iter().enumerate() {
            let Some(category) = LandCover::from_code(code) else {
                let (row, col) = shape.coords(i);
                return Err(Error::InvalidCategory {
                    value: code,
                    row,
                    col,
                });
            };
            cells.push(category);
        }
        Ok(Self {
            cells: Raster::from_vec(shape, cells)?,
        })
    }

    /// Build a grid from a real-valued raster as produced by a raster reader.
    ///
    /// Values must be integral codes; fractional or non-finite values are invalid.
    pub fn from_raster(raster: &Raster<f64>) -> Result<Self> {
        let shape = raster.shape();
        let mut codes = Vec::with_capacity(raster.len());
        for (i, &v) in raster.as_slice().iter().enumerate() {
            if !v.is_finite() || v.fract() != 0.0 {
                let (row, col) = shape.coords(i);
                return Err(Error::InvalidCategory {
                    value: if v.is_finite() { v.trunc() as i64 } else { i64::MIN },
                    row,
                    col,
                });
            }
            codes.push(v as i64);
        }
        Self::from_codes(shape, &codes)
    }

    pub fn shape(&self) -> GridShape {
        self.cells.shape()
    }

    pub fn cells(&self) -> &Raster<LandCover> {
        &self.cells
    }

    pub fn as_slice(&self) -> &[LandCover] {
        self.cells.as_slice()
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [LandCover] {
        self.cells.as_mut_slice()
    }

    pub fn at(&self, row: usize, col: usize) -> LandCover {
        self.cells.at(row, col)
    }

    pub fn count(&self, category: LandCover) -> usize {
        self.cells.count(|c| *c == category)
    }

    pub fn counts(&self) -> CategoryCounts {
        let mut counts = CategoryCounts::default();
        for &c in self.cells.as_slice() {
            counts.bump(c);
        }
        counts
    }

    /// Boolean mask of the cells holding `category`.
    pub fn mask(&self, category: LandCover) -> Raster<bool> {
        self.cells.map(|c| *c == category)
    }

    /// Integer codes as a real-valued raster, ready for a raster writer.
    pub fn to_codes(&self) -> Raster<f64> {
        self.cells.map(|c| c.code() as f64)
    }
}
