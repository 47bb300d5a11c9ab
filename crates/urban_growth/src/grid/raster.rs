//! Raster storage for per-cell values.
//!
//! A [`Raster`] is a row-major 2D buffer tagged with its [`GridShape`]. Scalar layers,
//! utility fields, neighborhood scores and boolean masks all use this container.
use crate::error::{Error, Result};

use super::shape::GridShape;

/// A row-major grid of values.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster<T> {
    shape: GridShape,
    data: Vec<T>,
}

impl<T: Clone> Raster<T> {
    /// Create a raster with every cell set to `value`.
    pub fn filled(shape: GridShape, value: T) -> Self {
        Self {
            shape,
            data: vec![value; shape.len()],
        }
    }
}

impl<T: Clone + Default> Raster<T> {
    /// Create a raster with every cell set to `T::default()`.
    pub fn new(shape: GridShape) -> Self {
        Self::filled(shape, T::default())
    }
}

impl<T> Raster<T> {
    /// Wrap an existing row-major buffer, checking its length against `shape`.
    pub fn from_vec(shape: GridShape, data: Vec<T>) -> Result<Self> {
        if data.len() != shape.len() {
            return Err(Error::InvalidConfig(format!(
                "raster buffer has {} cells, shape {} needs {}",
                data.len(),
                shape,
                shape.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Build a raster by evaluating `f(row, col)` for every cell in scan order.
    pub fn from_fn(shape: GridShape, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(shape.len());
        for row in 0..shape.rows {
            for col in 0..shape.cols {
                data.push(f(row, col));
            }
        }
        Self { shape, data }
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat row-major view of the values.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Get a reference to the value at `(row, col)`, or `None` if out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if !self.shape.contains(row, col) {
            return None;
        }
        self.data.get(self.shape.index(row, col))
    }

    /// Set the value at `(row, col)`. Out-of-bounds writes are ignored and return `false`.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> bool {
        if !self.shape.contains(row, col) {
            return false;
        }
        let i = self.shape.index(row, col);
        self.data[i] = value;
        true
    }

    /// Apply `f` to every cell, producing a raster of the same shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Raster<U> {
        Raster {
            shape: self.shape,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Number of cells for which `pred` holds.
    pub fn count(&self, mut pred: impl FnMut(&T) -> bool) -> usize {
        self.data.iter().filter(|v| pred(v)).count()
    }

    /// Fail with [`Error::ShapeMismatch`] unless this raster has `expected` shape.
    pub fn ensure_shape(&self, layer: &str, expected: GridShape) -> Result<()> {
        if self.shape != expected {
            return Err(Error::ShapeMismatch {
                layer: layer.to_string(),
                expected,
                found: self.shape,
            });
        }
        Ok(())
    }
}

impl<T: Copy> Raster<T> {
    /// Copy of the value at `(row, col)`.
    ///
    /// Panics if the cell is out of bounds.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> T {
        self.data[self.shape.index(row, col)]
    }
}

impl Raster<f64> {
    /// Smallest and largest value, ignoring NaN. `None` for an empty or all-NaN raster.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_initializes_with_default() {
        let raster: Raster<f64> = Raster::new(GridShape::new(2, 3));
        assert_eq!(raster.len(), 6);
        assert!(raster.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = Raster::from_vec(GridShape::new(2, 2), vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn get_returns_none_outside_bounds() {
        let raster = Raster::filled(GridShape::new(2, 2), 1u8);
        assert_eq!(raster.get(1, 1), Some(&1));
        assert_eq!(raster.get(2, 0), None);
    }

    #[test]
    fn from_fn_visits_cells_in_scan_order() {
        let raster = Raster::from_fn(GridShape::new(2, 3), |r, c| r * 10 + c);
        assert_eq!(raster.as_slice(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(raster.at(1, 2), 12);
    }

    #[test]
    fn ensure_shape_reports_layer() {
        let raster = Raster::filled(GridShape::new(3, 3), 0.0);
        let err = raster
            .ensure_shape("slope", GridShape::new(4, 4))
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { ref layer, .. } if layer == "slope"));
    }

    #[test]
    fn min_max_skips_nan() {
        let raster =
            Raster::from_vec(GridShape::new(1, 4), vec![f64::NAN, 3.0, -1.0, 2.0]).unwrap();
        assert_eq!(raster.min_max(), Some((-1.0, 3.0)));
    }
}
