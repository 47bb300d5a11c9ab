//! Neighborhood density of a category mask.
//!
//! For each interior cell the score is the mean of its eight neighbors in a 3x3 window
//! (center excluded). The window sums are computed separably: horizontal 3-cell sums per
//! row, then three of those stacked vertically.
//!
//! Border cells are not computed; they copy the nearest interior line. Rows are copied
//! first (`row 0 <- row 1`, `last <- last - 1`), then columns, so corners take the value
//! of their diagonal interior neighbor. Grids with fewer than three rows or columns have
//! no interior and score zero everywhere.
use crate::grid::Raster;

/// Mean of the 8-neighborhood of every cell of `mask`, with edge replication.
pub fn neighborhood_density(mask: &Raster<bool>) -> Raster<f64> {
    let shape = mask.shape();
    let (rows, cols) = (shape.rows, shape.cols);
    let mut out: Raster<f64> = Raster::new(shape);
    if rows < 3 || cols < 3 {
        return out;
    }

    let cells = mask.as_slice();
    let value = |i: usize| if cells[i] { 1.0 } else { 0.0 };

    let mut row_sums = vec![0.0f64; shape.len()];
    for r in 0..rows {
        let base = r * cols;
        for c in 1..cols - 1 {
            let i = base + c;
            row_sums[i] = value(i - 1) + value(i) + value(i + 1);
        }
    }

    let data = out.as_mut_slice();
    for r in 1..rows - 1 {
        for c in 1..cols - 1 {
            let i = r * cols + c;
            let window = row_sums[i - cols] + row_sums[i] + row_sums[i + cols];
            data[i] = (window - value(i)) / 8.0;
        }
    }

    replicate_border(&mut out);
    out
}

/// Overwrite the outermost rows and columns with their adjacent interior line.
pub(crate) fn replicate_border(field: &mut Raster<f64>) {
    let shape = field.shape();
    let (rows, cols) = (shape.rows, shape.cols);
    if rows < 3 || cols < 3 {
        return;
    }
    let data = field.as_mut_slice();

    data.copy_within(cols..2 * cols, 0);
    data.copy_within((rows - 2) * cols..(rows - 1) * cols, (rows - 1) * cols);

    for r in 0..rows {
        let base = r * cols;
        data[base] = data[base + 1];
        data[base + cols - 1] = data[base + cols - 2];
    }
}
