//! Georeferenced raster input and output.
//!
//! [`RasterReader`] and [`RasterWriter`] are the seams the simulation uses to load
//! layers and export results. [`AsciiGrid`] implements both for the ESRI ASCII grid
//! format:
//!
//! ```text
//! ncols        4
//! nrows        3
//! xllcorner    500000.0
//! yllcorner    1280000.0
//! cellsize     30.0
//! NODATA_value -9999
//! 5 5 2 2
//! ...
//! ```
//!
//! Cells holding the declared no-data value are read as NaN. Written grids copy the
//! georeference of a reference grid and declare the writer's own no-data value.
//!
//! The coordinate system travels in a `.prj` sidecar next to the grid. It is read as
//! opaque WKT text when present and written back beside every output.
use std::fmt::Write as _;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use glam::DVec2;
use tracing::debug;

use crate::error::{Error, Result};
use crate::grid::{GridShape, Raster};

/// Where a grid sits in map coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoReference {
    /// Lower-left corner of the lower-left cell.
    pub lower_left: DVec2,
    /// Cell edge length in map units.
    pub cell_size: f64,
    /// Declared no-data value of the source file, if any.
    pub no_data: Option<f64>,
    /// Coordinate system as WKT, from the `.prj` sidecar.
    pub projection: Option<String>,
}

impl Default for GeoReference {
    fn default() -> Self {
        Self {
            lower_left: DVec2::ZERO,
            cell_size: 1.0,
            no_data: None,
            projection: None,
        }
    }
}

impl GeoReference {
    /// Map coordinates of the center of `(row, col)`; row 0 is the northernmost row.
    pub fn cell_center(&self, shape: GridShape, row: usize, col: usize) -> DVec2 {
        self.lower_left
            + DVec2::new(
                (col as f64 + 0.5) * self.cell_size,
                ((shape.rows - row) as f64 - 0.5) * self.cell_size,
            )
    }
}

/// A raster together with its georeference.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoRaster {
    pub raster: Raster<f64>,
    pub georef: GeoReference,
}

impl GeoRaster {
    pub fn shape(&self) -> GridShape {
        self.raster.shape()
    }

    /// Replace no-data (NaN) cells with `value`.
    pub fn fill_no_data(mut self, value: f64) -> Self {
        for v in self.raster.as_mut_slice() {
            if v.is_nan() {
                *v = value;
            }
        }
        self
    }
}

/// Loads a single-band raster from a path.
pub trait RasterReader {
    fn read(&self, path: &Path) -> Result<GeoRaster>;
}

/// Stores a single-band raster, preserving the georeference of `reference`.
pub trait RasterWriter {
    fn write(&self, raster: &Raster<f64>, reference: &GeoReference, path: &Path) -> Result<()>;
}

/// ESRI ASCII grid reader and writer.
#[derive(Clone, Copy, Debug)]
pub struct AsciiGrid {
    /// No-data value declared in written files; NaN cells are written as this value.
    pub write_no_data: f64,
}

impl Default for AsciiGrid {
    fn default() -> Self {
        Self {
            write_no_data: -1.0,
        }
    }
}

impl AsciiGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_write_no_data(mut self, value: f64) -> Self {
        self.write_no_data = value;
        self
    }

    /// Parse the textual contents of an ASCII grid.
    pub fn parse(&self, text: &str) -> Result<GeoRaster> {
        let mut ncols: Option<usize> = None;
        let mut nrows: Option<usize> = None;
        let mut xll: Option<(f64, bool)> = None;
        let mut yll: Option<(f64, bool)> = None;
        let mut cell_size: Option<f64> = None;
        let mut no_data: Option<f64> = None;
        let mut values: Vec<f64> = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let mut tokens = line.split_whitespace().peekable();
            let Some(first) = tokens.peek() else {
                continue;
            };
            if first.starts_with(|c: char| c.is_ascii_alphabetic()) && values.is_empty() {
                let key = first.to_ascii_lowercase();
                tokens.next();
                let raw = tokens.next().ok_or_else(|| Error::Parse {
                    line: line_no,
                    message: format!("header '{key}' has no value"),
                })?;
                let value = parse_number(raw, line_no)?;
                match key.as_str() {
                    "ncols" => ncols = Some(parse_count(value, &key, line_no)?),
                    "nrows" => nrows = Some(parse_count(value, &key, line_no)?),
                    "xllcorner" => xll = Some((value, true)),
                    "xllcenter" => xll = Some((value, false)),
                    "yllcorner" => yll = Some((value, true)),
                    "yllcenter" => yll = Some((value, false)),
                    "cellsize" => cell_size = Some(value),
                    "nodata_value" => no_data = Some(value),
                    _ => {
                        return Err(Error::Parse {
                            line: line_no,
                            message: format!("unknown header '{key}'"),
                        })
                    }
                }
                continue;
            }
            for token in tokens {
                values.push(parse_number(token, line_no)?);
            }
        }

        let missing = |name: &str| Error::Parse {
            line: 0,
            message: format!("missing header '{name}'"),
        };
        let shape = GridShape::new(
            nrows.ok_or_else(|| missing("nrows"))?,
            ncols.ok_or_else(|| missing("ncols"))?,
        );
        let cell_size = cell_size.ok_or_else(|| missing("cellsize"))?;
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(Error::Parse {
                line: 0,
                message: "cellsize must be > 0".into(),
            });
        }
        let (x, x_corner) = xll.ok_or_else(|| missing("xllcorner"))?;
        let (y, y_corner) = yll.ok_or_else(|| missing("yllcorner"))?;
        let half = cell_size / 2.0;
        let lower_left = DVec2::new(
            if x_corner { x } else { x - half },
            if y_corner { y } else { y - half },
        );

        if values.len() != shape.len() {
            return Err(Error::Parse {
                line: text.lines().count(),
                message: format!(
                    "expected {} values for a {} grid, found {}",
                    shape.len(),
                    shape,
                    values.len()
                ),
            });
        }
        if let Some(nd) = no_data {
            for v in values.iter_mut() {
                if *v == nd {
                    *v = f64::NAN;
                }
            }
        }

        Ok(GeoRaster {
            raster: Raster::from_vec(shape, values)?,
            georef: GeoReference {
                lower_left,
                cell_size,
                no_data,
                projection: None,
            },
        })
    }

    /// Render `raster` as ASCII grid text with the georeference of `reference`.
    pub fn render(&self, raster: &Raster<f64>, reference: &GeoReference) -> String {
        let shape = raster.shape();
        let mut out = String::with_capacity(64 + shape.len() * 4);
        // Writing into a String cannot fail.
        let _ = writeln!(out, "ncols {}", shape.cols);
        let _ = writeln!(out, "nrows {}", shape.rows);
        let _ = writeln!(out, "xllcorner {}", reference.lower_left.x);
        let _ = writeln!(out, "yllcorner {}", reference.lower_left.y);
        let _ = writeln!(out, "cellsize {}", reference.cell_size);
        let _ = writeln!(out, "NODATA_value {}", self.write_no_data);
        for row in raster.as_slice().chunks(shape.cols.max(1)) {
            let line: Vec<String> = row
                .iter()
                .map(|v| {
                    if v.is_nan() {
                        self.write_no_data.to_string()
                    } else {
                        v.to_string()
                    }
                })
                .collect();
            let _ = writeln!(out, "{}", line.join(" "));
        }
        out
    }
}

impl RasterReader for AsciiGrid {
    fn read(&self, path: &Path) -> Result<GeoRaster> {
        let text = fs::read_to_string(path)?;
        let mut grid = self.parse(&text)?;
        let prj = projection_path(path);
        if prj.is_file() {
            grid.georef.projection = Some(fs::read_to_string(&prj)?);
        }
        debug!("Read {} grid from '{}'.", grid.shape(), path.display());
        Ok(grid)
    }
}

impl RasterWriter for AsciiGrid {
    fn write(&self, raster: &Raster<f64>, reference: &GeoReference, path: &Path) -> Result<()> {
        let mut file = BufWriter::new(fs::File::create(path)?);
        file.write_all(self.render(raster, reference).as_bytes())?;
        file.flush()?;
        if let Some(wkt) = &reference.projection {
            fs::write(projection_path(path), wkt)?;
        }
        debug!("Wrote {} grid to '{}'.", raster.shape(), path.display());
        Ok(())
    }
}

fn projection_path(path: &Path) -> PathBuf {
    path.with_extension("prj")
}

fn parse_number(token: &str, line: usize) -> Result<f64> {
    token.parse::<f64>().map_err(|_| Error::Parse {
        line,
        message: format!("'{token}' is not a number"),
    })
}

fn parse_count(value: f64, key: &str, line: usize) -> Result<usize> {
    if value.fract() != 0.0 || value < 0.0 {
        return Err(Error::Parse {
            line,
            message: format!("'{key}' must be a non-negative integer"),
        });
    }
    Ok(value as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "ncols 3\nnrows 2\nxllcorner 100.0\nyllcorner 200.0\ncellsize 10\nNODATA_value -9999\n5 2 -9999\n1 1 5\n";

    #[test]
    fn parse_reads_header_and_values() {
        let grid = AsciiGrid::new().parse(SAMPLE).unwrap();
        assert_eq!(grid.shape(), GridShape::new(2, 3));
        assert_eq!(grid.georef.lower_left, DVec2::new(100.0, 200.0));
        assert_eq!(grid.georef.no_data, Some(-9999.0));
        assert_eq!(grid.raster.at(0, 0), 5.0);
        assert!(grid.raster.at(0, 2).is_nan());
        assert_eq!(grid.raster.at(1, 2), 5.0);
    }

    #[test]
    fn center_headers_shift_to_corner() {
        let text = "ncols 1\nnrows 1\nxllcenter 5\nyllcenter 5\ncellsize 10\n3\n";
        let grid = AsciiGrid::new().parse(text).unwrap();
        assert_eq!(grid.georef.lower_left, DVec2::ZERO);
        assert_eq!(
            grid.georef.cell_center(grid.shape(), 0, 0),
            DVec2::new(5.0, 5.0)
        );
    }

    #[test]
    fn parse_rejects_wrong_value_count() {
        let text = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n";
        let err = AsciiGrid::new().parse(text).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn parse_reports_bad_token_line() {
        let text = "ncols 2\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 x\n";
        let err = AsciiGrid::new().parse(text).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 6, .. }));
    }

    #[test]
    fn render_preserves_reference_and_declares_no_data() {
        let reader = AsciiGrid::new();
        let grid = reader.parse(SAMPLE).unwrap();
        let text = reader.render(&grid.raster, &grid.georef);
        assert!(text.contains("xllcorner 100"));
        assert!(text.contains("NODATA_value -1"));
        let back = reader.parse(&text).unwrap();
        assert_eq!(back.georef.lower_left, grid.georef.lower_left);
        assert!(back.raster.at(0, 2).is_nan());
        assert_eq!(back.raster.at(1, 0), 1.0);
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("urban_growth_{name}_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn projection_sidecar_follows_the_grid() {
        const WKT: &str = "PROJCS[\"WGS 84 / UTM zone 37N\",GEOGCS[\"WGS 84\"]]";
        let dir = scratch_dir("prj");
        let source = dir.join("landcover.asc");
        fs::write(&source, SAMPLE).unwrap();
        fs::write(dir.join("landcover.prj"), WKT).unwrap();

        let io = AsciiGrid::new();
        let grid = io.read(&source).unwrap();
        assert_eq!(grid.georef.projection.as_deref(), Some(WKT));

        let output = dir.join("simulated.asc");
        io.write(&grid.raster, &grid.georef, &output).unwrap();
        assert_eq!(fs::read_to_string(dir.join("simulated.prj")).unwrap(), WKT);
        let back = io.read(&output).unwrap();
        assert_eq!(back.georef.projection, grid.georef.projection);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_sidecar_leaves_projection_unset() {
        let dir = scratch_dir("no_prj");
        let source = dir.join("slope.asc");
        fs::write(&source, SAMPLE).unwrap();
        let io = AsciiGrid::new();
        let grid = io.read(&source).unwrap();
        assert_eq!(grid.georef.projection, None);

        io.write(&grid.raster, &grid.georef, &dir.join("out.asc")).unwrap();
        assert!(!dir.join("out.prj").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn fill_no_data_replaces_nan() {
        let grid = AsciiGrid::new().parse(SAMPLE).unwrap().fill_no_data(0.0);
        assert_eq!(grid.raster.at(0, 2), 0.0);
    }
}
