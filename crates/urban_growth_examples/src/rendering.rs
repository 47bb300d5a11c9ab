use std::collections::HashMap;
use std::path::Path;

use image::{Rgb, RgbImage};
use tracing_subscriber::EnvFilter;
use urban_growth::prelude::*;

/// Installs a formatting subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Colors and pixel size used when rendering land cover.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Image pixels per grid cell.
    pub cell_pixels: u32,
    pub colors: HashMap<LandCover, [u8; 3]>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let colors = HashMap::from([
            (LandCover::NoData, [20, 20, 20]),
            (LandCover::Planned, [220, 70, 60]),
            (LandCover::Unplanned, [240, 180, 60]),
            (LandCover::Expansion, [120, 170, 90]),
        ]);
        Self {
            cell_pixels: 4,
            colors,
        }
    }
}

impl RenderConfig {
    pub fn with_cell_pixels(mut self, cell_pixels: u32) -> Self {
        self.cell_pixels = cell_pixels.max(1);
        self
    }

    pub fn set_color(&mut self, category: LandCover, color: [u8; 3]) {
        self.colors.insert(category, color);
    }

    fn color(&self, category: LandCover) -> [u8; 3] {
        self.colors.get(&category).copied().unwrap_or([0, 0, 0])
    }
}

fn image_for(shape: GridShape, cell_pixels: u32) -> anyhow::Result<RgbImage> {
    let width = u32::try_from(shape.cols)? * cell_pixels;
    let height = u32::try_from(shape.rows)? * cell_pixels;
    Ok(RgbImage::new(width, height))
}

fn fill_cell(img: &mut RgbImage, row: usize, col: usize, cell_pixels: u32, color: [u8; 3]) {
    let x0 = col as u32 * cell_pixels;
    let y0 = row as u32 * cell_pixels;
    for y in y0..y0 + cell_pixels {
        for x in x0..x0 + cell_pixels {
            img.put_pixel(x, y, Rgb(color));
        }
    }
}

/// Writes one colored block per cell, row 0 at the top.
pub fn render_land_cover_to_png(
    grid: &LandCoverGrid,
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let shape = grid.shape();
    let mut img = image_for(shape, config.cell_pixels)?;
    for row in 0..shape.rows {
        for col in 0..shape.cols {
            fill_cell(
                &mut img,
                row,
                col,
                config.cell_pixels,
                config.color(grid.at(row, col)),
            );
        }
    }
    img.save(path.as_ref())?;
    tracing::info!("Wrote {}", path.as_ref().display());
    Ok(())
}

/// Grayscale rendering of a layer, stretched over its finite range. NaN renders red.
pub fn render_layer_to_png(
    layer: &Raster<f64>,
    cell_pixels: u32,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let shape = layer.shape();
    let cell_pixels = cell_pixels.max(1);
    let mut img = image_for(shape, cell_pixels)?;
    let (min, max) = layer.min_max().unwrap_or((0.0, 1.0));
    let span = if max > min { max - min } else { 1.0 };
    for row in 0..shape.rows {
        for col in 0..shape.cols {
            let v = layer.at(row, col);
            let color = if v.is_nan() {
                [200, 0, 0]
            } else {
                let g = (((v - min) / span).clamp(0.0, 1.0) * 255.0).round() as u8;
                [g, g, g]
            };
            fill_cell(&mut img, row, col, cell_pixels, color);
        }
    }
    img.save(path.as_ref())?;
    tracing::info!("Wrote {}", path.as_ref().display());
    Ok(())
}
