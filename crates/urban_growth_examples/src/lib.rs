#![forbid(unsafe_code)]

mod inputs;
mod rendering;
mod synthetic;

pub use inputs::{load_config, LayerManifest};
pub use rendering::{init_tracing, render_land_cover_to_png, render_layer_to_png, RenderConfig};
pub use synthetic::SyntheticCity;
