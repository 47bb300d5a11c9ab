use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use urban_growth::prelude::*;
use urban_growth_examples::{
    init_tracing, load_config, render_land_cover_to_png, LayerManifest, RenderConfig,
};

/// Run the model on georeferenced ESRI ASCII grids listed in a RON manifest.
#[derive(Parser)]
#[command(name = "simulate-from-ascii-grids")]
struct Args {
    /// RON manifest naming the land-cover grid and the suitability layers.
    manifest: PathBuf,
    /// RON file with a run configuration; defaults to the calibrated ten-year run.
    #[arg(long, env = "URBAN_GROWTH_CONFIG")]
    config: Option<PathBuf>,
    /// Value given to layers with no spread.
    #[arg(long, value_enum, default_value_t = Degenerate::Zero)]
    degenerate: Degenerate,
    /// Where to write the simulated land cover.
    #[arg(long, default_value = "simulated_land_cover.asc")]
    output: PathBuf,
    /// Also render the simulated land cover to this PNG.
    #[arg(long)]
    png: Option<PathBuf>,
    /// Class the urbanized cells get in the class-change histogram.
    #[arg(long, default_value_t = 0)]
    urban_class: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Degenerate {
    Zero,
    One,
}

impl From<Degenerate> for DegeneratePolicy {
    fn from(value: Degenerate) -> Self {
        match value {
            Degenerate::Zero => DegeneratePolicy::Zero,
            Degenerate::One => DegeneratePolicy::One,
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let policy = DegeneratePolicy::from(args.degenerate);
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => SimulationConfig::default(),
    };

    let reader = AsciiGrid::new();
    let manifest = LayerManifest::load(&args.manifest)?;
    let (store, georef) = manifest.load_store(&reader, policy)?;
    let reference = manifest.load_reference_classes(&reader)?;

    let simulation = Simulation::try_new(config, store)?;
    let output = simulation.run()?;

    for stats in &output.report.steps {
        println!(
            "{}: population {:.0} | unplanned pixels moved {} | unplanned population moved {:.0}",
            stats.year,
            stats.population,
            stats.cumulative_moved_pixels,
            stats.cumulative_moved_population
        );
    }

    AsciiGrid::new().write(&output.land_cover.to_codes(), &georef, &args.output)?;
    println!("wrote {}", args.output.display());
    if let Some(png) = &args.png {
        render_land_cover_to_png(&output.land_cover, &RenderConfig::default(), png)?;
    }

    if let Some(reference) = reference {
        println!("class  before  after  lost%");
        for change in class_change(&reference, &output.land_cover, args.urban_class)? {
            let lost = change
                .percent_lost
                .map_or_else(|| "-".to_string(), |p| format!("{p}"));
            println!(
                "{:>5}  {:>6}  {:>5}  {:>5}",
                change.class, change.before, change.after, lost
            );
        }
    }
    Ok(())
}
