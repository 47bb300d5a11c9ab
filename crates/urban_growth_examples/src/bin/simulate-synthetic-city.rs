use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use urban_growth::prelude::*;
use urban_growth_examples::{
    init_tracing, load_config, render_land_cover_to_png, render_layer_to_png, RenderConfig,
    SyntheticCity,
};

/// Grow a procedurally generated city and render the land cover before and after.
#[derive(Parser)]
#[command(name = "simulate-synthetic-city")]
struct Args {
    /// Grid rows and columns.
    #[arg(long, default_value_t = 128, value_parser = clap::value_parser!(u32).range(16..=4096))]
    size: u32,
    /// Seed for the generated city.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// RON file with a run configuration; defaults to the calibrated ten-year run.
    #[arg(long, env = "URBAN_GROWTH_CONFIG")]
    config: Option<PathBuf>,
    /// Overrides the configured number of steps.
    #[arg(long)]
    steps: Option<u32>,
    /// Derive densities from the evolving grid instead of the initial one.
    #[arg(long)]
    dynamic_density: bool,
    /// Directory for the rendered images and the exported grid.
    #[arg(long, default_value = "synthetic-city")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(steps) = args.steps {
        config = config.with_steps(steps);
    }
    if args.dynamic_density {
        config = config.with_density_mode(DensityMode::Dynamic);
    }

    let size = args.size as usize;
    let city = SyntheticCity::new(size, size, args.seed);
    let store = city.build_store(DegeneratePolicy::Zero)?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let render = RenderConfig::default().with_cell_pixels(4);
    render_land_cover_to_png(store.initial(), &render, args.out_dir.join("initial.png"))?;
    if let Some(layer) = store.layers().get(layer_ids::DISTANCE_TO_CENTER) {
        render_layer_to_png(layer, 2, args.out_dir.join("distance_to_center.png"))?;
    }

    let mut sink = FnSink::new(|event| match event {
        SimulationEvent::UnderAllocation {
            step,
            category,
            requested,
            assigned,
        } => println!("  step {step}: {category:?} short by {}", requested - assigned),
        SimulationEvent::StepFinished { stats } => println!(
            "{}: population {:.0}, planned +{}, unplanned +{}, moved {}",
            stats.year,
            stats.population,
            stats.planned_assigned,
            stats.unplanned_assigned,
            stats.moved_pixels
        ),
        _ => {}
    });
    let output = run_simulation(config, store, Some(&mut sink))?;

    render_land_cover_to_png(&output.land_cover, &render, args.out_dir.join("final.png"))?;
    let grid_path = args.out_dir.join("final.asc");
    AsciiGrid::new().write(&output.land_cover.to_codes(), &city.georeference(), &grid_path)?;

    let report = &output.report;
    println!(
        "planned {} -> {} ({:+}), unplanned {} -> {} ({:+}), shortfall {}",
        report.initial_counts.planned,
        report.final_counts.planned,
        report.growth(LandCover::Planned),
        report.initial_counts.unplanned,
        report.final_counts.unplanned,
        report.growth(LandCover::Unplanned),
        report.total_shortfall()
    );
    Ok(())
}
