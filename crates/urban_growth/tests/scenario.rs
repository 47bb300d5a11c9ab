use urban_growth::model::layer_ids::*;
use urban_growth::prelude::*;

fn constant_layers(shape: GridShape, value: f64) -> LayerRegistry {
    let mut layers = LayerRegistry::new(shape);
    for id in [
        SLOPE,
        DISTANCE_TO_CENTER,
        DISTANCE_TO_PRIMARY_ROAD,
        INFRASTRUCTURE_SUITABILITY,
        INVESTMENT_DIFFICULTY,
        AREAS_OF_INTEREST,
        DISTANCE_TO_RIVER,
        DISTANCE_TO_WORSHIP,
        DISTANCE_TO_LOCAL_ROAD,
    ] {
        layers.register(id, Raster::filled(shape, value)).unwrap();
    }
    layers
}

/// 4x4 unplanned settlement with a no-data corner and flat suitability.
#[test]
fn flat_utility_plans_first_cells_in_scan_order() {
    let shape = GridShape::new(4, 4);
    let mut codes = vec![2; 16];
    codes[0] = 0;
    let land_cover = LandCoverGrid::from_codes(shape, &codes).unwrap();
    let store = GridStore::new(land_cover, constant_layers(shape, 0.5)).unwrap();

    // No planned pixels exist, so planned density needs a fallback.
    let config = SimulationConfig::new(PopulationModel::new(1000.0).with_planned_share(0.45))
        .with_steps(1)
        .with_zero_density(ZeroDensityPolicy::FixedDensity(15.0));

    let planned_utility =
        compute_utility(&config.planned_weights, store.layers(), None).unwrap();
    let first = planned_utility.as_slice()[1];
    assert!(planned_utility.as_slice().iter().all(|u| *u == first));

    let mut sink = VecSink::only(&[SimulationEventKind::UnderAllocation]);
    let outcome = run_step(&store, RunState::new(1000.0), &config, &mut sink).unwrap();

    assert_eq!(outcome.demand.planned_pixels, 3);
    let planned: Vec<usize> = (0..shape.len())
        .filter(|&i| outcome.land_cover.as_slice()[i] == LandCover::Planned)
        .collect();
    assert_eq!(planned, vec![1, 2, 3]);
    assert_eq!(outcome.land_cover.at(0, 0), LandCover::NoData);
    assert_eq!(outcome.land_cover.count(LandCover::Unplanned), 12);

    // Nothing is left for unplanned growth: all displaced demand goes unmet.
    assert_eq!(outcome.stats.moved_pixels, 3);
    assert_eq!(outcome.unplanned.assigned_count, 0);
    assert_eq!(
        outcome.unplanned.requested,
        outcome.demand.unplanned_pixels + 3
    );
    assert_eq!(sink.len(), 1);
}

#[test]
fn redeveloped_cells_are_added_to_unplanned_demand() {
    // Planned growth of 3 pixels lands on the three unplanned cells.
    let shape = GridShape::new(2, 4);
    let land_cover = LandCoverGrid::from_codes(shape, &[1, 2, 2, 2, 5, 5, 5, 5]).unwrap();
    let attract =
        Raster::from_vec(shape, vec![0.0, 1.0, 0.9, 0.8, 0.1, 0.2, 0.3, 0.4]).unwrap();
    let layers = LayerRegistry::new(shape)
        .with_layer("attract", attract)
        .unwrap();
    let store = GridStore::new(land_cover, layers).unwrap();

    let config = SimulationConfig::new(PopulationModel::new(1000.0).with_growth_per_step(3.0))
        .with_steps(1)
        .with_planned_weights(UtilityWeights::new().with_term("attract", 1.0))
        .with_unplanned_weights(UtilityWeights::new().with_term("attract", 1.0));

    let outcome = run_step(&store, RunState::new(1000.0), &config, &mut ()).unwrap();

    assert_eq!(outcome.demand.planned_pixels, 3);
    assert_eq!(outcome.stats.moved_pixels, 3);
    assert_eq!(outcome.demand.unplanned_pixels, 9);
    assert_eq!(outcome.unplanned.requested, 12);
    assert_eq!(outcome.unplanned.assigned_count, 4);
    assert_eq!(outcome.stats.unplanned_shortfall(), 8);
    assert_eq!(outcome.state.total_moved_pixels, 3);
    assert_eq!(outcome.land_cover.count(LandCover::Planned), 4);
    assert_eq!(outcome.land_cover.count(LandCover::Unplanned), 4);
}

#[test]
fn run_reports_years_and_histogram() {
    let shape = GridShape::new(3, 3);
    let land_cover = LandCoverGrid::from_codes(shape, &[1, 2, 5, 5, 5, 5, 5, 5, 0]).unwrap();
    let layers = LayerRegistry::new(shape)
        .with_layer("attract", Raster::from_fn(shape, |r, c| (r * 3 + c) as f64))
        .unwrap();
    let store = GridStore::new(land_cover, layers).unwrap();
    let config = SimulationConfig::new(PopulationModel::new(1000.0).with_growth_per_step(1.0))
        .with_steps(2)
        .with_start_year(2030)
        .with_planned_weights(UtilityWeights::new().with_term("attract", 1.0))
        .with_unplanned_weights(UtilityWeights::new().with_term("attract", -1.0));

    let mut sink = VecSink::new();
    let output = run_simulation(config, store, Some(&mut sink)).unwrap();

    let years: Vec<i32> = output.report.steps.iter().map(|s| s.year).collect();
    assert_eq!(years, vec![2031, 2032]);
    assert!(!output.report.cancelled);
    assert!(matches!(
        sink.as_slice().first(),
        Some(SimulationEvent::RunStarted { steps: 2, .. })
    ));
    assert!(matches!(
        sink.as_slice().last(),
        Some(SimulationEvent::RunFinished { .. })
    ));

    let reference = Raster::filled(shape, 7_i64);
    let change = class_change(&reference, &output.land_cover, 0).unwrap();
    let urban = output.land_cover.count(LandCover::Planned)
        + output.land_cover.count(LandCover::Unplanned);
    assert_eq!(change[0].class, 0);
    assert_eq!(change[0].after, urban);
    assert_eq!(change[1].before, 9);
    assert_eq!(change[1].after, 9 - urban);
}
