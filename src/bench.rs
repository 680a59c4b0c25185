//! ACDP Builder benchmark harness
//!
//! Builds a synthetic grid district and times the solver against it at a
//! few grid sizes, the way a storage-node simulator times proving rounds.
//!
//! Run with: cargo run --release --bin acdp-bench

use std::time::Instant;

use acdp_builder::config::{AcceptanceBand, OutputBaseNames, OutputDriver, PipelineConfig};
use acdp_builder::solver::solve_district;
use acdp_builder::types::{AcdpIdAllocator, District, Seed, Sector};
use geo::{Coord, LineString, MultiPolygon, Point, Polygon};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    init_tracing();

    info!("ACDP Builder Benchmark");
    info!("");

    for grid_side in [10usize, 20, 40] {
        run_one(grid_side);
    }
}

/// Build a `grid_side` x `grid_side` grid of unit-square sectors with one
/// household per sector, seed every fourth row/column intersection, and time
/// how long the district solver takes to partition the whole grid.
fn run_one(grid_side: usize) {
    let mut sectors = Vec::with_capacity(grid_side * grid_side);
    for row in 0..grid_side {
        for col in 0..grid_side {
            sectors.push(Sector {
                sector_code: format!("{row}-{col}"),
                district_code: "bench".to_string(),
                num_households: 10,
                num_registered: 10,
                geometry: square((col as f64, row as f64), (col as f64 + 1.0, row as f64 + 1.0)),
            });
        }
    }

    let mut seeds = Vec::new();
    let mut seed_id = 0u64;
    let mut row = 0;
    while row < grid_side {
        let mut col = 0;
        while col < grid_side {
            seeds.push(Seed {
                seed_id,
                district_code: "bench".to_string(),
                priority: seed_id as i64,
                point: Point::new(col as f64 + 0.5, row as f64 + 0.5),
            });
            seed_id += 1;
            col += 4;
        }
        row += 4;
    }

    let district = District {
        district_code: "bench".to_string(),
        geometry: square((0.0, 0.0), (grid_side as f64, grid_side as f64)),
    };

    let config = PipelineConfig {
        input_seeds: "unused".into(),
        input_sectors: "unused".into(),
        input_districts: "unused".into(),
        output_dir: "unused".into(),
        output_driver: OutputDriver::GeoJson,
        output_names: OutputBaseNames::default(),
        buffer_step: 1.0,
        limit_to_stop: 300,
        percent_range: 20.0,
        lower_limit: None,
        dissolve_epsilon: 0.5,
        district_filter: None,
        reject_below_lower_limit: false,
        parallel_districts: true,
    };
    let band = AcceptanceBand {
        lower_limit: 60,
        upper_limit: 360,
    };
    let allocator = AcdpIdAllocator::new();

    let start = Instant::now();
    let result = solve_district(&district, &seeds, &sectors, band, &config, &allocator);
    let elapsed = start.elapsed();

    info!(
        "grid {grid_side}x{grid_side}: {} sectors, {} seeds -> {} ACDPs, {} orphans in {:.2?}",
        sectors.len(),
        seeds.len(),
        result.acdps.len(),
        result.orphans.len(),
        elapsed
    );
}

fn square(min: (f64, f64), max: (f64, f64)) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![Polygon::new(
        LineString::new(vec![
            Coord { x: min.0, y: min.1 },
            Coord { x: max.0, y: min.1 },
            Coord { x: max.0, y: max.1 },
            Coord { x: min.0, y: max.1 },
            Coord { x: min.0, y: min.1 },
        ]),
        vec![],
    )])
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
        .init();
}
