//! Synthetic district/sector/seed builders shared by the scenario tests.
//!
//! Everything here lives on the unit square grid so test geometry can be
//! reasoned about by eye: sector `(row, col)` occupies
//! `[col, col+1] x [row, row+1]`.

use acdp_builder::config::{AcceptanceBand, OutputBaseNames, OutputDriver, PipelineConfig};
use acdp_builder::types::{District, Seed, Sector};
use geo::{Coord, LineString, MultiPolygon, Point, Polygon};

pub fn unit_square(min: (f64, f64), max: (f64, f64)) -> MultiPolygon<f64> {
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

/// A `rows` x `cols` grid of sectors, each with `households` households, in
/// district `district_code`, named `"{row}-{col}"`.
pub fn grid_sectors(district_code: &str, rows: usize, cols: usize, households: u64) -> Vec<Sector> {
    let mut sectors = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            sectors.push(Sector {
                sector_code: format!("{row}-{col}"),
                district_code: district_code.to_string(),
                num_households: households,
                num_registered: households,
                geometry: unit_square((col as f64, row as f64), (col as f64 + 1.0, row as f64 + 1.0)),
            });
        }
    }
    sectors
}

pub fn seed(seed_id: u64, district_code: &str, priority: i64, x: f64, y: f64) -> Seed {
    Seed {
        seed_id,
        district_code: district_code.to_string(),
        priority,
        point: Point::new(x, y),
    }
}

pub fn district(district_code: &str, rows: usize, cols: usize) -> District {
    District {
        district_code: district_code.to_string(),
        geometry: unit_square((0.0, 0.0), (cols as f64, rows as f64)),
    }
}

pub fn band(lower_limit: u64, upper_limit: u64) -> AcceptanceBand {
    AcceptanceBand {
        lower_limit,
        upper_limit,
    }
}

/// A `PipelineConfig` with paths left as placeholders, suitable for the
/// solver-level tests which never touch the reader/writer.
pub fn config(buffer_step: f64, limit_to_stop: u64, percent_range: f64) -> PipelineConfig {
    PipelineConfig {
        input_seeds: "unused".into(),
        input_sectors: "unused".into(),
        input_districts: "unused".into(),
        output_dir: "unused".into(),
        output_driver: OutputDriver::GeoJson,
        output_names: OutputBaseNames::default(),
        buffer_step,
        limit_to_stop,
        percent_range,
        lower_limit: None,
        dissolve_epsilon: 0.5,
        district_filter: None,
        reject_below_lower_limit: false,
        parallel_districts: true,
    }
}
