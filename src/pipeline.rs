//! Pipeline Driver (§5): reads the three input layers, solves every district
//! (optionally in parallel), and assembles the four output layers in a
//! deterministic order regardless of how the per-district work completed.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::{AcdpError, Result};
use crate::io::reader;
use crate::io::writer;
use crate::solver::district::solve_district;
use crate::types::{Acdp, AcdpIdAllocator, Orphan, Sector, SeedBuffer, SectorAssignment};

/// The four output layers, concatenated across every processed district, plus
/// the original sector layer the writer needs to carry geometry and
/// attributes (`num_households`, `num_registered`) into the
/// `sectors_by_seed`/`orphan_sectors` layers (§6.2).
pub struct PipelineOutput {
    pub acdps: Vec<Acdp>,
    pub assignments: Vec<SectorAssignment>,
    pub seed_buffers: Vec<SeedBuffer>,
    pub orphans: Vec<Orphan>,
    pub sectors: Vec<Sector>,
}

/// Run the full pipeline: load inputs, solve every district, write outputs.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
    let band = config.validate()?;

    info!("[1/4] loading input layers");
    let seeds = reader::read_seeds(&config.input_seeds)?;
    let sectors = reader::read_sectors(&config.input_sectors)?;
    let districts = reader::read_districts(&config.input_districts)?;

    if districts.is_empty() {
        return Err(AcdpError::InputMissing {
            layer: "districts".to_string(),
        });
    }

    let districts: Vec<_> = match &config.district_filter {
        Some(wanted) => {
            let filtered: Vec<_> = districts
                .into_iter()
                .filter(|district| &district.district_code == wanted)
                .collect();
            if filtered.is_empty() {
                return Err(AcdpError::DistrictNotFound {
                    district_code: wanted.clone(),
                });
            }
            filtered
        }
        None => districts,
    };

    info!(count = districts.len(), "[2/4] solving districts");
    let allocator = Arc::new(AcdpIdAllocator::new());

    let solve_one = |district: &crate::types::District| {
        let district_seeds: Vec<_> = seeds
            .iter()
            .filter(|seed| seed.district_code == district.district_code)
            .cloned()
            .collect();
        let district_sectors: Vec<_> = sectors
            .iter()
            .filter(|sector| sector.district_code == district.district_code)
            .cloned()
            .collect();
        solve_district(district, &district_seeds, &district_sectors, band, config, &allocator)
    };

    let mut results: Vec<(String, crate::solver::DistrictResult)> = if config.parallel_districts {
        districts
            .par_iter()
            .map(|district| (district.district_code.clone(), solve_one(district)))
            .collect()
    } else {
        districts
            .iter()
            .map(|district| (district.district_code.clone(), solve_one(district)))
            .collect()
    };

    // Districts may finish in any order under rayon; sort by district_code
    // so output layer ordering is deterministic regardless of scheduling
    // (§5 "Ordering guarantees").
    results.sort_by(|a, b| a.0.cmp(&b.0));

    info!("[3/4] assembling output layers");
    let processed_district_codes: std::collections::HashSet<&str> =
        districts.iter().map(|district| district.district_code.as_str()).collect();
    let mut output = PipelineOutput {
        acdps: Vec::new(),
        assignments: Vec::new(),
        seed_buffers: Vec::new(),
        orphans: Vec::new(),
        sectors: sectors
            .iter()
            .filter(|sector| processed_district_codes.contains(sector.district_code.as_str()))
            .cloned()
            .collect(),
    };
    for (_, result) in results {
        output.acdps.extend(result.acdps);
        output.assignments.extend(result.assignments);
        output.seed_buffers.extend(result.seed_buffers);
        output.orphans.extend(result.orphans);
    }
    output.acdps.sort_by_key(|acdp| acdp.acdp_id);

    info!("[4/4] writing output layers");
    writer::write_outputs(config, &output)?;

    Ok(output)
}
