//! District Solver (§4.2): drives one district's seeds through Seed Growth
//! in priority order, skipping seeds already covered by an earlier ACDP,
//! then hands whatever sectors remain unclaimed to Hole Repair.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::{AcceptanceBand, PipelineConfig};
use crate::error::ACCEPTANCE_BELOW_LOWER_NOTICE;
use crate::geometry;
use crate::index::SectorIndex;
use crate::solver::dissolve::dissolve_members;
use crate::solver::growth::grow_seed;
use crate::solver::holes::repair_holes;
use crate::types::{Acdp, AcdpIdAllocator, District, GrowthReason, Orphan, Seed, SeedBuffer, SectorAssignment, Sector};

/// Everything produced by solving one district.
pub struct DistrictResult {
    pub acdps: Vec<Acdp>,
    pub assignments: Vec<SectorAssignment>,
    pub seed_buffers: Vec<SeedBuffer>,
    pub orphans: Vec<Orphan>,
}

/// Solve `district` given its seeds and sectors (already filtered to this
/// district's `district_code` by the caller, see [`crate::pipeline`]).
pub fn solve_district(
    district: &District,
    seeds: &[Seed],
    sectors: &[Sector],
    band: AcceptanceBand,
    config: &PipelineConfig,
    allocator: &AcdpIdAllocator,
) -> DistrictResult {
    let mut ordered_seeds: Vec<&Seed> = seeds.iter().collect();
    ordered_seeds.sort_by_key(|seed| seed.priority);

    let sectors_by_code: HashMap<String, &Sector> =
        sectors.iter().map(|sector| (sector.sector_code.clone(), sector)).collect();
    let owned_sectors_by_code: HashMap<String, Sector> =
        sectors.iter().map(|sector| (sector.sector_code.clone(), sector.clone())).collect();

    let mut index = SectorIndex::build(sectors.iter().map(|s| (s.sector_code.as_str(), &s.geometry)));

    let mut acdps: Vec<Acdp> = Vec::new();
    let mut members_by_acdp: HashMap<u64, Vec<String>> = HashMap::new();
    let mut assignments: Vec<SectorAssignment> = Vec::new();
    let mut seed_buffers: Vec<SeedBuffer> = Vec::new();

    for seed in ordered_seeds {
        if acdps
            .iter()
            .filter_map(|acdp| acdp.geometry.as_ref())
            .any(|geometry| geometry::contains_point(geometry, seed.point))
        {
            debug!(seed_id = seed.seed_id, "seed already covered by an earlier ACDP, skipping");
            continue;
        }

        if index.is_empty() {
            debug!(seed_id = seed.seed_id, "no sectors remain in district, skipping seed");
            continue;
        }

        let outcome = grow_seed(seed.point, &index, &sectors_by_code, band, config.buffer_step, config.dissolve_epsilon);

        if outcome.accepted_sector_codes.is_empty() {
            debug!(seed_id = seed.seed_id, "growth claimed no sectors, skipping seed");
            continue;
        }

        if outcome.reason == GrowthReason::Depleted
            && outcome.total_households < band.lower_limit
            && config.reject_below_lower_limit
        {
            info!(
                seed_id = seed.seed_id,
                total_households = outcome.total_households,
                "rejecting ACDP below lower_limit per reject_below_lower_limit"
            );
            continue;
        }

        if outcome.reason == GrowthReason::Depleted && outcome.total_households < band.lower_limit {
            warn!(seed_id = seed.seed_id, total_households = outcome.total_households, "{}", ACCEPTANCE_BELOW_LOWER_NOTICE);
        }

        for code in &outcome.accepted_sector_codes {
            index.remove(code);
        }

        let members: Vec<&Sector> = outcome
            .accepted_sector_codes
            .iter()
            .filter_map(|code| sectors_by_code.get(code).copied())
            .collect();
        let dissolved = dissolve_members(&members);

        let acdp_id = allocator.next();
        members_by_acdp.insert(acdp_id, outcome.accepted_sector_codes.clone());
        for code in &outcome.accepted_sector_codes {
            assignments.push(SectorAssignment {
                sector_code: code.clone(),
                seed_id: seed.seed_id,
                acdp_id,
            });
        }
        let buffer_geometry = geo::MultiPolygon::new(vec![geometry::circle_polygon(
            seed.point,
            outcome.final_buffer_value,
            crate::config::BUFFER_CIRCLE_SEGMENTS,
        )]);
        seed_buffers.push(SeedBuffer {
            seed_id: seed.seed_id,
            geometry: buffer_geometry,
            final_buffer_value: outcome.final_buffer_value,
            total_households: outcome.total_households,
        });
        acdps.push(Acdp {
            acdp_id,
            seed_id: seed.seed_id,
            district_code: district.district_code.clone(),
            geometry: Some(dissolved.geometry),
            num_sectors: members.len(),
            area: dissolved.area,
            total_households: dissolved.total_households,
            member_sector_codes: dissolved.member_sector_codes,
        });
    }

    let unassigned: Vec<String> = sectors
        .iter()
        .map(|sector| sector.sector_code.clone())
        .filter(|code| !assignments.iter().any(|assignment| &assignment.sector_code == code))
        .collect();

    let orphan_codes = repair_holes(&mut acdps, &mut members_by_acdp, &owned_sectors_by_code, unassigned);

    // Hole repair may have grown an ACDP's membership; regenerate assignments
    // for whichever ACDPs picked up new members so `assignments` stays the
    // source of truth for sector -> (seed, ACDP) membership.
    for (acdp_id, member_codes) in &members_by_acdp {
        for code in member_codes {
            if !assignments.iter().any(|a| &a.sector_code == code && a.acdp_id == *acdp_id) {
                let seed_id = acdps
                    .iter()
                    .find(|acdp| acdp.acdp_id == *acdp_id)
                    .map(|acdp| acdp.seed_id)
                    .unwrap_or_default();
                assignments.push(SectorAssignment {
                    sector_code: code.clone(),
                    seed_id,
                    acdp_id: *acdp_id,
                });
            }
        }
    }

    let orphans = orphan_codes.into_iter().map(|sector_code| Orphan { sector_code }).collect();

    DistrictResult {
        acdps,
        assignments,
        seed_buffers,
        orphans,
    }
}
