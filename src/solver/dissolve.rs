//! Dissolve semantics shared by District Solver commit (§4.2 step 4) and Hole
//! Repair rebuild (§4.4 step 4): turn a set of member sectors into the
//! geometry/area/household totals an [`crate::types::Acdp`] reports.

use crate::geometry;
use crate::types::Sector;

/// The fields derived from a dissolved ACDP region.
pub struct DissolvedRegion {
    pub geometry: geo::MultiPolygon<f64>,
    pub area: f64,
    pub total_households: u64,
    /// Comma-joined member sector codes, sorted for determinism (§4.5:
    /// "member list order must not depend on assignment order").
    pub member_sector_codes: String,
}

/// Dissolve `members` into one region. Panics if `members` is empty — an
/// ACDP always has at least the sector(s) accepted by its seed's growth
/// loop, so an empty commit is a caller bug, not a runtime condition.
pub fn dissolve_members(members: &[&Sector]) -> DissolvedRegion {
    assert!(!members.is_empty(), "cannot dissolve zero sectors into an ACDP");

    let geometry = geometry::dissolve(members.iter().map(|sector| &sector.geometry))
        .expect("non-empty members guarantees a dissolved geometry");
    let area = geometry::rounded_area(&geometry);
    let total_households = members.iter().map(|sector| sector.num_households).sum();

    let mut codes: Vec<&str> = members.iter().map(|sector| sector.sector_code.as_str()).collect();
    codes.sort_unstable();
    let member_sector_codes = codes.join(",");

    DissolvedRegion {
        geometry,
        area,
        total_households,
        member_sector_codes,
    }
}
