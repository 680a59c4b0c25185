//! Seed Growth (§4.3): the radial probe loop that accretes sectors around a
//! single seed until the acceptance band is reached or the district's
//! remaining sector pool is depleted.
//!
//! The original algorithm this is grounded on expresses this recursively
//! (grow, recurse on the next radius); it is written here as an explicit
//! loop so the termination conditions are visible in one place rather than
//! split across a base case and a recursive call.

use std::collections::{BTreeSet, HashMap};

use geo::{BooleanOps, MultiPolygon, Point};

use crate::config::{AcceptanceBand, BUFFER_CIRCLE_SEGMENTS};
use crate::geometry;
use crate::index::SectorIndex;
use crate::types::{GrowthReason, Sector};

/// The outcome of growing one seed to completion.
pub struct GrowthOutcome {
    pub accepted_sector_codes: Vec<String>,
    pub total_households: u64,
    pub final_buffer_value: f64,
    pub reason: GrowthReason,
}

/// Grow `seed_point` outward in steps of `buffer_step`. Each round widens
/// the probe disc to discover new candidates, but a candidate is only
/// admitted if it is contiguous with the sectors already accepted (its
/// geometry intersects `dissolved.buffer(dissolve_epsilon)`, not merely the
/// probe disc) and admitting it would not reach `band.upper_limit` (§4.3
/// steps 3-4). The instant a candidate would cross the ceiling, growth stops
/// and the seed is accepted with whatever it has accumulated so far.
///
/// `index` and `sectors_by_code` describe the district's still-unclaimed
/// sectors; this function does not mutate `index` itself — the caller
/// removes claimed sectors once it commits the outcome.
pub fn grow_seed(
    seed_point: Point<f64>,
    index: &SectorIndex,
    sectors_by_code: &HashMap<String, &Sector>,
    band: AcceptanceBand,
    buffer_step: f64,
    dissolve_epsilon: f64,
) -> GrowthOutcome {
    let mut claimed: BTreeSet<String> = BTreeSet::new();
    let mut total_households: u64 = 0;
    let mut dissolved: Option<MultiPolygon<f64>> = None;
    let mut radius = buffer_step;
    // The set of not-yet-claimed codes the previous round's disc turned up.
    // Contiguity (unlike the old plain-intersects test) can permanently
    // reject a candidate that sits inside the disc's bounding box but is
    // geometrically disjoint from the accepted cluster — growing the radius
    // further can't fix that. So depletion isn't "nothing left in the
    // index" any more, it's "growing the disc stopped turning up anything
    // this round didn't already see and reject last round".
    let mut previous_unclaimed: Option<BTreeSet<String>> = None;

    loop {
        let disc = MultiPolygon::new(vec![geometry::circle_polygon(
            seed_point,
            radius,
            BUFFER_CIRCLE_SEGMENTS,
        )]);
        let mut candidate_codes = index.query_candidates(&disc);
        candidate_codes.sort();
        let current_unclaimed: BTreeSet<String> =
            candidate_codes.iter().filter(|code| !claimed.contains(*code)).cloned().collect();

        let mut claimed_this_round = false;
        for candidate_code in &candidate_codes {
            if claimed.contains(candidate_code) {
                continue;
            }
            let Some(sector) = sectors_by_code.get(candidate_code) else {
                continue;
            };

            // Recomputed per candidate (not once per round) so two
            // candidates discovered in the same round can't both be
            // admitted against a contiguity region that predates either.
            let is_contiguous = match &dissolved {
                Some(region) => geometry::intersects(&sector.geometry, &geometry::buffer_tolerance(region, dissolve_epsilon)),
                None => geometry::intersects(&sector.geometry, &disc),
            };
            if !is_contiguous {
                continue;
            }

            if total_households + sector.num_households >= band.upper_limit {
                return GrowthOutcome {
                    accepted_sector_codes: claimed.into_iter().collect(),
                    total_households,
                    final_buffer_value: radius,
                    reason: GrowthReason::Accepted,
                };
            }

            claimed.insert(candidate_code.clone());
            total_households += sector.num_households;
            dissolved = Some(match dissolved {
                None => sector.geometry.clone(),
                Some(region) => region.union(&sector.geometry),
            });
            claimed_this_round = true;
        }

        if index.len() == claimed.len() {
            // Every sector left in the district's pool has been claimed;
            // nothing more can be gained by growing further.
            let reason = if total_households >= band.lower_limit {
                GrowthReason::Accepted
            } else {
                GrowthReason::Depleted
            };
            return GrowthOutcome {
                accepted_sector_codes: claimed.into_iter().collect(),
                total_households,
                final_buffer_value: radius,
                reason,
            };
        }

        let discovery_exhausted = previous_unclaimed.as_ref() == Some(&current_unclaimed);
        if !claimed_this_round && discovery_exhausted {
            return GrowthOutcome {
                accepted_sector_codes: claimed.into_iter().collect(),
                total_households,
                final_buffer_value: radius,
                reason: GrowthReason::Depleted,
            };
        }

        previous_unclaimed = Some(current_unclaimed);
        radius += buffer_step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sector;
    use geo::{Coord, LineString, Polygon};

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

    fn sector(code: &str, households: u64, geometry: MultiPolygon<f64>) -> Sector {
        Sector {
            sector_code: code.to_string(),
            district_code: "D1".to_string(),
            num_households: households,
            num_registered: households,
            geometry,
        }
    }

    #[test]
    fn growth_stops_the_instant_a_candidate_would_cross_the_ceiling() {
        let sectors = vec![
            sector("s1", 600, square((0.0, 0.0), (1.0, 1.0))),
            sector("s2", 600, square((1.0, 0.0), (2.0, 1.0))),
        ];
        let index = SectorIndex::build(sectors.iter().map(|s| (s.sector_code.as_str(), &s.geometry)));
        let by_code: HashMap<String, &Sector> = sectors.iter().map(|s| (s.sector_code.clone(), s)).collect();

        let band = AcceptanceBand {
            lower_limit: 500,
            upper_limit: 1000,
        };
        let outcome = grow_seed(Point::new(0.5, 0.5), &index, &by_code, band, 5.0, 0.5);

        assert_eq!(outcome.reason, GrowthReason::Accepted);
        assert_eq!(outcome.total_households, 600, "s2 would have pushed total to 1200, over upper_limit");
        assert!(outcome.total_households < band.upper_limit);
        assert_eq!(outcome.accepted_sector_codes, vec!["s1".to_string()]);
    }

    #[test]
    fn growth_depletes_when_pool_is_too_small() {
        let sectors = vec![sector("s1", 50, square((0.0, 0.0), (1.0, 1.0)))];
        let index = SectorIndex::build(sectors.iter().map(|s| (s.sector_code.as_str(), &s.geometry)));
        let by_code: HashMap<String, &Sector> = sectors.iter().map(|s| (s.sector_code.clone(), s)).collect();

        let band = AcceptanceBand {
            lower_limit: 500,
            upper_limit: 1000,
        };
        let outcome = grow_seed(Point::new(0.5, 0.5), &index, &by_code, band, 5.0, 0.5);

        assert_eq!(outcome.reason, GrowthReason::Depleted);
        assert_eq!(outcome.total_households, 50);
    }

    #[test]
    fn a_candidate_not_contiguous_with_the_accepted_cluster_is_skipped() {
        // s1 sits at the seed; s2 is far enough from s1 (but still inside the
        // eventual probe disc) that it never touches s1's dissolved region,
        // so it must not be folded into the same ACDP even though a single
        // coarse disc would otherwise span both.
        let sectors = vec![
            sector("s1", 10, square((0.0, 0.0), (1.0, 1.0))),
            sector("s2", 10, square((20.0, 20.0), (21.0, 21.0))),
        ];
        let index = SectorIndex::build(sectors.iter().map(|s| (s.sector_code.as_str(), &s.geometry)));
        let by_code: HashMap<String, &Sector> = sectors.iter().map(|s| (s.sector_code.clone(), s)).collect();

        let band = AcceptanceBand {
            lower_limit: 5,
            upper_limit: 1000,
        };
        let outcome = grow_seed(Point::new(0.5, 0.5), &index, &by_code, band, 50.0, 0.5);

        assert_eq!(outcome.accepted_sector_codes, vec!["s1".to_string()]);
    }
}
