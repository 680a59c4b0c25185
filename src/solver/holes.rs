//! Hole Repair (§4.4): sectors left unassigned after every seed in a
//! district has grown are tested against each ACDP's filled exterior
//! envelope and folded in if fully enclosed, rather than being reported as
//! orphans simply because they sit in the interior of a ring-shaped ACDP.

use std::collections::HashMap;

use crate::geometry;
use crate::solver::dissolve::dissolve_members;
use crate::types::{Acdp, Sector};

/// Attempt to place every sector in `unassigned` into one of `acdps`' filled
/// envelopes. Returns the sector codes that remain orphaned after repair.
///
/// `acdps` and `members_by_acdp` are updated in place: a repaired ACDP's
/// geometry, area and household total are recomputed by dissolving its
/// existing members together with the newly folded-in sector (§4.5).
pub fn repair_holes(
    acdps: &mut [Acdp],
    members_by_acdp: &mut HashMap<u64, Vec<String>>,
    sectors_by_code: &HashMap<String, Sector>,
    unassigned: Vec<String>,
) -> Vec<String> {
    let mut orphans = Vec::new();

    for sector_code in unassigned {
        let Some(sector) = sectors_by_code.get(&sector_code) else {
            orphans.push(sector_code);
            continue;
        };

        let mut placed = false;
        for acdp in acdps.iter_mut() {
            let Some(region) = acdp.geometry.as_ref() else {
                continue;
            };
            let envelope = geometry::exterior_envelope(region);
            if !geometry::covered_by(&sector.geometry, &envelope) {
                continue;
            }

            let member_codes = members_by_acdp.entry(acdp.acdp_id).or_default();
            member_codes.push(sector_code.clone());
            let members: Vec<&Sector> = member_codes
                .iter()
                .filter_map(|code| sectors_by_code.get(code))
                .collect();
            let dissolved = dissolve_members(&members);

            acdp.geometry = Some(dissolved.geometry);
            acdp.area = dissolved.area;
            acdp.total_households = dissolved.total_households;
            acdp.member_sector_codes = dissolved.member_sector_codes;
            acdp.num_sectors = members.len();

            placed = true;
            break;
        }

        if !placed {
            orphans.push(sector_code);
        }
    }

    orphans
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, LineString, MultiPolygon, Point, Polygon};

    fn ring_with_hole() -> MultiPolygon<f64> {
        let outer = LineString::new(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 10.0, y: 0.0 },
            Coord { x: 10.0, y: 10.0 },
            Coord { x: 0.0, y: 10.0 },
            Coord { x: 0.0, y: 0.0 },
        ]);
        let hole = LineString::new(vec![
            Coord { x: 4.0, y: 4.0 },
            Coord { x: 6.0, y: 4.0 },
            Coord { x: 6.0, y: 6.0 },
            Coord { x: 4.0, y: 6.0 },
            Coord { x: 4.0, y: 4.0 },
        ]);
        MultiPolygon::new(vec![Polygon::new(outer, vec![hole])])
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

    #[test]
    fn sector_inside_hole_is_folded_in() {
        let mut acdps = vec![Acdp {
            acdp_id: 1,
            seed_id: 1,
            district_code: "D1".to_string(),
            geometry: Some(ring_with_hole()),
            num_sectors: 1,
            area: 96.0,
            total_households: 100,
            member_sector_codes: "ring".to_string(),
        }];
        let mut members_by_acdp = HashMap::from([(1u64, vec!["ring".to_string()])]);

        let ring_sector = Sector {
            sector_code: "ring".to_string(),
            district_code: "D1".to_string(),
            num_households: 100,
            num_registered: 100,
            geometry: ring_with_hole(),
        };
        let hole_sector = Sector {
            sector_code: "hole".to_string(),
            district_code: "D1".to_string(),
            num_households: 20,
            num_registered: 20,
            geometry: square((4.5, 4.5), (5.5, 5.5)),
        };
        let sectors_by_code = HashMap::from([
            ("ring".to_string(), ring_sector),
            ("hole".to_string(), hole_sector),
        ]);

        let orphans = repair_holes(
            &mut acdps,
            &mut members_by_acdp,
            &sectors_by_code,
            vec!["hole".to_string()],
        );

        assert!(orphans.is_empty());
        assert_eq!(acdps[0].total_households, 120);
        assert_eq!(acdps[0].num_sectors, 2);
        assert!(geometry::contains_point(
            acdps[0].geometry.as_ref().unwrap(),
            Point::new(5.0, 5.0)
        ));
    }

    #[test]
    fn sector_outside_every_envelope_remains_orphan() {
        let mut acdps = vec![Acdp {
            acdp_id: 1,
            seed_id: 1,
            district_code: "D1".to_string(),
            geometry: Some(square((0.0, 0.0), (1.0, 1.0))),
            num_sectors: 1,
            area: 1.0,
            total_households: 100,
            member_sector_codes: "a".to_string(),
        }];
        let mut members_by_acdp = HashMap::from([(1u64, vec!["a".to_string()])]);
        let sectors_by_code = HashMap::from([(
            "far".to_string(),
            Sector {
                sector_code: "far".to_string(),
                district_code: "D1".to_string(),
                num_households: 10,
                num_registered: 10,
                geometry: square((50.0, 50.0), (51.0, 51.0)),
            },
        )]);

        let orphans = repair_holes(
            &mut acdps,
            &mut members_by_acdp,
            &sectors_by_code,
            vec!["far".to_string()],
        );

        assert_eq!(orphans, vec!["far".to_string()]);
    }
}
