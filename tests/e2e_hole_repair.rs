mod common;

use std::collections::HashMap;

use acdp_builder::solver::holes::repair_holes;
use acdp_builder::types::{Acdp, Sector};
use common::fixtures::unit_square;
use geo::{Coord, LineString, MultiPolygon, Polygon};

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

/// A sector left behind inside an ACDP's ring is folded into that ACDP
/// rather than reported as an orphan, and the ACDP's totals are updated to
/// include it.
#[test]
fn an_orphan_sector_enclosed_by_an_acdps_ring_is_folded_in() {
    let mut acdps = vec![Acdp {
        acdp_id: 1,
        seed_id: 1,
        district_code: "D1".to_string(),
        geometry: Some(ring_with_hole()),
        num_sectors: 1,
        area: 96.0,
        total_households: 400,
        member_sector_codes: "ring".to_string(),
    }];
    let mut members_by_acdp = HashMap::from([(1u64, vec!["ring".to_string()])]);

    let sectors_by_code = HashMap::from([
        (
            "ring".to_string(),
            Sector {
                sector_code: "ring".to_string(),
                district_code: "D1".to_string(),
                num_households: 400,
                num_registered: 400,
                geometry: ring_with_hole(),
            },
        ),
        (
            "hole".to_string(),
            Sector {
                sector_code: "hole".to_string(),
                district_code: "D1".to_string(),
                num_households: 15,
                num_registered: 15,
                geometry: unit_square((4.5, 4.5), (5.5, 5.5)),
            },
        ),
    ]);

    let orphans = repair_holes(
        &mut acdps,
        &mut members_by_acdp,
        &sectors_by_code,
        vec!["hole".to_string()],
    );

    assert!(orphans.is_empty());
    assert_eq!(acdps[0].total_households, 415);
    assert_eq!(acdps[0].num_sectors, 2);
    assert!(acdps[0].member_sector_codes.contains("hole"));
}

#[test]
fn a_sector_outside_every_acdps_ring_remains_an_orphan() {
    let mut acdps = vec![Acdp {
        acdp_id: 1,
        seed_id: 1,
        district_code: "D1".to_string(),
        geometry: Some(unit_square((0.0, 0.0), (1.0, 1.0))),
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
            geometry: unit_square((50.0, 50.0), (51.0, 51.0)),
        },
    )]);

    let orphans = repair_holes(&mut acdps, &mut members_by_acdp, &sectors_by_code, vec!["far".to_string()]);

    assert_eq!(orphans, vec!["far".to_string()]);
}
