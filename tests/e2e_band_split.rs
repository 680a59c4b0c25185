mod common;

use acdp_builder::solver::solve_district;
use acdp_builder::types::AcdpIdAllocator;
use common::{assertions, fixtures};

#[test]
fn two_distant_seeds_each_grow_their_own_acdp() {
    let district = fixtures::district("D1", 6, 12);
    let sectors = fixtures::grid_sectors("D1", 6, 12, 50);
    let seeds = vec![
        fixtures::seed(1, "D1", 0, 1.5, 3.0),
        fixtures::seed(2, "D1", 1, 10.5, 3.0),
    ];
    let band = fixtures::band(100, 300);
    let config = fixtures::config(1.0, 200, 50.0);
    let allocator = AcdpIdAllocator::new();

    let result = solve_district(&district, &seeds, &sectors, band, &config, &allocator);

    assertions::assert_partition_sound(&result);
    assertions::assert_acdp_count(&result, 2);

    let first_members: std::collections::HashSet<_> = result
        .assignments
        .iter()
        .filter(|a| a.seed_id == 1)
        .map(|a| a.sector_code.clone())
        .collect();
    let second_members: std::collections::HashSet<_> = result
        .assignments
        .iter()
        .filter(|a| a.seed_id == 2)
        .map(|a| a.sector_code.clone())
        .collect();
    assert!(first_members.is_disjoint(&second_members));
}
