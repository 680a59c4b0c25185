//! District Solver, Seed Growth and Hole Repair (§4.2-§4.4): the algorithmic
//! core of the aggregation pipeline.

pub mod dissolve;
pub mod district;
pub mod growth;
pub mod holes;

pub use district::{solve_district, DistrictResult};
