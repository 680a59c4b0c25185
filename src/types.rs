//! Core domain entities (§3 "Data Model").
//!
//! These are plain data holders; the algorithms that build and mutate them
//! live in [`crate::solver`].

use std::sync::atomic::{AtomicU64, Ordering};

use geo::{MultiPolygon, Point};
use serde::{Deserialize, Serialize};

/// A prioritised point that nucleates one ACDP within its district (§3 "Seed").
#[derive(Debug, Clone)]
pub struct Seed {
    pub seed_id: u64,
    pub district_code: String,
    /// Lower priority is consumed earlier.
    pub priority: i64,
    pub point: Point<f64>,
}

/// A census polygon with a household count; the atomic unit of aggregation (§3 "Sector").
#[derive(Debug, Clone)]
pub struct Sector {
    pub sector_code: String,
    pub district_code: String,
    pub num_households: u64,
    pub num_registered: u64,
    pub geometry: MultiPolygon<f64>,
}

/// A partition cell; aggregation never crosses district boundaries (§3 "District").
#[derive(Debug, Clone)]
pub struct District {
    pub district_code: String,
    pub geometry: MultiPolygon<f64>,
}

/// Why a seed's growth loop stopped (§4.3 "Outputs").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthReason {
    /// The acceptance band ceiling was reached, or growth could no longer
    /// continue contiguously while at or above `lower_limit`.
    Accepted,
    /// The remaining-sector pool was exhausted before the band was reached,
    /// or contiguity was lost while still below `lower_limit`.
    Depleted,
}

/// One Area of Contiguous Domicile Population (§3 "ACDP").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acdp {
    pub acdp_id: u64,
    pub seed_id: u64,
    pub district_code: String,
    #[serde(skip)]
    pub geometry: Option<MultiPolygon<f64>>,
    pub num_sectors: usize,
    pub area: f64,
    pub total_households: u64,
    pub member_sector_codes: String,
}

/// A sector's membership in exactly one ACDP (§3 "Sector Assignment").
#[derive(Debug, Clone)]
pub struct SectorAssignment {
    pub sector_code: String,
    pub seed_id: u64,
    pub acdp_id: u64,
}

/// The final buffer disc recorded for a used seed (§3 "Seed Buffer").
#[derive(Debug, Clone)]
pub struct SeedBuffer {
    pub seed_id: u64,
    pub geometry: MultiPolygon<f64>,
    pub final_buffer_value: f64,
    pub total_households: u64,
}

/// A sector that received no assignment by the end of a district's processing
/// (§3 "Orphan").
#[derive(Debug, Clone)]
pub struct Orphan {
    pub sector_code: String,
}

/// Process-global, strictly monotonic `acdp_id` allocator (§5 "Ordering guarantees",
/// §9 "Global ACDP counter").
///
/// A handle (`Arc<AcdpIdAllocator>`, see [`crate::pipeline`]) is passed into each
/// district solver invocation rather than relying on ambient/thread-local state,
/// so the allocator remains correct whether districts are solved sequentially or
/// concurrently across a rayon thread pool.
#[derive(Debug, Default)]
pub struct AcdpIdAllocator {
    next: AtomicU64,
}

impl AcdpIdAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Allocate the next `acdp_id`. IDs start at 1 (see SPEC_FULL.md §9, "Open questions").
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst) + 1
    }
}
