//! ACDP aggregation engine
//!
//! This library builds Areas of Contiguous Domicile Population (ACDPs) by
//! growing a buffer disc around each priority-ordered seed within a district
//! until the accumulated household count falls inside a configurable
//! acceptance band, then folding any sector left over into whichever ACDP's
//! ring fully encloses it.
//!
//! ## Main Components
//!
//! - [`config`]: pipeline configuration, attribute rename maps and output naming
//! - [`types`]: the seed/sector/district/ACDP data model
//! - [`geometry`]: the geometry kernel (buffer, dissolve, coverage, area)
//! - [`index`]: an R-tree spatial index over a district's sectors
//! - [`solver`]: the District Solver, Seed Growth and Hole Repair algorithms
//! - [`io`]: shapefile/GeoJSON/GeoPackage readers and writers
//! - [`pipeline`]: the end-to-end driver tying the above together
//!
//! ## Error Handling
//!
//! Every fallible entry point returns [`error::Result<T>`], an alias for
//! `Result<T, error::AcdpError>`. `AcdpError` distinguishes malformed inputs,
//! invalid configuration and I/O failures so callers can report the right
//! exit code.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use acdp_builder::{config::PipelineConfig, pipeline};
//!
//! let config = PipelineConfig::from_file("acdp.toml")?;
//! let output = pipeline::run(&config)?;
//! println!("built {} ACDPs", output.acdps.len());
//! # Ok::<(), acdp_builder::error::AcdpError>(())
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod index;
pub mod io;
pub mod pipeline;
pub mod solver;
pub mod types;

pub use config::PipelineConfig;
pub use error::{AcdpError, Result};
pub use pipeline::PipelineOutput;
pub use types::{Acdp, District, Orphan, Seed, SeedBuffer, Sector, SectorAssignment};
