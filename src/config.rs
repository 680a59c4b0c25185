//! Centralized configuration for the ACDP aggregation pipeline.
//!
//! This module contains the [`PipelineConfig`] struct and the constants used
//! throughout the application to ensure consistency and ease of modification.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AcdpError, Result};

/// The attribute rename map applied to the sectors layer, mapping the source
/// attribute names commonly found in the reference shapefiles to canonical names.
pub const SECTOR_RENAME_MAP: &[(&str, &str)] = &[
    ("CD_DIST", "district_code"),
    ("CD_SETOR", "sector_code"),
    ("Domicilios", "num_households"),
    ("Cadastrad", "num_registered"),
];

/// The attribute rename map applied to the seeds layer.
pub const SEED_RENAME_MAP: &[(&str, &str)] = &[("CD_DIST", "district_code"), ("ORDEM", "priority")];

/// The attribute rename map applied to the districts layer.
pub const DISTRICT_RENAME_MAP: &[(&str, &str)] = &[("CD_DIST", "district_code")];

/// Number of vertices used to approximate a seed's circular buffer disc.
/// 64 segments keeps the polygon-union cost of repeated dissolves manageable
/// while staying visually indistinguishable from a true circle at typical
/// census-sector scales.
pub const BUFFER_CIRCLE_SEGMENTS: usize = 64;

/// Default contiguity tolerance (§3 "Configuration", `dissolve_epsilon`).
pub const DEFAULT_DISSOLVE_EPSILON: f64 = 0.5;

/// Output driver recognised by the writer (§6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputDriver {
    Shapefile,
    GeoPackage,
    GeoJson,
}

impl OutputDriver {
    /// The file extension used for this driver's output files.
    pub fn extension(self) -> &'static str {
        match self {
            OutputDriver::Shapefile => "shp",
            OutputDriver::GeoPackage => "gpkg",
            OutputDriver::GeoJson => "geojson",
        }
    }
}

/// Base file names for the four output layers (§6.2), without extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputBaseNames {
    #[serde(default = "default_acdps_name")]
    pub acdps: String,
    #[serde(default = "default_sectors_name")]
    pub sectors_by_seed: String,
    #[serde(default = "default_buffers_name")]
    pub buffer_around_seeds: String,
    #[serde(default = "default_orphans_name")]
    pub orphan_sectors: String,
}

fn default_acdps_name() -> String {
    "acdps".to_string()
}
fn default_sectors_name() -> String {
    "sectors_by_seed".to_string()
}
fn default_buffers_name() -> String {
    "buffer_around_seeds".to_string()
}
fn default_orphans_name() -> String {
    "orphan_sectors".to_string()
}

impl Default for OutputBaseNames {
    fn default() -> Self {
        Self {
            acdps: default_acdps_name(),
            sectors_by_seed: default_sectors_name(),
            buffer_around_seeds: default_buffers_name(),
            orphan_sectors: default_orphans_name(),
        }
    }
}

/// Recognised configuration options for one pipeline run (§3, §6.3).
///
/// Every field here has observable effect; there is no dead configuration.
/// Unknown keys in a config file fail deserialization via `deny_unknown_fields`,
/// satisfying §6.3's "Unknown options fail the run".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Path to the seeds input layer.
    pub input_seeds: PathBuf,
    /// Path to the sectors input layer.
    pub input_sectors: PathBuf,
    /// Path to the districts input layer.
    pub input_districts: PathBuf,

    /// Directory into which the four output layers are written.
    pub output_dir: PathBuf,
    /// Output driver (shapefile, gpkg, geojson).
    #[serde(default = "default_output_driver")]
    pub output_driver: OutputDriver,
    /// Base file names for the four output layers.
    #[serde(default)]
    pub output_names: OutputBaseNames,

    /// Additive radius increment per probe iteration (CRS units). Must be > 0.
    pub buffer_step: f64,
    /// Target household count per ACDP. Must be > 0.
    pub limit_to_stop: u64,
    /// Percent in [0, 100] defining the acceptance band around `limit_to_stop`.
    pub percent_range: f64,
    /// Optional explicit override of the lower acceptance bound.
    #[serde(default)]
    pub lower_limit: Option<u64>,
    /// Contiguity tolerance buffer applied to already-dissolved regions.
    #[serde(default = "default_dissolve_epsilon")]
    pub dissolve_epsilon: f64,
    /// Restrict processing to a single district code (for testing).
    #[serde(default)]
    pub district_filter: Option<String>,
    /// Reject (rather than accept-with-warning) ACDPs whose total falls below
    /// `lower_limit` after depletion. Default `false`, matching §7's default policy.
    #[serde(default)]
    pub reject_below_lower_limit: bool,
    /// Process districts concurrently via a rayon thread pool. Default `true`.
    #[serde(default = "default_parallel")]
    pub parallel_districts: bool,
}

fn default_output_driver() -> OutputDriver {
    OutputDriver::GeoJson
}
fn default_dissolve_epsilon() -> f64 {
    DEFAULT_DISSOLVE_EPSILON
}
fn default_parallel() -> bool {
    true
}

/// Derived acceptance-band limits computed once per run.
#[derive(Debug, Clone, Copy)]
pub struct AcceptanceBand {
    pub lower_limit: u64,
    pub upper_limit: u64,
}

impl PipelineConfig {
    /// Load a `PipelineConfig` from a TOML or JSON file, selected by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&raw)?,
            Some("toml") | None => {
                toml::from_str(&raw).map_err(|e| AcdpError::Toml(e.to_string()))?
            }
            Some(other) => {
                return Err(AcdpError::UnknownConfigOption {
                    option: format!("config file extension `.{other}`"),
                })
            }
        };
        Ok(config)
    }

    /// Compute the acceptance band (§3: `upper_limit = limit_to_stop*(1+percent_range/100)`,
    /// default `lower_limit = limit_to_stop*percent_range/100` when unset) and validate
    /// every configuration field.
    pub fn validate(&self) -> Result<AcceptanceBand> {
        if self.buffer_step <= 0.0 {
            return Err(AcdpError::InvalidConfig {
                reason: "buffer_step must be positive".to_string(),
            });
        }
        if self.limit_to_stop == 0 {
            return Err(AcdpError::InvalidConfig {
                reason: "limit_to_stop must be positive".to_string(),
            });
        }
        if !(0.0..=100.0).contains(&self.percent_range) {
            return Err(AcdpError::InvalidConfig {
                reason: "percent_range must be within [0, 100]".to_string(),
            });
        }
        if self.dissolve_epsilon <= 0.0 {
            return Err(AcdpError::InvalidConfig {
                reason: "dissolve_epsilon must be positive".to_string(),
            });
        }

        let limit = self.limit_to_stop as f64;
        let upper_limit = (limit * (1.0 + self.percent_range / 100.0)).round() as u64;
        let lower_limit = match self.lower_limit {
            Some(explicit) => explicit,
            None => (limit * self.percent_range / 100.0).round() as u64,
        };

        if lower_limit > 0 && upper_limit <= lower_limit {
            return Err(AcdpError::InvalidConfig {
                reason: format!(
                    "upper_limit ({upper_limit}) must exceed lower_limit ({lower_limit})"
                ),
            });
        }

        Ok(AcceptanceBand {
            lower_limit,
            upper_limit,
        })
    }
}
