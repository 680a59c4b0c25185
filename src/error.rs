//! Error types for the ACDP aggregation engine.

/// Error types for the ACDP builder.
#[derive(Debug, thiserror::Error)]
pub enum AcdpError {
    /// A required input layer was absent or contained zero records.
    #[error("input missing: {layer} layer is absent or empty")]
    InputMissing { layer: String },

    /// A required attribute was absent, or present with the wrong type.
    #[error("schema mismatch: {layer} is missing required attribute `{attribute}`")]
    SchemaMismatch { layer: String, attribute: String },

    /// An input polygon was invalid and could not be auto-repaired.
    #[error("invalid geometry for sector {sector_code}: {reason}")]
    InvalidGeometry { sector_code: String, reason: String },

    /// Input layers disagree on CRS, or the CRS is geographic (degrees).
    #[error("CRS mismatch: {reason}")]
    CrsMismatch { reason: String },

    /// The requested output driver is not available.
    #[error("unsupported output driver: `{driver}`")]
    UnsupportedOutputDriver { driver: String },

    /// A configuration file or CLI invocation named an option this crate does not recognise.
    #[error("unknown configuration option: `{option}`")]
    UnknownConfigOption { option: String },

    /// A configuration value was recognised but out of its valid range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// District code named by `district_filter` does not exist in the districts layer.
    #[error("district not found: `{district_code}`")]
    DistrictNotFound { district_code: String },

    /// Underlying I/O failure while reading or writing a layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying JSON (de)serialization failure (config file, GeoJSON layer).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying TOML deserialization failure (config file).
    #[error("TOML error: {0}")]
    Toml(String),

    /// Underlying shapefile reader/writer failure.
    #[error("shapefile error: {0}")]
    Shapefile(String),

    /// Underlying GeoPackage (SQLite) failure.
    #[error("GeoPackage error: {0}")]
    GeoPackage(String),
}

/// Per-seed condition: the growth terminated having accumulated less than `lower_limit`
/// households. The ACDP is still committed (see §7 of the specification); this is
/// surfaced as a warning, not an error, so it has no `AcdpError` variant — callers
/// observe it via `GrowthOutcome::reason` and a `tracing::warn!` log line.
pub const ACCEPTANCE_BELOW_LOWER_NOTICE: &str =
    "ACDP total households fell below lower_limit; accepted per default policy";

/// Convenience Result type for ACDP operations.
pub type Result<T> = std::result::Result<T, AcdpError>;
