//! Input Reader and Writer (§6): load the seed/sector/district layers from
//! shapefile or GeoJSON, and write the four output layers in the configured
//! driver.

pub mod reader;
pub mod writer;
