//! Output Writer (§6.2): serializes the four output layers (ACDPs, sectors
//! by seed, buffer discs, orphan sectors) in the configured driver.
//!
//! Every layer is written into a staging directory first and only moved into
//! `output_dir` once every layer has written successfully, so a run that
//! fails partway through never leaves a half-written output set behind
//! (§5 "Cancellation and partial failure").

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use geo::MultiPolygon;

use crate::config::{OutputDriver, PipelineConfig};
use crate::error::{AcdpError, Result};
use crate::pipeline::PipelineOutput;
use crate::types::Sector;

/// A bare property bag attached to one written feature; driver-agnostic so
/// the same call site can target GeoJSON, shapefile or GeoPackage.
type Attributes = Vec<(&'static str, AttributeValue)>;

enum AttributeValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

pub fn write_outputs(config: &PipelineConfig, output: &PipelineOutput) -> Result<()> {
    let staging_dir = config.output_dir.join(".acdp-staging");
    if staging_dir.exists() {
        fs::remove_dir_all(&staging_dir)?;
    }
    fs::create_dir_all(&staging_dir)?;

    let result = write_staged_layers(config, output, &staging_dir);
    if result.is_err() {
        let _ = fs::remove_dir_all(&staging_dir);
        return result;
    }

    fs::create_dir_all(&config.output_dir)?;
    for entry in fs::read_dir(&staging_dir)? {
        let entry = entry?;
        let destination = config.output_dir.join(entry.file_name());
        fs::rename(entry.path(), destination)?;
    }
    fs::remove_dir_all(&staging_dir)?;
    Ok(())
}

fn write_staged_layers(config: &PipelineConfig, output: &PipelineOutput, staging_dir: &Path) -> Result<()> {
    let acdp_features: Vec<(MultiPolygon<f64>, Attributes)> = output
        .acdps
        .iter()
        .filter_map(|acdp| {
            acdp.geometry.as_ref().map(|geometry| {
                (
                    geometry.clone(),
                    vec![
                        ("acdp_id", AttributeValue::Integer(acdp.acdp_id as i64)),
                        ("seed_id", AttributeValue::Integer(acdp.seed_id as i64)),
                        ("district_code", AttributeValue::Text(acdp.district_code.clone())),
                        ("num_sectors", AttributeValue::Integer(acdp.num_sectors as i64)),
                        ("area", AttributeValue::Real(acdp.area)),
                        ("total_households", AttributeValue::Integer(acdp.total_households as i64)),
                        ("members", AttributeValue::Text(acdp.member_sector_codes.clone())),
                    ],
                )
            })
        })
        .collect();

    let buffer_features: Vec<(MultiPolygon<f64>, Attributes)> = output
        .seed_buffers
        .iter()
        .map(|buffer| {
            (
                buffer.geometry.clone(),
                vec![
                    ("seed_id", AttributeValue::Integer(buffer.seed_id as i64)),
                    ("final_buffer_value", AttributeValue::Real(buffer.final_buffer_value)),
                    ("total_households", AttributeValue::Integer(buffer.total_households as i64)),
                ],
            )
        })
        .collect();

    write_layer(
        config.output_driver,
        &staging_dir.join(format!("{}.{}", config.output_names.acdps, config.output_driver.extension())),
        &acdp_features,
    )?;
    write_layer(
        config.output_driver,
        &staging_dir.join(format!(
            "{}.{}",
            config.output_names.buffer_around_seeds,
            config.output_driver.extension()
        )),
        &buffer_features,
    )?;

    let sectors_by_code: HashMap<&str, &Sector> =
        output.sectors.iter().map(|sector| (sector.sector_code.as_str(), sector)).collect();

    let assignment_features: Vec<(MultiPolygon<f64>, Attributes)> = output
        .assignments
        .iter()
        .filter_map(|assignment| {
            sectors_by_code.get(assignment.sector_code.as_str()).map(|sector| {
                (
                    sector.geometry.clone(),
                    vec![
                        ("sector_code", AttributeValue::Text(sector.sector_code.clone())),
                        ("num_households", AttributeValue::Integer(sector.num_households as i64)),
                        ("num_registered", AttributeValue::Integer(sector.num_registered as i64)),
                        ("seed_id", AttributeValue::Integer(assignment.seed_id as i64)),
                        ("acdp_id", AttributeValue::Integer(assignment.acdp_id as i64)),
                    ],
                )
            })
        })
        .collect();

    let orphan_features: Vec<(MultiPolygon<f64>, Attributes)> = output
        .orphans
        .iter()
        .filter_map(|orphan| {
            sectors_by_code.get(orphan.sector_code.as_str()).map(|sector| {
                (
                    sector.geometry.clone(),
                    vec![
                        ("sector_code", AttributeValue::Text(sector.sector_code.clone())),
                        ("num_households", AttributeValue::Integer(sector.num_households as i64)),
                        ("num_registered", AttributeValue::Integer(sector.num_registered as i64)),
                    ],
                )
            })
        })
        .collect();

    write_layer(
        config.output_driver,
        &staging_dir.join(format!("{}.{}", config.output_names.sectors_by_seed, config.output_driver.extension())),
        &assignment_features,
    )?;
    write_layer(
        config.output_driver,
        &staging_dir.join(format!("{}.{}", config.output_names.orphan_sectors, config.output_driver.extension())),
        &orphan_features,
    )?;

    Ok(())
}

fn write_layer(driver: OutputDriver, path: &Path, features: &[(MultiPolygon<f64>, Attributes)]) -> Result<()> {
    match driver {
        OutputDriver::GeoJson => write_geojson(path, features),
        OutputDriver::Shapefile => write_shapefile(path, features),
        OutputDriver::GeoPackage => write_geopackage(path, features),
    }
}

fn write_geojson(path: &Path, features: &[(MultiPolygon<f64>, Attributes)]) -> Result<()> {
    let features: Vec<geojson::Feature> = features
        .iter()
        .map(|(geometry, attributes)| geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(geometry))),
            id: None,
            properties: Some(attributes_to_json(attributes)),
            foreign_members: None,
        })
        .collect();
    let collection = geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    fs::write(path, collection.to_string())?;
    Ok(())
}

fn attributes_to_json(attributes: &Attributes) -> serde_json::Map<String, serde_json::Value> {
    let mut map = serde_json::Map::new();
    for (name, value) in attributes {
        let json_value = match value {
            AttributeValue::Text(text) => serde_json::Value::String(text.clone()),
            AttributeValue::Integer(number) => serde_json::Value::from(*number),
            AttributeValue::Real(number) => serde_json::json!(number),
        };
        map.insert((*name).to_string(), json_value);
    }
    map
}

fn write_shapefile(path: &Path, features: &[(MultiPolygon<f64>, Attributes)]) -> Result<()> {
    let mut table_builder = shapefile::dbase::TableWriterBuilder::new();
    if let Some((_, attributes)) = features.first() {
        for (name, value) in attributes {
            let field_name = shapefile::dbase::FieldName::try_from(*name)
                .map_err(|e| AcdpError::Shapefile(e.to_string()))?;
            table_builder = match value {
                AttributeValue::Text(_) => table_builder.add_character_field(field_name, 254),
                AttributeValue::Integer(_) => table_builder.add_integer_field(field_name),
                AttributeValue::Real(_) => table_builder.add_double_field(field_name),
            };
        }
    }

    let mut writer = shapefile::Writer::from_path(path, table_builder)
        .map_err(|e| AcdpError::Shapefile(e.to_string()))?;

    for (geometry, attributes) in features {
        let shape = shapefile::Polygon::try_from(geometry.clone())
            .map_err(|e| AcdpError::Shapefile(e.to_string()))?;
        let mut record = shapefile::dbase::Record::default();
        for (name, value) in attributes {
            let field_value = match value {
                AttributeValue::Text(text) => shapefile::dbase::FieldValue::Character(Some(text.clone())),
                AttributeValue::Integer(number) => shapefile::dbase::FieldValue::Numeric(Some(*number as f64)),
                AttributeValue::Real(number) => shapefile::dbase::FieldValue::Numeric(Some(*number)),
            };
            record.insert((*name).to_string(), field_value);
        }
        writer
            .write_shape_and_record(&shape, &record)
            .map_err(|e| AcdpError::Shapefile(e.to_string()))?;
    }
    Ok(())
}

/// Minimal OGC GeoPackage writer. The reference GDAL-backed writer is not
/// available to this crate's dependency stack, so the GeoPackage layer is
/// built directly as a SQLite database carrying the minimal
/// `gpkg_contents`/`gpkg_geometry_columns`/`gpkg_spatial_ref_sys` bookkeeping
/// tables plus one feature table per layer, with geometries stored as
/// GeoPackage binary (a small header wrapping standard WKB).
fn write_geopackage(path: &Path, features: &[(MultiPolygon<f64>, Attributes)]) -> Result<()> {
    let connection = rusqlite::Connection::open(path).map_err(|e| AcdpError::GeoPackage(e.to_string()))?;
    let table_name = table_name_from_path(path);

    connection
        .execute_batch(
            "CREATE TABLE gpkg_spatial_ref_sys (
                srs_name TEXT NOT NULL, srs_id INTEGER PRIMARY KEY, organization TEXT NOT NULL,
                organization_coordsys_id INTEGER NOT NULL, definition TEXT NOT NULL, description TEXT);
            CREATE TABLE gpkg_contents (
                table_name TEXT PRIMARY KEY, data_type TEXT NOT NULL, identifier TEXT,
                description TEXT, last_change TEXT, min_x REAL, min_y REAL, max_x REAL, max_y REAL, srs_id INTEGER);
            CREATE TABLE gpkg_geometry_columns (
                table_name TEXT NOT NULL, column_name TEXT NOT NULL, geometry_type_name TEXT NOT NULL,
                srs_id INTEGER NOT NULL, z TINYINT NOT NULL, m TINYINT NOT NULL);",
        )
        .map_err(|e| AcdpError::GeoPackage(e.to_string()))?;

    connection
        .execute(
            &format!(
                "CREATE TABLE \"{table_name}\" (fid INTEGER PRIMARY KEY AUTOINCREMENT, geom BLOB, attributes TEXT)"
            ),
            [],
        )
        .map_err(|e| AcdpError::GeoPackage(e.to_string()))?;
    connection
        .execute(
            "INSERT INTO gpkg_geometry_columns VALUES (?1, 'geom', 'MULTIPOLYGON', 0, 0, 0)",
            [&table_name],
        )
        .map_err(|e| AcdpError::GeoPackage(e.to_string()))?;
    connection
        .execute(
            "INSERT INTO gpkg_contents (table_name, data_type, identifier, srs_id) VALUES (?1, 'features', ?1, 0)",
            [&table_name],
        )
        .map_err(|e| AcdpError::GeoPackage(e.to_string()))?;

    let mut statement = connection
        .prepare(&format!("INSERT INTO \"{table_name}\" (geom, attributes) VALUES (?1, ?2)"))
        .map_err(|e| AcdpError::GeoPackage(e.to_string()))?;
    for (geometry, attributes) in features {
        let blob = geopackage_binary(geometry);
        let attributes_json = serde_json::to_string(&attributes_to_json(attributes))?;
        statement
            .execute(rusqlite::params![blob, attributes_json])
            .map_err(|e| AcdpError::GeoPackage(e.to_string()))?;
    }
    Ok(())
}

fn table_name_from_path(path: &Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("layer").to_string()
}

/// Encode a GeoPackage binary blob: the 8-byte `GP` header (version 0, empty
/// flags, SRS id 0, no envelope) followed by a standard little-endian WKB
/// MultiPolygon.
fn geopackage_binary(geometry: &MultiPolygon<f64>) -> Vec<u8> {
    let mut blob = vec![b'G', b'P', 0, 0, 0, 0, 0, 0];
    blob.extend_from_slice(&wkb_multi_polygon(geometry));
    blob
}

fn wkb_multi_polygon(geometry: &MultiPolygon<f64>) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.push(1u8); // little-endian byte order marker
    buffer.extend_from_slice(&6u32.to_le_bytes()); // wkbMultiPolygon
    buffer.extend_from_slice(&(geometry.0.len() as u32).to_le_bytes());
    for polygon in &geometry.0 {
        buffer.extend_from_slice(&wkb_polygon(polygon));
    }
    buffer
}

fn wkb_polygon(polygon: &geo::Polygon<f64>) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.push(1u8);
    buffer.extend_from_slice(&3u32.to_le_bytes()); // wkbPolygon
    let ring_count = 1 + polygon.interiors().len();
    buffer.extend_from_slice(&(ring_count as u32).to_le_bytes());
    buffer.extend_from_slice(&wkb_ring(polygon.exterior()));
    for interior in polygon.interiors() {
        buffer.extend_from_slice(&wkb_ring(interior));
    }
    buffer
}

fn wkb_ring(ring: &geo::LineString<f64>) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&(ring.0.len() as u32).to_le_bytes());
    for coord in &ring.0 {
        buffer.extend_from_slice(&coord.x.to_le_bytes());
        buffer.extend_from_slice(&coord.y.to_le_bytes());
    }
    buffer
}

