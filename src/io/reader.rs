//! Input Reader (§6.1): loads the seeds, sectors and districts layers from
//! shapefile or GeoJSON, applying each layer's attribute rename map and
//! failing fast on a missing required attribute.

use std::collections::HashMap;
use std::convert::TryFrom;
use std::path::Path;

use geo::{MultiPolygon, Point};

use crate::config::{DISTRICT_RENAME_MAP, SECTOR_RENAME_MAP, SEED_RENAME_MAP};
use crate::error::{AcdpError, Result};
use crate::types::{District, Seed, Sector};

/// A single attribute value, normalised from whichever source format
/// (dbase field, GeoJSON JSON value) it came from.
#[derive(Debug, Clone)]
enum AttributeValue {
    Text(String),
    Number(f64),
}

impl AttributeValue {
    fn as_text(&self) -> String {
        match self {
            AttributeValue::Text(s) => s.clone(),
            AttributeValue::Number(n) => n.to_string(),
        }
    }

    fn as_u64(&self) -> Option<u64> {
        match self {
            AttributeValue::Number(n) => Some(n.round().max(0.0) as u64),
            AttributeValue::Text(s) => s.parse().ok(),
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Number(n) => Some(n.round() as i64),
            AttributeValue::Text(s) => s.parse().ok(),
        }
    }
}

/// One record pulled out of a layer file: a geometry plus its renamed
/// attribute table.
struct RawRecord {
    geometry: MultiPolygon<f64>,
    attributes: HashMap<String, AttributeValue>,
}

/// Load `path` (a `.shp` or `.geojson`/`.json` file), rename its attributes
/// per `rename_map`, and return one [`RawRecord`] per feature.
fn load_layer(path: &Path, layer_name: &str, rename_map: &[(&str, &str)]) -> Result<Vec<RawRecord>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("shp") => load_shapefile(path, layer_name, rename_map),
        Some("geojson") | Some("json") => load_geojson(path, layer_name, rename_map),
        Some(other) => Err(AcdpError::UnsupportedOutputDriver {
            driver: other.to_string(),
        }),
        None => Err(AcdpError::InputMissing {
            layer: layer_name.to_string(),
        }),
    }
}

fn rename(rename_map: &[(&str, &str)], original: &str) -> String {
    rename_map
        .iter()
        .find(|(from, _)| *from == original)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| original.to_string())
}

fn load_shapefile(path: &Path, layer_name: &str, rename_map: &[(&str, &str)]) -> Result<Vec<RawRecord>> {
    let mut reader =
        shapefile::Reader::from_path(path).map_err(|e| AcdpError::Shapefile(e.to_string()))?;

    let mut records = Vec::new();
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.map_err(|e| AcdpError::Shapefile(e.to_string()))?;
        let geometry = geo::Geometry::<f64>::try_from(shape)
            .map_err(|e| AcdpError::InvalidGeometry {
                sector_code: layer_name.to_string(),
                reason: e.to_string(),
            })
            .and_then(|geometry| match geometry {
                geo::Geometry::MultiPolygon(multi_polygon) => Ok(multi_polygon),
                other => Err(AcdpError::InvalidGeometry {
                    sector_code: layer_name.to_string(),
                    reason: format!("expected a polygon geometry, found {other:?}"),
                }),
            })?;

        let mut attributes = HashMap::new();
        for (name, value) in record.into_iter() {
            let canonical = rename(rename_map, &name);
            let value = match value {
                shapefile::dbase::FieldValue::Character(Some(text)) => AttributeValue::Text(text),
                shapefile::dbase::FieldValue::Numeric(Some(number)) => AttributeValue::Number(number),
                shapefile::dbase::FieldValue::Float(Some(number)) => AttributeValue::Number(number as f64),
                shapefile::dbase::FieldValue::Integer(number) => AttributeValue::Number(number as f64),
                _ => continue,
            };
            attributes.insert(canonical, value);
        }
        records.push(RawRecord { geometry, attributes });
    }
    Ok(records)
}

fn load_geojson(path: &Path, layer_name: &str, rename_map: &[(&str, &str)]) -> Result<Vec<RawRecord>> {
    let raw = std::fs::read_to_string(path)?;
    let geojson = raw.parse::<geojson::GeoJson>().map_err(|e| AcdpError::InvalidGeometry {
        sector_code: layer_name.to_string(),
        reason: e.to_string(),
    })?;

    let features = match geojson {
        geojson::GeoJson::FeatureCollection(collection) => collection.features,
        geojson::GeoJson::Feature(feature) => vec![feature],
        geojson::GeoJson::Geometry(_) => {
            return Err(AcdpError::SchemaMismatch {
                layer: layer_name.to_string(),
                attribute: "features".to_string(),
            })
        }
    };

    let mut records = Vec::new();
    for feature in features {
        let Some(geometry) = feature.geometry.as_ref() else {
            continue;
        };
        let parsed = geo_types::Geometry::<f64>::try_from(geometry.clone()).map_err(|e| AcdpError::InvalidGeometry {
            sector_code: layer_name.to_string(),
            reason: e.to_string(),
        })?;
        let multi_polygon = to_multi_polygon(parsed);

        let mut attributes = HashMap::new();
        if let Some(properties) = feature.properties {
            for (name, value) in properties {
                let canonical = rename(rename_map, &name);
                let value = match value {
                    serde_json::Value::String(text) => AttributeValue::Text(text),
                    serde_json::Value::Number(number) => {
                        AttributeValue::Number(number.as_f64().unwrap_or_default())
                    }
                    _ => continue,
                };
                attributes.insert(canonical, value);
            }
        }
        records.push(RawRecord {
            geometry: multi_polygon,
            attributes,
        });
    }
    Ok(records)
}

fn to_multi_polygon(geometry: geo_types::Geometry<f64>) -> MultiPolygon<f64> {
    match geometry {
        geo_types::Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
        geo_types::Geometry::MultiPolygon(multi) => multi,
        _ => MultiPolygon::new(vec![]),
    }
}

fn required_text(attributes: &HashMap<String, AttributeValue>, layer: &str, field: &str) -> Result<String> {
    attributes
        .get(field)
        .map(AttributeValue::as_text)
        .ok_or_else(|| AcdpError::SchemaMismatch {
            layer: layer.to_string(),
            attribute: field.to_string(),
        })
}

fn required_u64(attributes: &HashMap<String, AttributeValue>, layer: &str, field: &str) -> Result<u64> {
    attributes
        .get(field)
        .and_then(AttributeValue::as_u64)
        .ok_or_else(|| AcdpError::SchemaMismatch {
            layer: layer.to_string(),
            attribute: field.to_string(),
        })
}

/// Load the seeds layer (§3 "Seed"). The seed's point is taken from the
/// geometry's centroid-of-first-ring vertex when the source stores seeds as
/// degenerate single-vertex polygons, which is how the reference shapefiles
/// represent point layers without a dedicated point shape reader path.
pub fn read_seeds(path: &Path) -> Result<Vec<Seed>> {
    let records = load_layer(path, "seeds", SEED_RENAME_MAP)?;
    if records.is_empty() {
        return Err(AcdpError::InputMissing {
            layer: "seeds".to_string(),
        });
    }

    let mut seeds = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let district_code = required_text(&record.attributes, "seeds", "district_code")?;
        let priority = record
            .attributes
            .get("priority")
            .and_then(AttributeValue::as_i64)
            .unwrap_or(index as i64);
        let point = record
            .geometry
            .0
            .first()
            .and_then(|polygon| polygon.exterior().0.first())
            .map(|coord| Point::new(coord.x, coord.y))
            .ok_or_else(|| AcdpError::InvalidGeometry {
                sector_code: format!("seed #{index}"),
                reason: "seed geometry has no vertices to derive a point from".to_string(),
            })?;

        seeds.push(Seed {
            seed_id: index as u64,
            district_code,
            priority,
            point,
        });
    }
    Ok(seeds)
}

/// Load the sectors layer (§3 "Sector").
pub fn read_sectors(path: &Path) -> Result<Vec<Sector>> {
    let records = load_layer(path, "sectors", SECTOR_RENAME_MAP)?;
    if records.is_empty() {
        return Err(AcdpError::InputMissing {
            layer: "sectors".to_string(),
        });
    }

    let mut sectors = Vec::with_capacity(records.len());
    for record in records {
        let sector_code = required_text(&record.attributes, "sectors", "sector_code")?;
        let district_code = required_text(&record.attributes, "sectors", "district_code")?;
        let num_households = required_u64(&record.attributes, "sectors", "num_households")?;
        let num_registered = record
            .attributes
            .get("num_registered")
            .and_then(AttributeValue::as_u64)
            .unwrap_or(0);

        sectors.push(Sector {
            sector_code,
            district_code,
            num_households,
            num_registered,
            geometry: record.geometry,
        });
    }
    Ok(sectors)
}

/// Load the districts layer (§3 "District").
pub fn read_districts(path: &Path) -> Result<Vec<District>> {
    let records = load_layer(path, "districts", DISTRICT_RENAME_MAP)?;
    if records.is_empty() {
        return Err(AcdpError::InputMissing {
            layer: "districts".to_string(),
        });
    }

    let mut districts = Vec::with_capacity(records.len());
    for record in records {
        let district_code = required_text(&record.attributes, "districts", "district_code")?;
        districts.push(District {
            district_code,
            geometry: record.geometry,
        });
    }
    Ok(districts)
}
