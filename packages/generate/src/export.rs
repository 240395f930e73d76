//! GeoJSON assembly for the per-month cell aggregates.
//!
//! One polygon feature per cell, carrying the attributes web maps style
//! and label by: the cell index, the blended colour, the contributing
//! species, and the run's month and resolution as constant columns.
//! Coordinates are WGS84 (longitude, latitude) per the GeoJSON spec.

use bloom_map_flora_models::Month;
use geojson::{Feature, FeatureCollection, JsonObject};
use serde_json::json;

use crate::aggregate::CellBloom;

/// Builds the month's `FeatureCollection`.
#[must_use]
pub fn month_feature_collection(
    blooms: &[CellBloom],
    month: Month,
    resolution: u8,
) -> FeatureCollection {
    let features = blooms
        .iter()
        .map(|bloom| {
            let boundary = bloom_map_hexgrid::cell_boundary(bloom.cell);
            let geometry = geojson::Geometry::new(geojson::Value::from(&boundary));

            let mut properties = JsonObject::new();
            properties.insert("h3_index".to_string(), json!(bloom.cell.to_string()));
            properties.insert("colour_hex".to_string(), json!(bloom.colour.to_string()));
            properties.insert("tree_species".to_string(), json!(bloom.species));
            properties.insert("prominence".to_string(), json!("blended"));
            properties.insert("month".to_string(), json!(month.to_string()));
            properties.insert("resolution".to_string(), json!(resolution));

            Feature {
                bbox: None,
                geometry: Some(geometry),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
