#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Census and species-table ingestion.
//!
//! Reads the two input files, validates every row at this boundary, and
//! joins census points with species metadata on species name. Downstream
//! stages only ever see validated, strongly-typed records: malformed
//! flowering ranges, colours, and prominence values abort here with the
//! offending species named, while rows that merely lack data (no
//! flowering range, no colour, no join partner) are dropped with a
//! logged count.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;

use bloom_map_flora_models::{
    CalendarParseError, ColorParseError, FlowerColor, FloweringCalendar, Prominence,
    SpeciesAttributes, TreeRecord,
};
use geojson::{GeoJson, JsonValue};
use serde::Deserialize;

/// Errors that can occur while reading and validating input files.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// I/O error reading an input file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The census file failed to parse as `GeoJSON`.
    #[error("census GeoJSON parse error: {0}")]
    Geojson(#[from] geojson::Error),

    /// The species table failed to parse as CSV.
    #[error("species CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// The census file parsed but is not a `FeatureCollection`.
    #[error("census file is not a GeoJSON FeatureCollection")]
    NotAFeatureCollection,

    /// A species row carried a flowering range that does not parse.
    #[error("species '{species}': {source}")]
    BadFloweringRange {
        /// Name of the offending species.
        species: String,
        /// The underlying parse failure.
        #[source]
        source: CalendarParseError,
    },

    /// A species row carried a colour that does not parse.
    #[error("species '{species}': {source}")]
    BadColour {
        /// Name of the offending species.
        species: String,
        /// The underlying parse failure.
        #[source]
        source: ColorParseError,
    },

    /// A species row carried a prominence outside low/med/high.
    #[error("species '{species}': unrecognized prominence '{value}': expected low, med, or high")]
    UnrecognizedProminence {
        /// Name of the offending species.
        species: String,
        /// The rejected prominence text.
        value: String,
    },
}

/// Raw species CSV row, prior to validation.
#[derive(Debug, Deserialize)]
struct RawSpeciesRow {
    #[serde(rename = "TreeName")]
    tree_name: String,
    months: Option<String>,
    colour: Option<String>,
    prominence: Option<String>,
}

/// Reads and validates the species metadata table.
///
/// Rows missing a flowering range or colour are dropped (they can never
/// be assigned to a month or contribute to a blend); a later row for an
/// already-seen species replaces the earlier one with a warning.
///
/// # Errors
///
/// Returns an error if the CSV does not parse, or if any kept row
/// carries a malformed flowering range, a malformed colour, or an
/// unrecognized prominence.
pub fn read_species_table(
    reader: impl io::Read,
) -> Result<HashMap<String, Arc<SpeciesAttributes>>, IngestError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut species = HashMap::new();
    let mut dropped = 0_usize;

    for row in csv_reader.deserialize::<RawSpeciesRow>() {
        let row = row?;

        let (Some(months), Some(colour)) = (non_empty(row.months), non_empty(row.colour)) else {
            dropped += 1;
            continue;
        };

        let attributes = validate_species(row.tree_name, &months, &colour, row.prominence)?;
        let name = attributes.name.clone();
        if species.insert(name.clone(), Arc::new(attributes)).is_some() {
            log::warn!("Duplicate species row for '{name}', keeping the later one");
        }
    }

    if dropped > 0 {
        log::info!("Dropped {dropped} species rows missing a flowering range or colour");
    }

    Ok(species)
}

/// Validates one raw species row into [`SpeciesAttributes`].
fn validate_species(
    name: String,
    months: &str,
    colour: &str,
    prominence: Option<String>,
) -> Result<SpeciesAttributes, IngestError> {
    let calendar = FloweringCalendar::from_range_spec(months).map_err(|source| {
        IngestError::BadFloweringRange {
            species: name.clone(),
            source,
        }
    })?;

    let colour = FlowerColor::from_hex(colour).map_err(|source| IngestError::BadColour {
        species: name.clone(),
        source,
    })?;

    let prominence = match non_empty(prominence) {
        None => None,
        Some(value) => Some(value.parse::<Prominence>().map_err(|_| {
            IngestError::UnrecognizedProminence {
                species: name.clone(),
                value,
            }
        })?),
    };

    Ok(SpeciesAttributes {
        name,
        calendar,
        prominence,
        colour,
    })
}

/// Treats blank cells as missing.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Reads census `Point` features and joins them against the species
/// table.
///
/// Features without a `Point` geometry or a `TreeName` property are
/// skipped (the join key is mandatory), and points whose species has no
/// metadata row are dropped by the inner join; all skip counts are
/// logged.
///
/// # Errors
///
/// Returns an error if the input does not parse as `GeoJSON` or is not
/// a `FeatureCollection`.
pub fn read_census(
    mut reader: impl io::Read,
    species: &HashMap<String, Arc<SpeciesAttributes>>,
) -> Result<Vec<TreeRecord>, IngestError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let GeoJson::FeatureCollection(collection) = text.parse::<GeoJson>()? else {
        return Err(IngestError::NotAFeatureCollection);
    };

    let mut records = Vec::new();
    let mut non_point = 0_usize;
    let mut missing_key = 0_usize;
    let mut unmatched = 0_usize;

    for feature in collection.features {
        let Some((longitude, latitude)) = point_position(feature.geometry.as_ref()) else {
            non_point += 1;
            continue;
        };
        let Some(name) = feature.property("TreeName").and_then(JsonValue::as_str) else {
            missing_key += 1;
            continue;
        };
        let Some(attributes) = species.get(name) else {
            unmatched += 1;
            continue;
        };

        records.push(TreeRecord {
            species: Arc::clone(attributes),
            latitude,
            longitude,
        });
    }

    if non_point > 0 {
        log::info!("Skipped {non_point} census features without Point geometry");
    }
    if missing_key > 0 {
        log::info!("Skipped {missing_key} census features without a TreeName property");
    }
    if unmatched > 0 {
        log::info!("Dropped {unmatched} census trees with no species metadata row");
    }

    Ok(records)
}

/// Extracts (longitude, latitude) from a `Point` geometry.
fn point_position(geometry: Option<&geojson::Geometry>) -> Option<(f64, f64)> {
    match geometry.map(|geometry| &geometry.value) {
        Some(geojson::Value::Point(position)) if position.len() >= 2 => {
            Some((position[0], position[1]))
        }
        _ => None,
    }
}

/// Reads both input files and joins them into the in-memory record set.
///
/// # Errors
///
/// Returns an error if either file cannot be opened or fails
/// validation.
pub fn load_records(
    census_path: &Path,
    species_path: &Path,
) -> Result<Vec<TreeRecord>, IngestError> {
    let species = read_species_table(BufReader::new(File::open(species_path)?))?;
    log::info!("Loaded {} species with flowering metadata", species.len());

    let records = read_census(BufReader::new(File::open(census_path)?), &species)?;
    log::info!("Joined {} census trees against species metadata", records.len());

    Ok(records)
}
