//! Monthly filter → group → blend aggregation.
//!
//! Records are indexed to their hex cell once per run; each month is
//! then aggregated independently, so a month never reads another
//! month's state.

use std::collections::BTreeMap;

use bloom_map_flora_models::{FlowerColor, Month, Prominence, TreeRecord};
use bloom_map_hexgrid::{CellIndex, InvalidCoordinateError, Resolution};

use crate::blend::ProminenceBlender;

/// A tree record with its precomputed H3 cell.
#[derive(Debug, Clone)]
pub struct IndexedRecord {
    /// The joined census record.
    pub record: TreeRecord,
    /// Cell the record falls in at the run resolution.
    pub cell: CellIndex,
}

/// Aggregated result for one hex cell in one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellBloom {
    /// Cell the contributing trees fall in.
    pub cell: CellIndex,
    /// Prominence-weighted blend of the contributing flower colours.
    pub colour: FlowerColor,
    /// Contributing species names, deduplicated, in first-occurrence
    /// order.
    pub species: Vec<String>,
}

/// Indexes every record to its cell at the run resolution.
///
/// # Errors
///
/// Returns an error if any record carries an invalid coordinate.
pub fn index_records(
    records: &[TreeRecord],
    resolution: Resolution,
) -> Result<Vec<IndexedRecord>, InvalidCoordinateError> {
    records
        .iter()
        .map(|record| {
            let cell =
                bloom_map_hexgrid::cell_for_point(record.latitude, record.longitude, resolution)?;
            Ok(IndexedRecord {
                record: record.clone(),
                cell,
            })
        })
        .collect()
}

/// Aggregates one month: filters to records flowering in `month`,
/// groups them by cell, and blends each group.
///
/// A record without a prominence still counts toward its cell's species
/// list but never contributes to the blend; cells where no record
/// carries a prominence produce no bloom at all. An empty return means
/// the month has no data and the caller skips its outputs.
#[must_use]
pub fn aggregate_month(
    records: &[IndexedRecord],
    month: Month,
    blender: &ProminenceBlender,
) -> Vec<CellBloom> {
    let mut groups: BTreeMap<CellIndex, Vec<&IndexedRecord>> = BTreeMap::new();
    for indexed in records {
        if indexed.record.species.calendar.flowers_in(month) {
            groups.entry(indexed.cell).or_default().push(indexed);
        }
    }

    let mut blooms = Vec::new();
    for (cell, members) in groups {
        let entries: Vec<(FlowerColor, Prominence)> = members
            .iter()
            .filter_map(|member| {
                let species = &member.record.species;
                species
                    .prominence
                    .map(|prominence| (species.colour, prominence))
            })
            .collect();

        let Some(colour) = blender.blend(&entries) else {
            continue;
        };

        blooms.push(CellBloom {
            cell,
            colour,
            species: distinct_species(&members),
        });
    }

    blooms
}

/// First-occurrence-ordered deduplicated species names.
fn distinct_species(members: &[&IndexedRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for member in members {
        let name = &member.record.species.name;
        if !names.iter().any(|existing| existing == name) {
            names.push(name.clone());
        }
    }
    names
}
