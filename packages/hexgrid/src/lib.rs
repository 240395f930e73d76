#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! H3 cell indexing for WGS84 tree coordinates.
//!
//! Thin seam over `h3o`: maps points to cells at the run's single
//! resolution and maps cells back to boundary polygons for rendering and
//! export. Cell indices are the grouping key for monthly aggregation —
//! the same (latitude, longitude, resolution) always produces the same
//! index, so grouping by cell is a true partition of the input points.

use geo::{Coord, LineString, Polygon};
use h3o::LatLng;

pub use h3o::{CellIndex, Resolution};

/// Error returned when a census coordinate cannot be indexed.
#[derive(Debug, thiserror::Error)]
#[error("invalid WGS84 coordinate (lat {latitude}, lng {longitude}): {source}")]
pub struct InvalidCoordinateError {
    /// Latitude of the rejected coordinate.
    pub latitude: f64,
    /// Longitude of the rejected coordinate.
    pub longitude: f64,
    #[source]
    source: h3o::error::InvalidLatLng,
}

/// Maps a WGS84 point to its H3 cell at `resolution`.
///
/// # Errors
///
/// Returns an error if the coordinate is not a finite WGS84 position.
pub fn cell_for_point(
    latitude: f64,
    longitude: f64,
    resolution: Resolution,
) -> Result<CellIndex, InvalidCoordinateError> {
    let coord = LatLng::new(latitude, longitude).map_err(|source| InvalidCoordinateError {
        latitude,
        longitude,
        source,
    })?;
    Ok(coord.to_cell(resolution))
}

/// Returns the cell's boundary as a closed polygon.
///
/// Vertices follow H3's native boundary traversal but are re-ordered
/// per vertex to (x=longitude, y=latitude) for planar-geometry
/// consumers; the exterior ring is closed.
#[must_use]
pub fn cell_boundary(cell: CellIndex) -> Polygon<f64> {
    let ring: Vec<Coord<f64>> = cell
        .boundary()
        .iter()
        .map(|vertex| Coord {
            x: vertex.lng(),
            y: vertex.lat(),
        })
        .collect();

    // Polygon::new closes the exterior ring.
    Polygon::new(LineString::new(ring), Vec::new())
}
