#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Monthly bloom-map generation.
//!
//! Drives the whole pipeline for each calendar month: filter the
//! indexed records to species flowering that month, group them by H3
//! cell, blend each cell's colours by prominence, and write the
//! requested PNG and/or GeoJSON outputs. A month with no qualifying
//! cells produces no file — it is logged and skipped, never an error.

pub mod aggregate;
pub mod blend;
pub mod export;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use bloom_map_flora_models::{Month, TreeRecord};
use bloom_map_hexgrid::Resolution;
use bloom_map_render::{CellShape, RenderConfig};
use indicatif::ProgressBar;
use strum_macros::{Display, EnumString};

use crate::aggregate::CellBloom;
use crate::blend::{BlendWeights, ProminenceBlender};

/// Errors that can occur during output generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// I/O error writing an output file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A census record carried a coordinate H3 cannot index.
    #[error("invalid coordinate in census data: {0}")]
    Coordinate(#[from] bloom_map_hexgrid::InvalidCoordinateError),

    /// GeoJSON serialization failed.
    #[error("GeoJSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// PNG rasterization or write failed.
    #[error("render error: {0}")]
    Render(#[from] bloom_map_render::RenderError),
}

/// Which output files to produce for each month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Rendered PNG map only.
    Png,
    /// GeoJSON geometry file only.
    Geojson,
    /// Both PNG and GeoJSON.
    Both,
}

impl OutputFormat {
    /// Whether this format includes the rendered PNG.
    #[must_use]
    pub const fn wants_png(self) -> bool {
        matches!(self, Self::Png | Self::Both)
    }

    /// Whether this format includes the GeoJSON geometry file.
    #[must_use]
    pub const fn wants_geojson(self) -> bool {
        matches!(self, Self::Geojson | Self::Both)
    }
}

/// Run configuration shared by all months.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// H3 resolution every record is indexed at.
    pub resolution: Resolution,
    /// Which per-month outputs to write.
    pub output_format: OutputFormat,
    /// Directory the per-month outputs are written into.
    pub output_dir: PathBuf,
    /// Prominence blend weights.
    pub weights: BlendWeights,
    /// Raster settings for the PNG output.
    pub render: RenderConfig,
}

/// Generates outputs for all twelve months.
///
/// Returns the per-month cell counts; zero marks a skipped month.
///
/// # Errors
///
/// Returns an error if a record carries an invalid coordinate or an
/// output file cannot be written.
pub fn run(
    records: &[TreeRecord],
    config: &GenerateConfig,
    progress: &ProgressBar,
) -> Result<Vec<(Month, usize)>, GenerateError> {
    std::fs::create_dir_all(&config.output_dir)?;

    let indexed = aggregate::index_records(records, config.resolution)?;
    let blender = ProminenceBlender::new(config.weights);

    let mut summary = Vec::with_capacity(Month::ALL.len());
    for &month in Month::ALL {
        progress.set_message(month.to_string());
        log::info!("Processing month: {month}");

        let blooms = aggregate::aggregate_month(&indexed, month, &blender);
        if blooms.is_empty() {
            log::info!("No trees flowering in {month}, skipping");
        } else {
            write_month_outputs(&blooms, month, config)?;
            log::info!("Created {} cells for {month}", blooms.len());
        }

        summary.push((month, blooms.len()));
        progress.inc(1);
    }

    Ok(summary)
}

/// Writes the month's PNG and/or GeoJSON files.
fn write_month_outputs(
    blooms: &[CellBloom],
    month: Month,
    config: &GenerateConfig,
) -> Result<(), GenerateError> {
    let resolution = u8::from(config.resolution);

    if config.output_format.wants_png() {
        let path = output_path(&config.output_dir, month, resolution, "png");
        let shapes: Vec<CellShape> = blooms
            .iter()
            .map(|bloom| CellShape {
                boundary: bloom_map_hexgrid::cell_boundary(bloom.cell),
                fill: bloom.colour,
            })
            .collect();
        bloom_map_render::save_png(&shapes, &config.render, &path)?;
        log::info!("Saved PNG to '{}'", path.display());
    }

    if config.output_format.wants_geojson() {
        let path = output_path(&config.output_dir, month, resolution, "geojson");
        let collection = export::month_feature_collection(blooms, month, resolution);
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(writer, &collection)?;
        log::info!("Saved GeoJSON to '{}'", path.display());
    }

    Ok(())
}

/// Output file path for one month and format.
fn output_path(dir: &Path, month: Month, resolution: u8, extension: &str) -> PathBuf {
    dir.join(format!(
        "h3_tree_distribution_{month}_resolution_{resolution}.{extension}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_formats_select_file_kinds() {
        assert!(OutputFormat::Png.wants_png());
        assert!(!OutputFormat::Png.wants_geojson());
        assert!(!OutputFormat::Geojson.wants_png());
        assert!(OutputFormat::Geojson.wants_geojson());
        assert!(OutputFormat::Both.wants_png());
        assert!(OutputFormat::Both.wants_geojson());
    }

    #[test]
    fn output_paths_name_month_and_resolution() {
        let path = output_path(Path::new("out"), Month::Apr, 11, "geojson");
        assert_eq!(
            path,
            Path::new("out/h3_tree_distribution_Apr_resolution_11.geojson")
        );
    }

    #[test]
    fn output_format_parses_from_lowercase() {
        assert_eq!("png".parse::<OutputFormat>(), Ok(OutputFormat::Png));
        assert_eq!("both".parse::<OutputFormat>(), Ok(OutputFormat::Both));
        assert_eq!(OutputFormat::Geojson.to_string(), "geojson");
    }
}
