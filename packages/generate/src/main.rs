#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI tool generating monthly bloom maps from tree census data.
//!
//! Reads a tree census (GeoJSON points) and a species metadata table
//! (CSV), bins every tree into an H3 cell, and writes one PNG map
//! and/or GeoJSON file per calendar month with prominence-blended
//! flower colours per cell.

use std::path::PathBuf;

use bloom_map_flora_models::Month;
use bloom_map_generate::blend::BlendWeights;
use bloom_map_generate::{GenerateConfig, OutputFormat};
use bloom_map_hexgrid::Resolution;
use bloom_map_render::RenderConfig;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser)]
#[command(name = "bloom_map_generate", about = "Monthly bloom map generator")]
struct Cli {
    /// Path to the tree census GeoJSON (Point features with a TreeName
    /// property).
    #[arg(long)]
    tree_census_path: PathBuf,

    /// Path to the species metadata CSV (TreeName, months, colour,
    /// prominence).
    #[arg(long)]
    species_data_path: PathBuf,

    /// H3 resolution for spatial binning (0-15).
    #[arg(long, default_value_t = 11)]
    resolution: u8,

    /// Which output files to produce per month.
    #[arg(long, value_enum, default_value_t = OutputFormat::Both)]
    output_format: OutputFormat,

    /// Directory the per-month outputs are written into.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let resolution = Resolution::try_from(cli.resolution)?;

    let records =
        bloom_map_ingest::load_records(&cli.tree_census_path, &cli.species_data_path)?;

    let config = GenerateConfig {
        resolution,
        output_format: cli.output_format,
        output_dir: cli.output_dir,
        weights: BlendWeights::default(),
        render: RenderConfig::default(),
    };

    let progress = months_bar();
    let summary = bloom_map_generate::run(&records, &config, &progress)?;
    progress.finish_with_message("done");

    let produced = summary.iter().filter(|&&(_, cells)| cells > 0).count();
    log::info!("Produced outputs for {produced} of {} months", summary.len());

    Ok(())
}

/// Progress bar over the twelve calendar months.
fn months_bar() -> ProgressBar {
    let bar = ProgressBar::new(Month::ALL.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{msg:>4} {wide_bar:.green/dim} {pos}/{len} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    bar
}
