#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for building area reports.
//!
//! Reference data (town boundaries and zoning tables) is loaded once at
//! startup. `report` builds a single report from a JSON request file and
//! prints it as JSON; `check-data` and `towns` inspect the loaded
//! reference data.

mod request;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use area_report_report::{AreaReportBuilder, EngineConfig, ReferenceData};
use area_report_spatial::{GeoBoundaryIndex, parse_county_bounds};
use area_report_zoning::ZoningCodeResolver;
use clap::{Parser, Subcommand};

use crate::request::ReportRequest;

#[derive(Parser)]
#[command(name = "area_report", about = "Area classification and report tool")]
struct Cli {
    /// Town boundaries `GeoJSON` to use instead of the bundled outlines
    #[arg(long, global = true)]
    boundaries: Option<PathBuf>,

    /// County bounds TOML to use with `--boundaries`
    #[arg(long, global = true, requires = "boundaries")]
    county: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a report from a JSON request file
    Report {
        /// Request file with the address, location, and upstream data
        #[arg(long)]
        request: PathBuf,
        /// Engine configuration TOML (thresholds)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Load the reference data and check it for overlapping towns
    CheckData,
    /// List towns and their catalogued zoning codes
    Towns,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();

    let cli = Cli::parse();
    let reference = load_reference(cli.boundaries.as_deref(), cli.county.as_deref())?;

    match cli.command {
        Commands::Report {
            request,
            config,
            pretty,
        } => {
            let config = match config {
                Some(path) => EngineConfig::load(&path)?,
                None => EngineConfig::default(),
            };
            let builder = AreaReportBuilder::new(Arc::new(reference), config)?;

            let contents = std::fs::read_to_string(&request)?;
            let request: ReportRequest = serde_json::from_str(&contents)?;
            let (query, upstream) = request.into_parts();

            let report = builder.build(&query, &upstream)?;
            let json = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{json}");
        }
        Commands::CheckData => {
            let county = reference.boundaries.county();
            println!(
                "County: {} (lat {}..{}, lon {}..{})",
                county.name, county.min_lat, county.max_lat, county.min_lon, county.max_lon
            );
            println!("Towns:  {}", reference.boundaries.towns().len());
            println!("Zoning tables: {}", reference.zoning.tables().count());

            let warnings = reference.boundaries.check_integrity();
            if warnings.is_empty() {
                println!("No overlapping towns.");
            } else {
                for warning in &warnings {
                    println!("OVERLAP: {warning}");
                }
                return Err(format!("{} overlapping town pair(s)", warnings.len()).into());
            }

            for town in reference.boundaries.towns() {
                if reference.zoning.table(town).is_none() {
                    log::warn!("{town} has a boundary but no zoning table");
                }
            }
        }
        Commands::Towns => {
            println!("{:<16} CODES", "TOWN");
            println!("{}", "-".repeat(60));
            for town in reference.boundaries.towns() {
                let codes = reference.zoning.table(town).map_or_else(
                    || "(no zoning table)".to_string(),
                    |table| {
                        table
                            .entries()
                            .map(|entry| entry.code.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    },
                );
                println!("{town:<16} {codes}");
            }
        }
    }

    Ok(())
}

fn load_reference(
    boundaries: Option<&Path>,
    county: Option<&Path>,
) -> Result<ReferenceData, Box<dyn std::error::Error>> {
    let Some(path) = boundaries else {
        return Ok(ReferenceData::embedded()?);
    };

    let county = match county {
        Some(county_path) => parse_county_bounds(&std::fs::read_to_string(county_path)?)?,
        None => GeoBoundaryIndex::embedded()?.county().clone(),
    };
    let index = GeoBoundaryIndex::from_geojson(county, &std::fs::read_to_string(path)?)?;

    Ok(ReferenceData {
        boundaries: index,
        zoning: ZoningCodeResolver::embedded()?,
    })
}
