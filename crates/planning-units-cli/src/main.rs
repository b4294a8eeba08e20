//! pugrid - build conservation planning-unit grids from SVG study regions
//!
//! Usage:
//!   pugrid build <region.svg> --area <km2> [--shape hexagon] [--exclude land.svg]
//!   pugrid inspect <region.svg> [--area <km2>] [--shape hexagon]
//!   pugrid shapes

mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use planning_units::CellShape;

use cli::common::OutputFormat;

/// Build square or hexagonal planning units over a study region.
#[derive(Parser, Debug)]
#[command(name = "pugrid", author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate planning units for a region
    Build(BuildArgs),
    /// Validate a region and report its extent and lattice size
    Inspect(InspectArgs),
    /// List available cell shapes
    Shapes,
}

/// Arguments for `pugrid build`. Flags override values from `--config`.
#[derive(clap::Args, Debug, Default)]
pub struct BuildArgs {
    /// SVG file holding the planning region
    #[arg(value_name = "REGION_SVG")]
    pub region: Option<PathBuf>,

    /// YAML grid configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// SVG file holding exclusion polygons (e.g. landmass)
    #[arg(short = 'x', long, value_name = "SVG")]
    pub exclude: Option<PathBuf>,

    /// Only use region polygons from this group (or element) ID
    #[arg(long, value_name = "ID")]
    pub region_layer: Option<String>,

    /// Use exclusion polygons from this group (or element) ID
    #[arg(long, value_name = "ID")]
    pub exclusion_layer: Option<String>,

    /// Target area of each planning unit, in km²
    #[arg(short, long, value_name = "KM2")]
    pub area: Option<f64>,

    /// Cell shape: square or hexagon
    #[arg(short, long, value_name = "SHAPE")]
    pub shape: Option<CellShape>,

    /// Metres per SVG user unit
    #[arg(long, value_name = "FACTOR")]
    pub meters_per_unit: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output file (stdout when omitted; required for png)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for `pugrid inspect`.
#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// SVG file holding the planning region
    #[arg(value_name = "REGION_SVG")]
    pub region: PathBuf,

    /// Only use region polygons from this group (or element) ID
    #[arg(long, value_name = "ID")]
    pub region_layer: Option<String>,

    /// Target area used to size the candidate lattice, in km²
    #[arg(short, long, value_name = "KM2", default_value_t = 1.0)]
    pub area: f64,

    /// Cell shape used to size the candidate lattice
    #[arg(short, long, value_name = "SHAPE", default_value = "hexagon")]
    pub shape: CellShape,

    /// Metres per SVG user unit
    #[arg(long, value_name = "FACTOR", default_value_t = 1.0)]
    pub meters_per_unit: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build(args) => cli::cmd_build(args),
        Command::Inspect(args) => cli::cmd_inspect(args),
        Command::Shapes => {
            cli::cmd_shapes();
            Ok(())
        }
    }
}

/// Log to stderr so stdout stays clean for grid output.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
