//! CLI command implementations.
//!
//! This module contains the implementations for the CLI subcommands:
//! - `build` - Generate planning units for a region
//! - `inspect` - Validate a region and report lattice size
//! - `shapes` - List available cell shapes

pub mod build;
pub mod common;
pub mod config;
pub mod inspect;
pub mod output;

pub use build::cmd_build;
pub use inspect::cmd_inspect;

use planning_units::CellShape;

/// Execute the shapes command.
pub fn cmd_shapes() {
    println!("Available cell shapes:");
    for shape in CellShape::all() {
        println!("  {:<10} {}", shape.name(), shape.description());
    }
}
