//! Common utilities shared across CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use planning_units::{extract_polygons_from_svg, select_layer, without_layer, Polygon};

/// Output format for generated grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Preview drawing with one polygon per unit
    Svg,
    /// Grid metadata, stats and per-unit attributes
    #[default]
    Json,
    /// FeatureCollection of unit polygons
    Geojson,
    /// Rasterized preview (requires --output)
    Png,
}

/// Load polygons from an SVG file, optionally restricted to one layer,
/// and scale them from SVG user units to metres.
pub fn load_polygons(path: &Path, layer: Option<&str>, meters_per_unit: f64) -> Result<Vec<Polygon>> {
    let polygons = read_polygons(path)?;

    let polygons = match layer {
        Some(id) => {
            let selected = select_layer(&polygons, id);
            if selected.is_empty() {
                bail!("No polygons with group or element id '{}' in {}", id, path.display());
            }
            selected
        }
        None => polygons,
    };

    debug!(path = %path.display(), count = polygons.len(), layer = ?layer, "polygons loaded");
    Ok(polygons.iter().map(|p| p.scaled(meters_per_unit)).collect())
}

/// Load every polygon of an SVG file except those in `layer`, scaled to metres.
pub fn load_polygons_outside(path: &Path, layer: &str, meters_per_unit: f64) -> Result<Vec<Polygon>> {
    let polygons = without_layer(&read_polygons(path)?, layer);
    if polygons.is_empty() {
        bail!("No polygons outside layer '{}' in {}", layer, path.display());
    }

    debug!(path = %path.display(), count = polygons.len(), excluded_layer = layer, "polygons loaded");
    Ok(polygons.iter().map(|p| p.scaled(meters_per_unit)).collect())
}

fn read_polygons(path: &Path) -> Result<Vec<Polygon>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    extract_polygons_from_svg(&content)
        .with_context(|| format!("Failed to load polygons from {}", path.display()))
}

/// Write text output to a file, or to stdout when no path is given.
pub fn write_text(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}
