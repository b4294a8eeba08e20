//! Build command implementation.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};

use planning_units::{ExclusionLayer, GridBuilder, Region};

use super::common::{load_polygons, load_polygons_outside, write_text, OutputFormat};
use super::config::{BuildSettings, GridConfig};
use super::output::{grid_to_geojson, grid_to_json, grid_to_svg, render_png};
use crate::BuildArgs;

/// Execute the build command.
pub fn cmd_build(args: BuildArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => GridConfig::load(path)?,
        None => GridConfig::default(),
    };
    let settings = config.resolve(args)?;

    let region = load_region(&settings)?;
    let exclusion = load_exclusion(&settings)?;
    info!(
        region_polygons = region.polygons().len(),
        exclusion_polygons = exclusion.as_ref().map_or(0, ExclusionLayer::len),
        "inputs loaded"
    );

    let start = Instant::now();
    let builder = GridBuilder::new(settings.shape, settings.target_area_km2);
    let grid = builder.build(&region, exclusion.as_ref())?;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    info!(
        shape = %grid.shape,
        cell_size_m = grid.cell_size,
        candidates = grid.stats.candidates,
        outside_region = grid.stats.outside_region,
        excluded = grid.stats.excluded,
        units = grid.stats.units,
        elapsed_ms,
        "grid built"
    );
    if grid.units.is_empty() {
        warn!("no planning units survived filtering");
    }

    let name = settings.name.as_deref();
    let output = settings.output.as_deref();
    match settings.format {
        OutputFormat::Json => write_text(output, &grid_to_json(&grid, name)?),
        OutputFormat::Geojson => write_text(output, &grid_to_geojson(&grid)?),
        OutputFormat::Svg => write_text(output, &grid_to_svg(&grid, &region, exclusion.as_ref(), name)),
        OutputFormat::Png => {
            let path = output.context("PNG output needs a file: pass --output <FILE>")?;
            render_png(&grid_to_svg(&grid, &region, exclusion.as_ref(), name), path)
        }
    }?;

    if let Some(path) = output {
        info!(path = %path.display(), "output written");
    }
    Ok(())
}

/// Region polygons come from `--region-layer` when given. Without it, an
/// `--exclusion-layer` in the same file is left out of the region.
fn load_region(settings: &BuildSettings) -> Result<Region> {
    let mpu = settings.meters_per_unit;
    let polygons = match (&settings.region_layer, &settings.exclusion, &settings.exclusion_layer) {
        (None, None, Some(land)) => load_polygons_outside(&settings.region, land, mpu)?,
        (layer, _, _) => load_polygons(&settings.region, layer.as_deref(), mpu)?,
    };
    Ok(Region::new(polygons))
}

/// Exclusion polygons come from `--exclude` (optionally narrowed by
/// `--exclusion-layer`), or from a layer of the region file when only
/// `--exclusion-layer` is given.
fn load_exclusion(settings: &BuildSettings) -> Result<Option<ExclusionLayer>> {
    let source: Option<&Path> = match (&settings.exclusion, &settings.exclusion_layer) {
        (Some(path), _) => Some(path.as_path()),
        (None, Some(_)) => Some(settings.region.as_path()),
        (None, None) => None,
    };

    source
        .map(|path| {
            load_polygons(path, settings.exclusion_layer.as_deref(), settings.meters_per_unit)
                .map(ExclusionLayer::new)
        })
        .transpose()
}
