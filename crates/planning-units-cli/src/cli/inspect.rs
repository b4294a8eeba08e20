//! Inspect command implementation.

use anyhow::Result;

use planning_units::{validate_region, GridBuilder, Region, M2_PER_KM2};

use super::common::load_polygons;
use crate::InspectArgs;

/// Execute the inspect command.
pub fn cmd_inspect(args: InspectArgs) -> Result<()> {
    let polygons = load_polygons(&args.region, args.region_layer.as_deref(), args.meters_per_unit)?;
    let region = validate_region(&Region::new(polygons))?;

    let builder = GridBuilder::new(args.shape, args.area);
    let cell_size = builder.cell_size()?;
    let candidates = builder.candidates(&region)?;

    let holes: usize = region.polygons().iter().map(|p| p.holes.len()).sum();

    println!("Region: {}", args.region.display());
    if let Some(layer) = &args.region_layer {
        println!("  layer:       {}", layer);
    }
    println!("  polygons:    {} ({} holes)", region.polygons().len(), holes);
    if let Some((min_x, min_y, max_x, max_y)) = region.bounding_box() {
        println!(
            "  bounds:      ({:.1}, {:.1}) - ({:.1}, {:.1}) m",
            min_x, min_y, max_x, max_y
        );
        println!(
            "  extent:      {:.3} x {:.3} km",
            (max_x - min_x) / 1000.0,
            (max_y - min_y) / 1000.0
        );
    }
    println!("  area:        {:.3} km²", region.area() / M2_PER_KM2);
    println!();
    println!("Lattice: {} cells of {} km²", args.shape, args.area);
    println!("  cell size:   {:.3} m", cell_size);
    println!("  candidates:  {}", candidates.len());

    Ok(())
}
