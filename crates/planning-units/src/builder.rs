//! The grid builder: tessellate → filter by region → filter by exclusion → relabel.
//!
//! Both filters test only the cell centroid. A cell whose centre falls just
//! outside a concave coastline is dropped even if part of it lies inside,
//! and a cell is treated as land when its centre is on land. This is a
//! cheap approximation of area overlap and it is kept on purpose; true
//! overlap fractions would need polygon clipping and a different contract.

use tracing::debug;

use crate::error::GridError;
use crate::geometry::{ExclusionLayer, Point, Polygon, Region, M2_PER_KM2};
use crate::lattice::{tessellate, Cell, CellShape};
use crate::predicates::PolygonIndex;
use crate::validate::{validate_exclusion, validate_region};

/// A cell that survived both filters.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningUnit {
    /// Contiguous identifier, starting at 1, in lattice order.
    pub cell_id: u32,
    /// Lattice row of the originating cell.
    pub row: usize,
    /// Lattice column of the originating cell.
    pub col: usize,
    pub centroid: Point,
    pub polygon: Polygon,
}

impl PlanningUnit {
    /// Cell area in km².
    pub fn area_km2(&self) -> f64 {
        self.polygon.area() / M2_PER_KM2
    }
}

/// Counts from one build, useful for logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridStats {
    /// Cells generated over the region's bounding box.
    pub candidates: usize,
    /// Cells whose centroid fell outside the region.
    pub outside_region: usize,
    /// Cells whose centroid fell inside an exclusion polygon.
    pub excluded: usize,
    /// Planning units in the output.
    pub units: usize,
}

/// The result of a build.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningGrid {
    pub shape: CellShape,
    pub target_area_km2: f64,
    /// Square side or hexagon flat-to-flat width, in metres.
    pub cell_size: f64,
    pub units: Vec<PlanningUnit>,
    pub stats: GridStats,
}

/// Configured grid builder.
///
/// # Example
/// ```
/// use planning_units::{CellShape, GridBuilder, Polygon, Region};
///
/// let region = Region::from_polygon(Polygon::rectangle(-5000.0, -5000.0, 5000.0, 5000.0));
/// let grid = GridBuilder::new(CellShape::Square, 1.0).build(&region, None).unwrap();
/// assert_eq!(grid.units.len(), 100);
/// assert_eq!(grid.units[0].cell_id, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridBuilder {
    shape: CellShape,
    target_area_km2: f64,
}

impl GridBuilder {
    pub fn new(shape: CellShape, target_area_km2: f64) -> Self {
        Self { shape, target_area_km2 }
    }

    pub fn shape(&self) -> CellShape {
        self.shape
    }

    pub fn target_area_km2(&self) -> f64 {
        self.target_area_km2
    }

    /// Linear cell dimension in metres derived from the target area.
    pub fn cell_size(&self) -> Result<f64, GridError> {
        self.shape.cell_size(self.target_area_km2)
    }

    /// Tessellate without filtering, for inspection and coverage checks.
    pub fn candidates(&self, region: &Region) -> Result<Vec<Cell>, GridError> {
        let size = self.cell_size()?;
        let region = validate_region(region)?;
        match region.bounding_box() {
            Some(bounds) => tessellate(bounds, self.shape, size),
            None => Ok(Vec::new()),
        }
    }

    /// Build the planning units for `region`, optionally masking `exclusion`.
    ///
    /// Pure: identical inputs always give identical output, including the
    /// `cell_id` assignment.
    pub fn build(&self, region: &Region, exclusion: Option<&ExclusionLayer>) -> Result<PlanningGrid, GridError> {
        let size = self.cell_size()?;
        let region = validate_region(region)?;
        let exclusion = exclusion.map(validate_exclusion).transpose()?;

        let cells = match region.bounding_box() {
            Some(bounds) => tessellate(bounds, self.shape, size)?,
            None => Vec::new(),
        };
        let candidates = cells.len();
        debug!(shape = %self.shape, cell_size = size, candidates, "lattice generated");

        // Region filter: centroid must touch the region.
        let region_index = PolygonIndex::new(region.polygons());
        let inside: Vec<Cell> = cells
            .into_iter()
            .filter(|cell| region_index.covers(cell.centroid))
            .collect();
        let outside_region = candidates - inside.len();

        // Exclusion filter: drop cells whose centroid touches any exclusion polygon.
        let kept: Vec<Cell> = match &exclusion {
            Some(layer) if !layer.is_empty() => {
                let land = PolygonIndex::new(layer.polygons());
                inside.into_iter().filter(|cell| !land.covers(cell.centroid)).collect()
            }
            _ => inside,
        };
        let excluded = candidates - outside_region - kept.len();

        let units = relabel(kept)?;
        let stats = GridStats { candidates, outside_region, excluded, units: units.len() };
        debug!(?stats, "planning units built");

        Ok(PlanningGrid {
            shape: self.shape,
            target_area_km2: self.target_area_km2,
            cell_size: size,
            units,
            stats,
        })
    }
}

/// Build planning units in one call.
///
/// Same as `GridBuilder::new(shape, target_area_km2).build(region, exclusion)`
/// but returns only the units.
pub fn build_planning_units(
    region: &Region,
    target_area_km2: f64,
    shape: CellShape,
    exclusion: Option<&ExclusionLayer>,
) -> Result<Vec<PlanningUnit>, GridError> {
    GridBuilder::new(shape, target_area_km2)
        .build(region, exclusion)
        .map(|grid| grid.units)
}

/// Assign `cell_id = 1..=N` in the surviving lattice order.
fn relabel(cells: Vec<Cell>) -> Result<Vec<PlanningUnit>, GridError> {
    // ## Rust Lesson #14: Iterators & Collecting
    //
    // `zip(1..)` pairs each cell with its new ID; collecting into
    // `Result<Vec<_>, _>` stops at the first error.
    cells
        .into_iter()
        .zip(1_u64..)
        .map(|(cell, id)| {
            let cell_id = u32::try_from(id)
                .map_err(|_| GridError::parameter("more planning units than fit in a u32 cell ID"))?;
            Ok(PlanningUnit {
                cell_id,
                row: cell.row,
                col: cell.col,
                centroid: cell.centroid,
                polygon: cell.polygon,
            })
        })
        .collect()
}
