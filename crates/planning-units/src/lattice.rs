//! Square and hexagonal lattices over a bounding box.
//!
//! Cell size is always derived from a target area, never given directly.
//! Cells are emitted row-major: rows by ascending y, cells within a row by
//! ascending x. The same bounds, shape and size always produce the same
//! sequence.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::GridError;
use crate::geometry::{Bounds, Point, Polygon, M2_PER_KM2};

/// Upper bound on candidate cells for one lattice.
pub const MAX_CANDIDATE_CELLS: usize = 5_000_000;

/// Relative slack so an extent that is an exact multiple of the cell size
/// does not spill an extra row or column through float noise.
const SNAP: f64 = 1e-9;

/// Shape of a planning unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellShape {
    Square,
    Hexagon,
}

/// One lattice cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Row index within the emitted lattice (0 = lowest row).
    pub row: usize,
    /// Column index within the row.
    pub col: usize,
    /// Lattice centre; equal to the polygon centroid for regular cells.
    pub centroid: Point,
    /// Cell outline, counter-clockwise.
    pub polygon: Polygon,
}

impl CellShape {
    /// Get all supported shapes.
    pub fn all() -> &'static [CellShape] {
        &[CellShape::Square, CellShape::Hexagon]
    }

    /// Get shape name as string.
    pub fn name(&self) -> &'static str {
        match self {
            CellShape::Square => "square",
            CellShape::Hexagon => "hexagon",
        }
    }

    /// Short description for listings.
    pub fn description(&self) -> &'static str {
        match self {
            CellShape::Square => "Axis-aligned squares; side = sqrt(area)",
            CellShape::Hexagon => "Pointy-top regular hexagons; size = flat-to-flat width",
        }
    }

    /// Parse shape from name (case-insensitive).
    pub fn from_name(name: &str) -> Option<CellShape> {
        match name.to_ascii_lowercase().as_str() {
            "square" | "sq" => Some(CellShape::Square),
            "hexagon" | "hex" => Some(CellShape::Hexagon),
            _ => None,
        }
    }

    /// Linear cell dimension in metres for a target area in km².
    ///
    /// - Square: side length `s` with `s² = A`.
    /// - Hexagon: flat-to-flat width `d` of a regular hexagon of area `A`,
    ///   i.e. `d = 2 × sqrt(A / (3√3/2)) × (√3/2)`.
    pub fn cell_size(&self, target_area_km2: f64) -> Result<f64, GridError> {
        if !target_area_km2.is_finite() || target_area_km2 <= 0.0 {
            return Err(GridError::parameter(format!(
                "target area must be a positive number of km², got {target_area_km2}"
            )));
        }

        let area_m2 = target_area_km2 * M2_PER_KM2;
        let size = match self {
            CellShape::Square => area_m2.sqrt(),
            CellShape::Hexagon => {
                let sqrt3 = 3.0_f64.sqrt();
                2.0 * (area_m2 / (3.0 * sqrt3 / 2.0)).sqrt() * (sqrt3 / 2.0)
            }
        };
        Ok(size)
    }
}

impl fmt::Display for CellShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CellShape {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellShape::from_name(s).ok_or_else(|| {
            GridError::parameter(format!("unknown cell shape '{s}', expected 'square' or 'hexagon'"))
        })
    }
}

// ============================================================================
// TESSELLATION
// ============================================================================

/// Tessellate `bounds` with cells of the given shape and size.
///
/// The union of the returned cells covers `bounds` with no gaps. A box with
/// zero width or height yields no cells.
pub fn tessellate(bounds: Bounds, shape: CellShape, size: f64) -> Result<Vec<Cell>, GridError> {
    if !size.is_finite() || size <= 0.0 {
        return Err(GridError::parameter(format!("cell size must be positive, got {size}")));
    }

    let (min_x, min_y, max_x, max_y) = bounds;
    let width = max_x - min_x;
    let height = max_y - min_y;
    if !(width > 0.0 && height > 0.0) {
        return Ok(Vec::new());
    }

    match shape {
        CellShape::Square => square_lattice(bounds, size),
        CellShape::Hexagon => hexagon_lattice(bounds, size),
    }
}

/// Number of lattice steps of `step` needed to span `extent`.
///
/// Saturates at `usize::MAX` for ratios beyond the integer range, which
/// `check_budget` then refuses.
#[inline]
fn steps_to_cover(extent: f64, step: f64) -> usize {
    (extent / step - SNAP).ceil().max(1.0) as usize
}

fn check_budget(rows: usize, cols: usize) -> Result<(), GridError> {
    match rows.checked_mul(cols) {
        Some(n) if n <= MAX_CANDIDATE_CELLS => Ok(()),
        _ => Err(GridError::parameter(format!(
            "lattice of {rows} x {cols} cells exceeds the limit of {MAX_CANDIDATE_CELLS}; \
             increase the target area"
        ))),
    }
}

fn square_lattice(bounds: Bounds, side: f64) -> Result<Vec<Cell>, GridError> {
    let (min_x, min_y, max_x, max_y) = bounds;
    let cols = steps_to_cover(max_x - min_x, side);
    let rows = steps_to_cover(max_y - min_y, side);
    check_budget(rows, cols)?;

    let mut cells = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        let y0 = min_y + row as f64 * side;
        for col in 0..cols {
            let x0 = min_x + col as f64 * side;
            cells.push(Cell {
                row,
                col,
                centroid: Point::new(x0 + side / 2.0, y0 + side / 2.0),
                polygon: Polygon::rectangle(x0, y0, x0 + side, y0 + side),
            });
        }
    }

    Ok(cells)
}

/// Pointy-top hex lattice anchored at the box's minimum corner.
///
/// ```text
///   row 1:    ⬡ ⬡ ⬡      (shifted right by d/2)
///   row 0:   ⬡ ⬡ ⬡
/// ```
///
/// Horizontal centre spacing is the flat-to-flat width `d`; vertical spacing
/// is `1.5 R` with circumradius `R = d / √3`.
fn hexagon_lattice(bounds: Bounds, width: f64) -> Result<Vec<Cell>, GridError> {
    let (min_x, min_y, max_x, max_y) = bounds;
    let radius = width / 3.0_f64.sqrt();
    let row_step = 1.5 * radius;
    let half_width = width / 2.0;

    // One extra row and column either side is enough to overlap every edge.
    let rows_estimate = steps_to_cover(max_y - min_y, row_step).saturating_add(2);
    let cols_estimate = steps_to_cover(max_x - min_x, width).saturating_add(2);
    check_budget(rows_estimate, cols_estimate)?;

    // Vertex offsets at 30°, 90°, ... 330°: counter-clockwise, pointy top.
    let hex_offsets: Vec<(f64, f64)> = (0..6)
        .map(|i| {
            let angle = PI / 6.0 + PI / 3.0 * i as f64;
            (radius * angle.cos(), radius * angle.sin())
        })
        .collect();

    let mut cells = Vec::with_capacity(rows_estimate * cols_estimate);
    let mut row = 0;
    let mut j: i64 = -1;

    loop {
        let cy = min_y + j as f64 * row_step;
        if cy - radius >= max_y {
            break;
        }
        if cy + radius > min_y {
            let shift = if j.rem_euclid(2) == 1 { half_width } else { 0.0 };
            let mut col = 0;
            let mut i: i64 = -1;

            loop {
                let cx = min_x + i as f64 * width + shift;
                if cx - half_width >= max_x {
                    break;
                }
                if cx + half_width > min_x {
                    let outer = hex_offsets.iter().map(|(ox, oy)| Point::new(cx + ox, cy + oy)).collect();
                    cells.push(Cell {
                        row,
                        col,
                        centroid: Point::new(cx, cy),
                        polygon: Polygon::new(outer),
                    });
                    col += 1;
                }
                i += 1;
            }
            row += 1;
        }
        j += 1;
    }

    Ok(cells)
}
