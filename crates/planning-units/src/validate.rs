//! Input geometry checks and light repair.
//!
//! Repair is limited to what can be done without changing the shape:
//! consecutive duplicate vertices and a repeated closing vertex are dropped.
//! Anything else that is wrong (too few vertices, NaN coordinates,
//! crossing edges) is reported as [`GridError::InvalidGeometry`].

use crate::error::GridError;
use crate::geometry::{ExclusionLayer, Point, Polygon, Region};
use crate::predicates::segments_intersect;

/// Vertices closer than this (per axis) are treated as the same vertex.
const DUPLICATE_EPSILON: f64 = 1e-9;

/// Drop consecutive duplicates and the repeated closing vertex.
pub fn repair_ring(ring: &[Point]) -> Vec<Point> {
    let mut points = ring.to_vec();
    points.dedup_by(|a, b| same_vertex(*a, *b));

    while points.len() >= 2 && same_vertex(points[0], points[points.len() - 1]) {
        points.pop();
    }

    points
}

/// True when two non-adjacent edges of the ring touch or cross.
///
/// O(n²) in the number of edges.
pub fn ring_self_intersects(ring: &[Point]) -> bool {
    let n = ring.len();
    if n < 4 {
        return false;
    }

    for i in 0..n {
        let (a1, a2) = (ring[i], ring[(i + 1) % n]);
        for j in (i + 2)..n {
            // First and last edges share vertex 0.
            if i == 0 && j == n - 1 {
                continue;
            }
            let (b1, b2) = (ring[j], ring[(j + 1) % n]);
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }

    false
}

/// Validate and repair every polygon of a region.
///
/// Fails on an empty region, on rings with fewer than three distinct
/// vertices, non-finite coordinates, or self-intersecting rings.
pub fn validate_region(region: &Region) -> Result<Region, GridError> {
    if region.is_empty() {
        return Err(GridError::geometry("region has no polygons"));
    }

    let polygons = region
        .polygons()
        .iter()
        .enumerate()
        .map(|(i, poly)| repair_polygon(poly, &format!("region polygon {}", label(i, poly)), true))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Region::new(polygons))
}

/// Validate and repair an exclusion layer.
///
/// Exclusion polygons get the cheap checks only (vertex count, finite
/// coordinates). Coastlines routinely carry tens of thousands of vertices,
/// so the quadratic self-intersection scan is skipped for them.
pub fn validate_exclusion(layer: &ExclusionLayer) -> Result<ExclusionLayer, GridError> {
    let polygons = layer
        .polygons()
        .iter()
        .enumerate()
        .map(|(i, poly)| repair_polygon(poly, &format!("exclusion polygon {}", label(i, poly)), false))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExclusionLayer::new(polygons))
}

fn repair_polygon(poly: &Polygon, what: &str, check_crossings: bool) -> Result<Polygon, GridError> {
    let outer = repair_and_check(&poly.outer, &format!("{what} outer ring"), check_crossings)?;
    let holes = poly
        .holes
        .iter()
        .enumerate()
        .map(|(h, hole)| repair_and_check(hole, &format!("{what} hole {h}"), check_crossings))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Polygon::with_id_and_group(outer, holes, poly.id.clone(), poly.group_id.clone()))
}

fn repair_and_check(ring: &[Point], what: &str, check_crossings: bool) -> Result<Vec<Point>, GridError> {
    if let Some(bad) = ring.iter().find(|p| !p.is_finite()) {
        return Err(GridError::geometry(format!(
            "{what} has a non-finite vertex ({}, {})",
            bad.x, bad.y
        )));
    }

    let repaired = repair_ring(ring);
    if repaired.len() < 3 {
        return Err(GridError::geometry(format!(
            "{what} has {} distinct vertices, need at least 3",
            repaired.len()
        )));
    }

    if check_crossings && ring_self_intersects(&repaired) {
        return Err(GridError::geometry(format!("{what} is self-intersecting")));
    }

    Ok(repaired)
}

fn label(index: usize, poly: &Polygon) -> String {
    match &poly.id {
        Some(id) => format!("#{index} ({id})"),
        None => format!("#{index}"),
    }
}

#[inline]
fn same_vertex(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < DUPLICATE_EPSILON && (a.y - b.y).abs() < DUPLICATE_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn repair_drops_duplicates_and_closing_vertex() {
        let ring = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]);
        assert_eq!(repair_ring(&ring), pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]));
    }

    #[test]
    fn bowtie_is_self_intersecting() {
        let bowtie = pts(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]);
        assert!(ring_self_intersects(&bowtie));

        let square = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert!(!ring_self_intersects(&square));
    }

    #[test]
    fn concave_ring_is_fine() {
        let l_shape = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 4.0), (4.0, 4.0), (4.0, 10.0), (0.0, 10.0)]);
        assert!(!ring_self_intersects(&l_shape));
    }

    #[test]
    fn empty_region_is_invalid_geometry() {
        let err = validate_region(&Region::default()).unwrap_err();
        assert!(matches!(err, GridError::InvalidGeometry { .. }));
    }

    #[test]
    fn degenerate_ring_is_rejected() {
        let region = Region::from_polygon(Polygon::new(pts(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)])));
        let err = validate_region(&region).unwrap_err();
        assert!(err.to_string().contains("distinct vertices"), "{}", err);
    }

    #[test]
    fn nan_vertex_is_rejected() {
        let region = Region::from_polygon(Polygon::new(pts(&[(0.0, 0.0), (f64::NAN, 0.0), (1.0, 1.0)])));
        assert!(matches!(validate_region(&region), Err(GridError::InvalidGeometry { .. })));
    }

    #[test]
    fn self_intersecting_region_is_rejected() {
        let region = Region::from_polygon(Polygon::new(pts(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)])));
        let err = validate_region(&region).unwrap_err();
        assert!(err.to_string().contains("self-intersecting"), "{}", err);
    }

    #[test]
    fn closed_rings_are_repaired_in_place() {
        let mut poly = Polygon::new(pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]));
        poly.id = Some("bay".to_string());
        let repaired = validate_region(&Region::from_polygon(poly)).unwrap();
        assert_eq!(repaired.polygons()[0].outer.len(), 4);
        assert_eq!(repaired.polygons()[0].id.as_deref(), Some("bay"));
    }

    #[test]
    fn exclusion_skips_crossing_check_but_not_vertex_count() {
        let bowtie = Polygon::new(pts(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]));
        assert!(validate_exclusion(&ExclusionLayer::new(vec![bowtie])).is_ok());

        let sliver = Polygon::new(pts(&[(0.0, 0.0), (1.0, 0.0)]));
        assert!(validate_exclusion(&ExclusionLayer::new(vec![sliver])).is_err());
        assert!(validate_exclusion(&ExclusionLayer::default()).unwrap().is_empty());
    }
}
