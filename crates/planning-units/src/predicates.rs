//! Point and segment predicates used by the grid filters and by validation.
//!
//! This is the HOT PATH - every candidate cell runs its centroid through
//! these tests at least once, so they stay allocation-free.

use crate::geometry::{bounds_contain_point, Bounds, ExclusionLayer, Point, Polygon, Region};

/// Relative tolerance for "on the boundary" decisions.
const BOUNDARY_TOLERANCE: f64 = 1e-9;

// ============================================================================
// POINT IN POLYGON (Ray Casting Algorithm)
// ============================================================================
//
// ## Rust Lesson #8: References & Slices
//
// `&[Point]` is a "slice" - a borrowed view into a contiguous sequence.
// It works with Vec<Point>, arrays, or any contiguous memory.

/// Test if a point is inside a ring using ray casting.
///
/// Casts a ray to the right and counts edge crossings.
/// Odd crossings = inside, even = outside. Points exactly on an edge may
/// land on either side; use [`point_in_ring_inclusive`] when the boundary
/// must count as inside.
#[inline]
pub fn point_in_polygon(px: f64, py: f64, ring: &[Point]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let (xi, yi) = (ring[i].x, ring[i].y);
        let (xj, yj) = (ring[j].x, ring[j].y);

        if ((yi > py) != (yj > py)) && (px < (xj - xi) * (py - yi) / (yj - yi) + xi) {
            inside = !inside;
        }

        j = i;
    }

    inside
}

/// True when `p` lies on the closed segment `a`-`b`.
#[inline]
pub fn point_on_segment(p: Point, a: Point, b: Point) -> bool {
    let tol = tolerance_for(a, b);
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;

    if len2 == 0.0 {
        return p.distance(a) <= tol;
    }

    let len = len2.sqrt();
    let cross = dx * (p.y - a.y) - dy * (p.x - a.x);
    if cross.abs() / len > tol {
        return false;
    }

    let t = (dx * (p.x - a.x) + dy * (p.y - a.y)) / len2;
    let slack = tol / len;
    (-slack..=1.0 + slack).contains(&t)
}

/// True when `p` lies on any edge of the (implicitly closed) ring.
pub fn point_on_ring(p: Point, ring: &[Point]) -> bool {
    let n = ring.len();
    if n == 0 {
        return false;
    }
    (0..n).any(|i| point_on_segment(p, ring[i], ring[(i + 1) % n]))
}

/// Boundary-inclusive point-in-ring test.
#[inline]
pub fn point_in_ring_inclusive(p: Point, ring: &[Point]) -> bool {
    point_in_polygon(p.x, p.y, ring) || point_on_ring(p, ring)
}

/// Boundary-inclusive "intersects" test against a polygon with holes.
///
/// The point must be inside or on the outer ring, and must not be strictly
/// inside a hole. A point on a hole's edge still touches the polygon.
pub fn polygon_covers_point(polygon: &Polygon, p: Point) -> bool {
    if !point_in_ring_inclusive(p, &polygon.outer) {
        return false;
    }
    !polygon
        .holes
        .iter()
        .any(|hole| point_in_polygon(p.x, p.y, hole) && !point_on_ring(p, hole))
}

/// Boundary-inclusive membership test against every part of a region.
pub fn region_covers_point(region: &Region, p: Point) -> bool {
    region.polygons().iter().any(|poly| polygon_covers_point(poly, p))
}

/// Boundary-inclusive membership test against an exclusion layer.
pub fn layer_covers_point(layer: &ExclusionLayer, p: Point) -> bool {
    layer.polygons().iter().any(|poly| polygon_covers_point(poly, p))
}

// ============================================================================
// INDEXED LOOKUP (bounding-box rejection first)
// ============================================================================

/// Polygons paired with their bounding boxes so most points are rejected
/// without walking any ring.
#[derive(Debug)]
pub struct PolygonIndex<'a> {
    entries: Vec<(Bounds, &'a Polygon)>,
}

impl<'a> PolygonIndex<'a> {
    /// Precompute bounds for a set of polygons. Polygons without vertices are skipped.
    pub fn new(polygons: &'a [Polygon]) -> Self {
        let entries = polygons
            .iter()
            .filter_map(|poly| poly.bounding_box().map(|b| (b, poly)))
            .collect();
        Self { entries }
    }

    /// Same answer as testing every polygon with [`polygon_covers_point`].
    pub fn covers(&self, p: Point) -> bool {
        self.entries
            .iter()
            .any(|(bounds, poly)| bounds_contain_point(*bounds, p) && polygon_covers_point(poly, p))
    }
}

// ============================================================================
// SEGMENT INTERSECTION
// ============================================================================

/// Orientation of `c` relative to the directed line `a`-`b`:
/// `1` = left, `-1` = right, `0` = collinear (within tolerance).
#[inline]
fn orientation(a: Point, b: Point, c: Point) -> i8 {
    let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    let scale = (b.x - a.x).abs().max((b.y - a.y).abs()).max(1.0)
        * (c.x - a.x).abs().max((c.y - a.y).abs()).max(1.0);
    if cross.abs() <= BOUNDARY_TOLERANCE * scale {
        0
    } else if cross > 0.0 {
        1
    } else {
        -1
    }
}

/// True when collinear point `q` lies within the bounding box of `a`-`b`.
#[inline]
fn within_span(a: Point, b: Point, q: Point) -> bool {
    q.x >= a.x.min(b.x) && q.x <= a.x.max(b.x) && q.y >= a.y.min(b.y) && q.y <= a.y.max(b.y)
}

/// True when closed segments `p1`-`p2` and `p3`-`p4` share at least one point,
/// including touching endpoints and collinear overlap.
pub fn segments_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let o1 = orientation(p1, p2, p3);
    let o2 = orientation(p1, p2, p4);
    let o3 = orientation(p3, p4, p1);
    let o4 = orientation(p3, p4, p2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == 0 && within_span(p1, p2, p3))
        || (o2 == 0 && within_span(p1, p2, p4))
        || (o3 == 0 && within_span(p3, p4, p1))
        || (o4 == 0 && within_span(p3, p4, p2))
}

#[inline]
fn tolerance_for(a: Point, b: Point) -> f64 {
    let magnitude = a.x.abs().max(a.y.abs()).max(b.x.abs()).max(b.y.abs());
    BOUNDARY_TOLERANCE * (1.0 + magnitude)
}

// ============================================================================
// TESTS
// ============================================================================
