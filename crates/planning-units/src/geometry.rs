//! Core geometry types for planning-unit grids.
//!
//! ## Rust Lesson #3: Structs & Derives
//!
//! The `#[derive(...)]` macro auto-generates common functionality:
//! - `Debug` = lets you print with `{:?}`
//! - `Clone` = can duplicate the value
//! - `Copy` = can copy implicitly (small stack values only)
//! - `PartialEq` = can compare with `==`
//!
//! All coordinates are planar, in the linear unit of a projected
//! equal-area CRS (metres). No reprojection happens anywhere in this crate.

/// Square metres per square kilometre.
pub const M2_PER_KM2: f64 = 1_000_000.0;

/// Axis-aligned bounds as `(min_x, min_y, max_x, max_y)`.
pub type Bounds = (f64, f64, f64, f64);

/// A 2D point with x,y coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A polygon with an outer boundary and optional holes.
///
/// Rings are stored open: the first vertex is not repeated at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Outer boundary vertices
    pub outer: Vec<Point>,
    /// Interior holes
    pub holes: Vec<Vec<Point>>,
    /// Optional ID from the source element
    pub id: Option<String>,
    /// Optional enclosing group ID from the source (used to pick layers)
    pub group_id: Option<String>,
}

/// The planning region: one or more polygons forming a multi-polygon.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Region {
    polygons: Vec<Polygon>,
}

/// Polygons whose area is removed from candidate planning units
/// (typically landmass).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExclusionLayer {
    polygons: Vec<Polygon>,
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Polygon {
    /// Create a simple polygon with no holes.
    pub fn new(outer: Vec<Point>) -> Self {
        Self::with_holes(outer, Vec::new())
    }

    /// Create a polygon with holes.
    pub fn with_holes(outer: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        Self { outer, holes, id: None, group_id: None }
    }

    /// Create a polygon with holes, element ID and group ID.
    pub fn with_id_and_group(
        outer: Vec<Point>,
        holes: Vec<Vec<Point>>,
        id: Option<String>,
        group_id: Option<String>,
    ) -> Self {
        Self { outer, holes, id, group_id }
    }

    /// Axis-aligned rectangle from two opposite corners.
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(vec![
            Point::new(min_x, min_y),
            Point::new(max_x, min_y),
            Point::new(max_x, max_y),
            Point::new(min_x, max_y),
        ])
    }

    /// Get the bounding box of the outer ring.
    ///
    /// ## Rust Lesson #6: Option<T>
    ///
    /// There is no `null`. An empty ring has no bounds, so we return `None`
    /// and the compiler makes every caller deal with that case.
    pub fn bounding_box(&self) -> Option<Bounds> {
        bounds_of_points(&self.outer)
    }

    /// Signed area of the outer ring (shoelace formula).
    #[inline]
    pub fn signed_area(&self) -> f64 {
        signed_area_of_points(&self.outer)
    }

    /// Unsigned area: outer ring minus holes, regardless of winding.
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| signed_area_of_points(h).abs()).sum();
        (self.signed_area().abs() - holes).max(0.0)
    }

    /// Area-weighted centroid of the polygon body (holes subtracted).
    ///
    /// Falls back to the vertex mean of the outer ring when the area is zero.
    pub fn centroid(&self) -> Option<Point> {
        if self.outer.is_empty() {
            return None;
        }

        // Orient every ring so the outer contributes positively and holes negatively.
        let (mut a, mut cx, mut cy) = ring_moments(&self.outer, 1.0);
        for hole in &self.holes {
            let (ha, hx, hy) = ring_moments(hole, -1.0);
            a += ha;
            cx += hx;
            cy += hy;
        }

        if a.abs() < f64::EPSILON {
            let n = self.outer.len() as f64;
            let sx: f64 = self.outer.iter().map(|p| p.x).sum();
            let sy: f64 = self.outer.iter().map(|p| p.y).sum();
            return Some(Point::new(sx / n, sy / n));
        }

        Some(Point::new(cx / (6.0 * a), cy / (6.0 * a)))
    }

    /// Uniformly scale every coordinate, e.g. SVG user units to metres.
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |ring: &[Point]| -> Vec<Point> {
            ring.iter().map(|p| Point::new(p.x * factor, p.y * factor)).collect()
        };
        Self {
            outer: scale(self.outer.as_slice()),
            holes: self.holes.iter().map(|h| scale(h.as_slice())).collect(),
            id: self.id.clone(),
            group_id: self.group_id.clone(),
        }
    }
}

impl Region {
    /// A region made of one or more polygons.
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    pub fn from_polygon(polygon: Polygon) -> Self {
        Self::new(vec![polygon])
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Union of the polygons' bounding boxes.
    pub fn bounding_box(&self) -> Option<Bounds> {
        union_bounds(self.polygons.iter().filter_map(Polygon::bounding_box))
    }

    /// Total area in square metres.
    pub fn area(&self) -> f64 {
        self.polygons.iter().map(Polygon::area).sum()
    }
}

impl ExclusionLayer {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }
}

// ============================================================================
// FREE FUNCTIONS
// ============================================================================

/// Calculate signed area of a point sequence using the shoelace formula.
///
/// Returns:
/// - Positive value for counter-clockwise winding
/// - Negative value for clockwise winding
pub fn signed_area_of_points(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area / 2.0
}

/// Bounding box of a point sequence.
pub fn bounds_of_points(points: &[Point]) -> Option<Bounds> {
    if points.is_empty() {
        return None;
    }

    let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

    Some((min_x, min_y, max_x, max_y))
}

/// Smallest box enclosing all given boxes.
pub fn union_bounds(boxes: impl IntoIterator<Item = Bounds>) -> Option<Bounds> {
    boxes.into_iter().reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
}

/// True when `p` lies inside or on the edge of `b`.
#[inline]
pub fn bounds_contain_point(b: Bounds, p: Point) -> bool {
    p.x >= b.0 && p.x <= b.2 && p.y >= b.1 && p.y <= b.3
}

/// Signed area and first moments of a ring, with the ring oriented so its
/// area carries `sign`.
fn ring_moments(ring: &[Point], sign: f64) -> (f64, f64, f64) {
    let n = ring.len();
    if n < 3 {
        return (0.0, 0.0, 0.0);
    }

    let flip = if signed_area_of_points(ring) * sign < 0.0 { -1.0 } else { 1.0 };

    let (mut a, mut cx, mut cy) = (0.0, 0.0, 0.0);
    for i in 0..n {
        let p = ring[i];
        let q = ring[(i + 1) % n];
        let cross = p.x * q.y - q.x * p.y;
        a += cross;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }

    (flip * a / 2.0, flip * cx, flip * cy)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn square_with_hole() -> Polygon {
        Polygon::with_holes(
            Polygon::rectangle(0.0, 0.0, 10.0, 10.0).outer,
            vec![Polygon::rectangle(0.0, 0.0, 5.0, 10.0).outer],
        )
    }

    #[test]
    fn point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert_eq!(p1.distance(p2), 5.0);
    }

    #[test]
    fn polygon_bbox() {
        let poly = Polygon::rectangle(0.0, 0.0, 10.0, 5.0);
        assert_eq!(poly.bounding_box(), Some((0.0, 0.0, 10.0, 5.0)));
    }

    #[test]
    fn empty_polygon_bbox() {
        let poly = Polygon::new(vec![]);
        assert_eq!(poly.bounding_box(), None);
        assert_eq!(poly.centroid(), None);
    }

    #[test]
    fn signed_area_follows_winding() {
        let ccw = Polygon::rectangle(0.0, 0.0, 10.0, 10.0);
        assert!((ccw.signed_area() - 100.0).abs() < 1e-10);

        let mut cw = ccw.clone();
        cw.outer.reverse();
        assert!((cw.signed_area() + 100.0).abs() < 1e-10);
        assert!((cw.area() - 100.0).abs() < 1e-10);
    }

    #[test]
    fn area_subtracts_holes() {
        assert!((square_with_hole().area() - 50.0).abs() < 1e-10);
    }

    #[test]
    fn centroid_of_rectangle() {
        let c = Polygon::rectangle(-2.0, -1.0, 4.0, 3.0).centroid().unwrap();
        assert!((c.x - 1.0).abs() < 1e-12);
        assert!((c.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn centroid_accounts_for_holes_in_either_winding() {
        let c = square_with_hole().centroid().unwrap();
        assert!((c.x - 7.5).abs() < 1e-10, "got {:?}", c);
        assert!((c.y - 5.0).abs() < 1e-10, "got {:?}", c);

        let mut reversed = square_with_hole();
        reversed.outer.reverse();
        let c2 = reversed.centroid().unwrap();
        assert!((c2.x - 7.5).abs() < 1e-10, "got {:?}", c2);
    }

    #[test]
    fn degenerate_centroid_falls_back_to_vertex_mean() {
        let line = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(4.0, 0.0)]);
        assert_eq!(line.centroid(), Some(Point::new(2.0, 0.0)));
    }

    #[test]
    fn region_bounds_cover_all_parts() {
        let region = Region::new(vec![
            Polygon::rectangle(0.0, 0.0, 1.0, 1.0),
            Polygon::rectangle(5.0, -3.0, 6.0, 2.0),
        ]);
        assert_eq!(region.bounding_box(), Some((0.0, -3.0, 6.0, 2.0)));
        assert!((region.area() - 6.0).abs() < 1e-12);
        assert_eq!(Region::default().bounding_box(), None);
    }

    #[test]
    fn scaled_keeps_metadata() {
        let mut poly = Polygon::rectangle(0.0, 0.0, 1.0, 2.0);
        poly.id = Some("coast".to_string());
        let big = poly.scaled(1000.0);
        assert_eq!(big.bounding_box(), Some((0.0, 0.0, 1000.0, 2000.0)));
        assert_eq!(big.id.as_deref(), Some("coast"));
    }
}
