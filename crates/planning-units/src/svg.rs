//! SVG parsing - extract region and exclusion polygons from SVG files.
//!
//! Uses usvg for complete SVG resolution (CSS, shapes to paths, etc.)
//! then walks the tree to extract path data as polygons.
//!
//! Coordinates are in SVG user units with every enclosing group transform
//! applied; callers scale them to metres.
//!
//! ## Curve Flattening
//!
//! SVG paths contain Bézier curves (cubic and quadratic). These must be
//! "flattened" into line segments for polygon operations. We use lyon_geom
//! for accurate curve approximation with a fixed tolerance.

use crate::geometry::{Point, Polygon};
use lyon_geom::{point, CubicBezierSegment, QuadraticBezierSegment};

/// Error type for SVG parsing.
///
/// ## Rust Lesson #20: Error Handling
///
/// Rust uses `Result<T, E>` instead of exceptions:
/// - `Ok(value)` = success
/// - `Err(error)` = failure
#[derive(Debug)]
pub enum SvgError {
    ParseError(String),
    NoPolygons,
}

impl std::fmt::Display for SvgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SvgError::ParseError(msg) => write!(f, "SVG parse error: {}", msg),
            SvgError::NoPolygons => write!(f, "No polygons found in SVG"),
        }
    }
}

impl std::error::Error for SvgError {}

/// Tolerance for curve flattening, in SVG user units.
const CURVE_TOLERANCE: f32 = 0.1;

/// Extract all polygons from an SVG document.
///
/// Every path becomes one polygon: the first subpath is the outer ring,
/// any further subpaths are holes. Each polygon keeps its element ID and the
/// ID of its nearest enclosing `<g>`.
pub fn extract_polygons_from_svg(svg_content: &str) -> Result<Vec<Polygon>, SvgError> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_content, &options)
        .map_err(|e| SvgError::ParseError(e.to_string()))?;

    let mut polygons = Vec::new();
    extract_from_group(tree.root(), None, &mut polygons);

    if polygons.is_empty() {
        Err(SvgError::NoPolygons)
    } else {
        Ok(polygons)
    }
}

/// Keep only polygons whose group ID (or own ID) equals `layer`.
pub fn select_layer(polygons: &[Polygon], layer: &str) -> Vec<Polygon> {
    polygons
        .iter()
        .filter(|p| p.group_id.as_deref() == Some(layer) || p.id.as_deref() == Some(layer))
        .cloned()
        .collect()
}

/// Everything except the polygons in `layer` (group ID or own ID).
pub fn without_layer(polygons: &[Polygon], layer: &str) -> Vec<Polygon> {
    polygons
        .iter()
        .filter(|p| p.group_id.as_deref() != Some(layer) && p.id.as_deref() != Some(layer))
        .cloned()
        .collect()
}

/// Recursively extract polygons from a usvg Group.
fn extract_from_group(group: &usvg::Group, group_id: Option<&str>, polygons: &mut Vec<Polygon>) {
    let own_id = group.id();
    let current = if own_id.is_empty() { group_id } else { Some(own_id) };

    for child in group.children() {
        match child {
            usvg::Node::Group(inner) => extract_from_group(inner, current, polygons),
            usvg::Node::Path(path) => {
                if let Some(polygon) = path_to_polygon(path, current) {
                    polygons.push(polygon);
                }
            }
            // Ignore text, images, etc.
            _ => {}
        }
    }
}

/// Convert a usvg path to our Polygon type.
fn path_to_polygon(path: &usvg::Path, group_id: Option<&str>) -> Option<Polygon> {
    let mut rings: Vec<Vec<Point>> = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut last_point: Option<(f32, f32)> = None;

    // Bake in the transforms of all enclosing groups.
    let data = path.data().clone().transform(path.abs_transform())?;

    for cmd in data.segments() {
        match cmd {
            usvg::tiny_skia_path::PathSegment::MoveTo(p) => {
                if !current.is_empty() {
                    rings.push(std::mem::take(&mut current));
                }
                current.push(Point::new(p.x as f64, p.y as f64));
                last_point = Some((p.x, p.y));
            }
            usvg::tiny_skia_path::PathSegment::LineTo(p) => {
                current.push(Point::new(p.x as f64, p.y as f64));
                last_point = Some((p.x, p.y));
            }
            usvg::tiny_skia_path::PathSegment::QuadTo(ctrl, p) => {
                if let Some((lx, ly)) = last_point {
                    let curve = QuadraticBezierSegment {
                        from: point(lx, ly),
                        ctrl: point(ctrl.x, ctrl.y),
                        to: point(p.x, p.y),
                    };
                    curve.for_each_flattened(CURVE_TOLERANCE, &mut |segment| {
                        current.push(Point::new(segment.to.x as f64, segment.to.y as f64));
                    });
                } else {
                    current.push(Point::new(p.x as f64, p.y as f64));
                }
                last_point = Some((p.x, p.y));
            }
            usvg::tiny_skia_path::PathSegment::CubicTo(ctrl1, ctrl2, p) => {
                if let Some((lx, ly)) = last_point {
                    let curve = CubicBezierSegment {
                        from: point(lx, ly),
                        ctrl1: point(ctrl1.x, ctrl1.y),
                        ctrl2: point(ctrl2.x, ctrl2.y),
                        to: point(p.x, p.y),
                    };
                    curve.for_each_flattened(CURVE_TOLERANCE, &mut |segment| {
                        current.push(Point::new(segment.to.x as f64, segment.to.y as f64));
                    });
                } else {
                    current.push(Point::new(p.x as f64, p.y as f64));
                }
                last_point = Some((p.x, p.y));
            }
            usvg::tiny_skia_path::PathSegment::Close => {}
        }
    }
    if !current.is_empty() {
        rings.push(current);
    }

    // Remove duplicate consecutive points that can occur from curve flattening
    for ring in &mut rings {
        ring.dedup_by(|a, b| (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6);
    }
    rings.retain(|ring| ring.len() >= 3);

    let mut rings = rings.into_iter();
    let outer = rings.next()?;
    let holes: Vec<Vec<Point>> = rings.collect();

    let id = path.id();
    let polygon_id = if id.is_empty() { None } else { Some(id.to_string()) };

    Some(Polygon::with_id_and_group(outer, holes, polygon_id, group_id.map(str::to_string)))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_rect() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
                <rect x="10" y="10" width="80" height="80"/>
            </svg>
        "#;

        let polygons = extract_polygons_from_svg(svg).unwrap();
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].outer.len(), 4);
        assert!((polygons[0].area() - 6400.0).abs() < 1e-6);
    }

    #[test]
    fn parse_polygon_element_with_id() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
                <polygon id="study-area" points="10,10 90,10 90,90 10,90"/>
            </svg>
        "#;

        let polygons = extract_polygons_from_svg(svg).unwrap();
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].id.as_deref(), Some("study-area"));
    }

    #[test]
    fn subpaths_become_holes() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
                <path fill-rule="evenodd" d="M 0,0 L 100,0 L 100,100 L 0,100 Z M 25,25 L 75,25 L 75,75 L 25,75 Z"/>
            </svg>
        "#;

        let polygons = extract_polygons_from_svg(svg).unwrap();
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].holes.len(), 1);
        assert!((polygons[0].area() - 7500.0).abs() < 1e-6);
    }

    #[test]
    fn layers_are_selected_by_group_id() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
                <g id="region">
                    <rect x="0" y="0" width="100" height="100"/>
                </g>
                <g id="land">
                    <rect x="0" y="0" width="50" height="100"/>
                    <rect x="60" y="60" width="10" height="10"/>
                </g>
            </svg>
        "#;

        let polygons = extract_polygons_from_svg(svg).unwrap();
        assert_eq!(polygons.len(), 3);
        assert_eq!(select_layer(&polygons, "region").len(), 1);
        assert_eq!(select_layer(&polygons, "land").len(), 2);
        assert!(select_layer(&polygons, "sea").is_empty());
    }

    #[test]
    fn group_transforms_are_applied() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
                <g id="region">
                    <rect x="0" y="0" width="10" height="10"/>
                </g>
                <g id="land" transform="translate(50,0)">
                    <rect x="0" y="0" width="10" height="10"/>
                </g>
                <g transform="scale(2)">
                    <g id="shoal" transform="translate(5,5)">
                        <rect x="0" y="0" width="10" height="10"/>
                    </g>
                </g>
            </svg>
        "#;

        let polygons = extract_polygons_from_svg(svg).unwrap();
        let bbox = |layer: &str| select_layer(&polygons, layer)[0].bounding_box().unwrap();

        assert_eq!(bbox("region"), (0.0, 0.0, 10.0, 10.0));
        assert_eq!(bbox("land"), (50.0, 0.0, 60.0, 10.0));
        assert_eq!(bbox("shoal"), (10.0, 10.0, 30.0, 30.0));
    }

    #[test]
    fn without_layer_is_the_complement() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
                <g id="region">
                    <rect x="0" y="0" width="100" height="100"/>
                </g>
                <g id="land">
                    <rect x="0" y="0" width="50" height="100"/>
                </g>
            </svg>
        "#;

        let polygons = extract_polygons_from_svg(svg).unwrap();
        let rest = without_layer(&polygons, "land");
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].group_id.as_deref(), Some("region"));
    }

    #[test]
    fn no_polygons_error() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
            </svg>
        "#;

        let result = extract_polygons_from_svg(svg);
        assert!(matches!(result, Err(SvgError::NoPolygons)));
    }

    #[test]
    fn malformed_svg_is_a_parse_error() {
        let result = extract_polygons_from_svg("<svg");
        assert!(matches!(result, Err(SvgError::ParseError(_))));
    }

    #[test]
    fn curve_flattening_circle() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
                <circle cx="50" cy="50" r="40"/>
            </svg>
        "#;

        let polygons = extract_polygons_from_svg(svg).unwrap();
        assert_eq!(polygons.len(), 1);
        assert!(polygons[0].outer.len() > 20,
            "Circle should have many points from curve flattening, got {}",
            polygons[0].outer.len());
        let expected = std::f64::consts::PI * 40.0 * 40.0;
        assert!((polygons[0].area() - expected).abs() / expected < 0.01);
    }
}
