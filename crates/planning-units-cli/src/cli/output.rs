//! Grid serialization: SVG preview, JSON, GeoJSON, PNG.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use resvg::usvg;
use serde::Serialize;
use tiny_skia::Pixmap;

use planning_units::{Bounds, ExclusionLayer, PlanningGrid, Point, Polygon, Region};

/// Width of rendered PNG previews, in pixels.
const PNG_WIDTH: u32 = 2000;

/// A point in JSON output format.
#[derive(Serialize)]
struct JsonPoint {
    x: f64,
    y: f64,
}

/// Build statistics for JSON output.
#[derive(Serialize)]
struct JsonStats {
    candidates: usize,
    outside_region: usize,
    excluded: usize,
    units: usize,
}

/// One planning unit in JSON output.
#[derive(Serialize)]
struct JsonUnit {
    #[serde(rename = "cellID")]
    cell_id: u32,
    row: usize,
    col: usize,
    centroid: JsonPoint,
    area_km2: f64,
    vertices: Vec<[f64; 2]>,
}

/// Whole-grid JSON document.
#[derive(Serialize)]
struct JsonGrid<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    shape: &'static str,
    target_area_km2: f64,
    cell_size_m: f64,
    stats: JsonStats,
    units: Vec<JsonUnit>,
}

#[derive(Serialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    properties: FeatureProperties,
    geometry: FeatureGeometry,
}

#[derive(Serialize)]
struct FeatureProperties {
    #[serde(rename = "cellID")]
    cell_id: u32,
    area_km2: f64,
}

#[derive(Serialize)]
struct FeatureGeometry {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: Vec<Vec<[f64; 2]>>,
}

fn coords(ring: &[Point]) -> Vec<[f64; 2]> {
    ring.iter().map(|p| [p.x, p.y]).collect()
}

/// GeoJSON rings repeat the first vertex at the end.
fn closed_coords(ring: &[Point]) -> Vec<[f64; 2]> {
    let mut out = coords(ring);
    if let Some(first) = out.first().copied() {
        out.push(first);
    }
    out
}

/// Serialize the grid as a JSON document.
pub fn grid_to_json(grid: &PlanningGrid, name: Option<&str>) -> Result<String> {
    let doc = JsonGrid {
        name,
        shape: grid.shape.name(),
        target_area_km2: grid.target_area_km2,
        cell_size_m: grid.cell_size,
        stats: JsonStats {
            candidates: grid.stats.candidates,
            outside_region: grid.stats.outside_region,
            excluded: grid.stats.excluded,
            units: grid.stats.units,
        },
        units: grid
            .units
            .iter()
            .map(|u| JsonUnit {
                cell_id: u.cell_id,
                row: u.row,
                col: u.col,
                centroid: JsonPoint { x: u.centroid.x, y: u.centroid.y },
                area_km2: u.area_km2(),
                vertices: coords(&u.polygon.outer),
            })
            .collect(),
    };

    let mut text = serde_json::to_string_pretty(&doc).context("Failed to serialize grid JSON")?;
    text.push('\n');
    Ok(text)
}

/// Serialize the grid as a GeoJSON FeatureCollection of unit polygons.
pub fn grid_to_geojson(grid: &PlanningGrid) -> Result<String> {
    let doc = FeatureCollection {
        kind: "FeatureCollection",
        features: grid
            .units
            .iter()
            .map(|u| Feature {
                kind: "Feature",
                properties: FeatureProperties { cell_id: u.cell_id, area_km2: u.area_km2() },
                geometry: FeatureGeometry {
                    kind: "Polygon",
                    coordinates: vec![closed_coords(&u.polygon.outer)],
                },
            })
            .collect(),
    };

    let mut text = serde_json::to_string(&doc).context("Failed to serialize GeoJSON")?;
    text.push('\n');
    Ok(text)
}

/// SVG path data for a polygon, holes included.
fn polygon_path(poly: &Polygon) -> String {
    let mut d = String::new();
    for ring in std::iter::once(&poly.outer).chain(poly.holes.iter()) {
        for (i, pt) in ring.iter().enumerate() {
            let cmd = if i == 0 { "M" } else { " L" };
            d.push_str(&format!("{}{:.2},{:.2}", cmd, pt.x, pt.y));
        }
        d.push_str(" Z ");
    }
    d.trim_end().to_string()
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

/// Preview drawing: exclusion fill, region outline, unit outlines.
///
/// Coordinates are written in metres; the viewBox frames the region with
/// a small margin.
pub fn grid_to_svg(
    grid: &PlanningGrid,
    region: &Region,
    exclusion: Option<&ExclusionLayer>,
    name: Option<&str>,
) -> String {
    let (min_x, min_y, max_x, max_y) = padded_bounds(region);
    let width = max_x - min_x;
    let height = max_y - min_y;
    let stroke = width.max(height) / 1000.0;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="{:.2} {:.2} {:.2} {:.2}">
"#,
        min_x, min_y, width, height
    ));
    if let Some(title) = name {
        svg.push_str(&format!("<title>{}</title>\n", escape_xml(title)));
    }
    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"white\"/>\n",
        min_x, min_y, width, height
    ));

    if let Some(layer) = exclusion {
        svg.push_str("<g id=\"exclusion\" fill=\"#e0d6c2\" stroke=\"none\" fill-rule=\"evenodd\">\n");
        for poly in layer.polygons() {
            svg.push_str(&format!("  <path d=\"{}\"/>\n", polygon_path(poly)));
        }
        svg.push_str("</g>\n");
    }

    svg.push_str(&format!(
        "<g id=\"region\" fill=\"none\" stroke=\"#7a9cc6\" stroke-width=\"{:.3}\" fill-rule=\"evenodd\">\n",
        stroke * 3.0
    ));
    for poly in region.polygons() {
        svg.push_str(&format!("  <path d=\"{}\"/>\n", polygon_path(poly)));
    }
    svg.push_str("</g>\n");

    svg.push_str(&format!(
        "<g id=\"planning-units\" fill=\"none\" stroke=\"black\" stroke-width=\"{:.3}\">\n",
        stroke
    ));
    for unit in &grid.units {
        let points: String = unit
            .polygon
            .outer
            .iter()
            .map(|p| format!("{:.2},{:.2}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");
        svg.push_str(&format!(
            "  <polygon id=\"pu-{}\" data-cell-id=\"{}\" points=\"{}\"/>\n",
            unit.cell_id, unit.cell_id, points
        ));
    }
    svg.push_str("</g>\n</svg>\n");
    svg
}

/// Rasterize an SVG preview to a PNG file.
pub fn render_png(svg: &str, path: &Path) -> Result<()> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &options).context("Failed to parse generated SVG")?;

    let size = tree.size();
    let scale = PNG_WIDTH as f32 / size.width();
    let height = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = Pixmap::new(PNG_WIDTH, height)
        .ok_or_else(|| anyhow!("Failed to create {}x{} pixmap", PNG_WIDTH, height))?;
    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .save_png(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn padded_bounds(region: &Region) -> Bounds {
    let (min_x, min_y, max_x, max_y) = region.bounding_box().unwrap_or((0.0, 0.0, 1.0, 1.0));
    let pad = (max_x - min_x).max(max_y - min_y).max(1.0) * 0.02;
    (min_x - pad, min_y - pad, max_x + pad, max_y + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use planning_units::{CellShape, GridBuilder};

    fn grid() -> (PlanningGrid, Region) {
        let region = Region::from_polygon(Polygon::rectangle(0.0, 0.0, 3000.0, 2000.0));
        let grid = GridBuilder::new(CellShape::Square, 1.0).build(&region, None).unwrap();
        (grid, region)
    }

    #[test]
    fn json_carries_cell_ids_and_stats() {
        let (grid, _) = grid();
        let text = grid_to_json(&grid, Some("test")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["shape"], "square");
        assert_eq!(value["stats"]["units"], 6);
        assert_eq!(value["units"][0]["cellID"], 1);
        assert_eq!(value["units"][5]["cellID"], 6);
        assert_eq!(value["units"][0]["vertices"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn geojson_rings_are_closed() {
        let (grid, _) = grid();
        let value: serde_json::Value = serde_json::from_str(&grid_to_geojson(&grid).unwrap()).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        let ring = value["features"][0]["geometry"]["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
        assert_eq!(value["features"][2]["properties"]["cellID"], 3);
    }

    #[test]
    fn svg_has_one_polygon_per_unit() {
        let (grid, region) = grid();
        let land = ExclusionLayer::new(vec![Polygon::rectangle(0.0, 0.0, 100.0, 100.0)]);
        let svg = grid_to_svg(&grid, &region, Some(&land), Some("a & b"));
        assert_eq!(svg.matches("<polygon").count(), 6);
        assert!(svg.contains("data-cell-id=\"6\""));
        assert!(svg.contains("<title>a &amp; b</title>"));
        assert!(svg.contains("id=\"exclusion\""));
    }

    #[test]
    fn polygon_path_includes_holes() {
        let donut = Polygon::with_holes(
            Polygon::rectangle(0.0, 0.0, 10.0, 10.0).outer,
            vec![Polygon::rectangle(2.0, 2.0, 4.0, 4.0).outer],
        );
        let d = polygon_path(&donut);
        assert_eq!(d.matches('M').count(), 2);
        assert_eq!(d.matches('Z').count(), 2);
    }
}
