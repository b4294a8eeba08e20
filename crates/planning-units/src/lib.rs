//! # planning-units
//!
//! Tessellate a study region into square or hexagonal planning units,
//! drop cells whose centroid falls outside the region or on excluded land,
//! and number the survivors `1..=N`.
//!
//! ```
//! use planning_units::{build_planning_units, CellShape, ExclusionLayer, Polygon, Region};
//!
//! let region = Region::from_polygon(Polygon::rectangle(-5000.0, -5000.0, 5000.0, 5000.0));
//! let land = ExclusionLayer::new(vec![Polygon::rectangle(-6000.0, -6000.0, 0.0, 6000.0)]);
//!
//! let units = build_planning_units(&region, 1.0, CellShape::Square, Some(&land)).unwrap();
//! assert_eq!(units.len(), 50);
//! assert!(units.iter().all(|u| u.centroid.x >= 0.0));
//! ```
//!
//! ## Rust Lesson #7: Modules
//!
//! - `mod foo;` = load from `foo.rs` or `foo/mod.rs`
//! - `pub mod foo;` = also export it publicly
//! - `pub use foo::Bar;` = re-export Bar at this level

pub mod builder;
pub mod error;
pub mod geometry;
pub mod lattice;
pub mod predicates;
pub mod svg;
pub mod validate;

// Re-export common types at crate root for convenience.
pub use builder::{build_planning_units, GridBuilder, GridStats, PlanningGrid, PlanningUnit};
pub use error::GridError;
pub use geometry::{Bounds, ExclusionLayer, Point, Polygon, Region, M2_PER_KM2};
pub use lattice::{tessellate, Cell, CellShape, MAX_CANDIDATE_CELLS};
pub use predicates::{layer_covers_point, point_in_polygon, polygon_covers_point, region_covers_point};
pub use svg::{extract_polygons_from_svg, select_layer, without_layer, SvgError};
pub use validate::{validate_exclusion, validate_region};
