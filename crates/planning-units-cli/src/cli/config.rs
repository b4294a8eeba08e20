//! Grid configuration files.
//!
//! A config is a YAML file describing one grid build. Paths inside it are
//! resolved relative to the file's own directory. Every field can be
//! overridden from the command line.
//!
//! ```yaml
//! name: coastal-shelf
//! region: shelf.svg
//! exclusion: land.svg
//! target_area_km2: 25
//! shape: hexagon
//! meters_per_unit: 100
//! format: geojson
//! output: shelf-units.geojson
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use planning_units::CellShape;

use super::common::OutputFormat;
use crate::BuildArgs;

/// A grid build described in YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    /// Optional title, copied into JSON/SVG output
    #[serde(default)]
    pub name: Option<String>,

    /// Region SVG
    #[serde(default)]
    pub region: Option<PathBuf>,

    /// Group or element ID selecting region polygons
    #[serde(default)]
    pub region_layer: Option<String>,

    /// Exclusion SVG
    #[serde(default)]
    pub exclusion: Option<PathBuf>,

    /// Group or element ID selecting exclusion polygons
    #[serde(default)]
    pub exclusion_layer: Option<String>,

    /// Metres per SVG user unit
    #[serde(default)]
    pub meters_per_unit: Option<f64>,

    /// Target planning-unit area in km²
    #[serde(default)]
    pub target_area_km2: Option<f64>,

    /// "square" or "hexagon"
    #[serde(default)]
    pub shape: Option<String>,

    #[serde(default)]
    pub format: Option<OutputFormat>,

    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Fully resolved settings for one build.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub name: Option<String>,
    pub region: PathBuf,
    pub region_layer: Option<String>,
    pub exclusion: Option<PathBuf>,
    pub exclusion_layer: Option<String>,
    pub meters_per_unit: f64,
    pub target_area_km2: f64,
    pub shape: CellShape,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

impl GridConfig {
    /// Load a config from a YAML file, resolving relative paths against it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: GridConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config YAML {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.relative_to(base))
    }

    fn relative_to(mut self, base: &Path) -> Self {
        let fix = |p: Option<PathBuf>| p.map(|p| if p.is_relative() { base.join(p) } else { p });
        self.region = fix(self.region);
        self.exclusion = fix(self.exclusion);
        self.output = fix(self.output);
        self
    }

    /// Merge with command-line flags (flags win) and fill in defaults.
    pub fn resolve(self, args: BuildArgs) -> Result<BuildSettings> {
        let region = args
            .region
            .or(self.region)
            .context("No region given: pass REGION_SVG or set `region` in the config")?;

        let target_area_km2 = args
            .area
            .or(self.target_area_km2)
            .context("No target area given: pass --area or set `target_area_km2` in the config")?;

        let shape = match (args.shape, self.shape) {
            (Some(shape), _) => shape,
            (None, Some(name)) => name.parse::<CellShape>()?,
            (None, None) => CellShape::Hexagon,
        };

        Ok(BuildSettings {
            name: self.name,
            region,
            region_layer: args.region_layer.or(self.region_layer),
            exclusion: args.exclude.or(self.exclusion),
            exclusion_layer: args.exclusion_layer.or(self.exclusion_layer),
            meters_per_unit: args.meters_per_unit.or(self.meters_per_unit).unwrap_or(1.0),
            target_area_km2,
            shape,
            format: args.format.or(self.format).unwrap_or_default(),
            output: args.output.or(self.output),
        })
    }
}
