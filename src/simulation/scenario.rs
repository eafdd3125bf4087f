//! Scenario configuration loaded from TOML
//!
//! A scenario describes the grid, slide timing, which edges lead onto the
//! track and where each vehicle starts. Missing grid and slide settings fall
//! back to the defaults of the built-in demo lot.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::track::Edge;
use super::types::{
    DirectionSign, Orientation, DEFAULT_CELL_SIZE, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH,
    DEFAULT_SLIDE_DURATION, DEFAULT_SLIDE_TIMEOUT,
};

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub slide: SlideConfig,
    #[serde(default)]
    pub exits: ExitConfig,
    #[serde(default)]
    pub vehicles: Vec<VehicleConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlideConfig {
    #[serde(default = "default_slide_duration")]
    pub duration: f32,
    #[serde(default = "default_slide_timeout")]
    pub timeout: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExitConfig {
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Individual exit cells as `[column, row]`
    #[serde(default)]
    pub cells: Vec<[i32; 2]>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VehicleConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub column: i32,
    pub row: i32,
    pub orientation: Orientation,
    #[serde(default = "default_length")]
    pub length: u32,
    #[serde(default = "default_sign")]
    pub sign: DirectionSign,
}

fn default_width() -> u32 { DEFAULT_GRID_WIDTH }
fn default_height() -> u32 { DEFAULT_GRID_HEIGHT }
fn default_cell_size() -> f32 { DEFAULT_CELL_SIZE }
fn default_slide_duration() -> f32 { DEFAULT_SLIDE_DURATION }
fn default_slide_timeout() -> f32 { DEFAULT_SLIDE_TIMEOUT }
fn default_length() -> u32 { 1 }
fn default_sign() -> DirectionSign { DirectionSign::Positive }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            cell_size: default_cell_size(),
        }
    }
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            duration: default_slide_duration(),
            timeout: default_slide_timeout(),
        }
    }
}

impl VehicleConfig {
    pub fn new(
        column: i32,
        row: i32,
        orientation: Orientation,
        length: u32,
        sign: DirectionSign,
    ) -> Self {
        Self {
            name: None,
            column,
            row,
            orientation,
            length,
            sign,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// The demo lot: a handful of cars packed into a 6x8 grid with the track
/// running past the right and top edges
fn default_vehicles() -> Vec<VehicleConfig> {
    use DirectionSign::{Negative, Positive};
    use Orientation::{Horizontal, Vertical};

    vec![
        VehicleConfig::new(1, 0, Horizontal, 2, Positive).named("A"),
        VehicleConfig::new(3, 0, Vertical, 1, Positive).named("B"),
        VehicleConfig::new(4, 2, Horizontal, 3, Positive).named("C"),
        VehicleConfig::new(0, 3, Vertical, 2, Negative).named("D"),
        VehicleConfig::new(2, 5, Vertical, 2, Positive).named("E"),
        VehicleConfig::new(3, 6, Horizontal, 2, Negative).named("F"),
        VehicleConfig::new(1, 7, Horizontal, 2, Positive).named("G"),
    ]
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            slide: SlideConfig::default(),
            exits: ExitConfig {
                edges: vec![Edge::Right, Edge::Top],
                cells: Vec::new(),
            },
            vehicles: default_vehicles(),
        }
    }
}

impl ScenarioConfig {
    /// Parse a scenario from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse scenario")
    }

    /// Load a scenario file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid scenario {}", path.display()))
    }
}
