//! Core types for the parking simulation
//!
//! These are standalone types that don't depend on any engine.

use serde::Deserialize;

use super::error::GridError;

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub usize);

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub SimId);

/// A 3D position in the simulation (Y is up, lanes run along X and Z)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn lerp(&self, other: &Position, t: f32) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

/// One discrete grid position addressed by (column, row)
///
/// Coordinates are signed so that walks and clamps can step past the grid
/// edge before being brought back in bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub column: i32,
    pub row: i32,
}

impl Cell {
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// The cell `steps` cells away along `orientation` in the direction of `sign`
    ///
    /// Saturates at the `i32` range instead of wrapping.
    pub fn step(&self, orientation: Orientation, sign: DirectionSign, steps: i32) -> Cell {
        let delta = sign.value().saturating_mul(steps);
        match orientation {
            Orientation::Horizontal => Cell::new(self.column.saturating_add(delta), self.row),
            Orientation::Vertical => Cell::new(self.column, self.row.saturating_add(delta)),
        }
    }
}

/// Fixed axis along which a vehicle's footprint and movement are constrained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Along world X (grid columns)
    Horizontal,
    /// Along world Z (grid rows)
    Vertical,
}

/// Which way along the orientation axis is "forward" for a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "i32")]
pub enum DirectionSign {
    Positive,
    Negative,
}

impl DirectionSign {
    pub fn value(self) -> i32 {
        match self {
            DirectionSign::Positive => 1,
            DirectionSign::Negative => -1,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            DirectionSign::Positive => DirectionSign::Negative,
            DirectionSign::Negative => DirectionSign::Positive,
        }
    }
}

impl TryFrom<i32> for DirectionSign {
    type Error = GridError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DirectionSign::Positive),
            -1 => Ok(DirectionSign::Negative),
            other => Err(GridError::InvalidDirectionSign(other)),
        }
    }
}

/// Why a move request stopped where it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    /// Reached the edge of the grid without meeting anything
    ClearPath,
    /// Stopped one cell short of another vehicle
    BlockedByVehicle,
    /// Reached an edge cell that leads onto the track
    BlockedByBoundary,
}

/// Movement state of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleState {
    Idle,
    Sliding,
    /// Handed off to the path system; no longer grid-managed
    OnTrack,
}

/// Default number of grid columns
pub const DEFAULT_GRID_WIDTH: u32 = 6;

/// Default number of grid rows
pub const DEFAULT_GRID_HEIGHT: u32 = 8;

/// Default size of a grid cell in world units
pub const DEFAULT_CELL_SIZE: f32 = 1.0;

/// Time a slide takes to reach its target in seconds
pub const DEFAULT_SLIDE_DURATION: f32 = 0.3;

/// Time after which an unfinished slide is force-completed
pub const DEFAULT_SLIDE_TIMEOUT: f32 = 2.0;
