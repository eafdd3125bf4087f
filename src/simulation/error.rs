//! Error taxonomy for grid operations

use thiserror::Error;

use super::types::{Cell, VehicleId};

/// Errors raised by the grid, mapper and world
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    /// A direct occupancy query named a cell outside the grid
    #[error("cell ({column}, {row}) is outside the {width}x{height} grid")]
    OutOfBounds {
        column: i32,
        row: i32,
        width: u32,
        height: u32,
    },
    #[error("grid dimensions must be positive and fit in i32 (got {width}x{height})")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("cell size must be a positive finite number (got {0})")]
    InvalidCellSize(f32),
    #[error("slide duration must be a non-negative finite number (got {0})")]
    InvalidSlideDuration(f32),
    #[error("slide timeout must be a positive finite number (got {0})")]
    InvalidSlideTimeout(f32),
    #[error("footprint length must be positive (got {0})")]
    InvalidFootprint(u32),
    #[error("direction sign must be +1 or -1 (got {0})")]
    InvalidDirectionSign(i32),
    #[error("vehicle not found: {0:?}")]
    UnknownVehicle(VehicleId),
}

impl GridError {
    pub(crate) fn out_of_bounds(cell: Cell, width: u32, height: u32) -> Self {
        GridError::OutOfBounds {
            column: cell.column,
            row: cell.row,
            width,
            height,
        }
    }
}

/// Result type for grid operations
pub type GridResult<T> = Result<T, GridError>;
