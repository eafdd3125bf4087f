//! Conversions between world space and grid cells
//!
//! World X maps to the grid column and world Z to the grid row. Cell (0, 0)
//! sits at the world origin and every cell is centred on an integer multiple
//! of the cell size.

use super::error::{GridError, GridResult};
use super::types::{Cell, Position};

/// Pure coordinate mapper parameterised by grid extents and cell size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapper {
    width: u32,
    height: u32,
    cell_size: f32,
}

impl GridMapper {
    /// Create a mapper, rejecting empty grids and non-positive cell sizes
    ///
    /// Cells are addressed with `i32`, so neither extent may exceed `i32::MAX`.
    pub fn new(width: u32, height: u32, cell_size: f32) -> GridResult<Self> {
        let max = i32::MAX as u32;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(GridError::InvalidDimensions { width, height });
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            width,
            height,
            cell_size,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Round a world position to the nearest cell
    ///
    /// Ties at a cell boundary round half to even, so a position exactly
    /// halfway between cells 2 and 3 lands in cell 2. The result is not
    /// clamped and may lie outside the grid.
    pub fn world_to_grid(&self, position: Position) -> Cell {
        let column = (position.x / self.cell_size).round_ties_even() as i32;
        let row = (position.z / self.cell_size).round_ties_even() as i32;
        Cell::new(column, row)
    }

    /// World position of a cell's centre, on the ground plane
    pub fn grid_to_world(&self, cell: Cell) -> Position {
        Position::new(
            cell.column as f32 * self.cell_size,
            0.0,
            cell.row as f32 * self.cell_size,
        )
    }

    /// Clamp each axis independently into the grid
    pub fn clamp_to_grid(&self, cell: Cell) -> Cell {
        Cell::new(
            cell.column.clamp(0, self.width as i32 - 1),
            cell.row.clamp(0, self.height as i32 - 1),
        )
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.column >= 0
            && cell.column < self.width as i32
            && cell.row >= 0
            && cell.row < self.height as i32
    }

    /// Nearest in-bounds cell to a world position
    pub fn snap(&self, position: Position) -> Cell {
        self.clamp_to_grid(self.world_to_grid(position))
    }

    /// Enough steps along either axis to reach any edge from any cell
    pub fn max_search_distance(&self) -> i32 {
        (self.width as i32).saturating_add(self.height as i32)
    }

    /// Row-major index of an in-bounds cell
    pub(crate) fn index_of(&self, cell: Cell) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        Some(cell.row as usize * self.width as usize + cell.column as usize)
    }

    pub(crate) fn cell_at(&self, index: usize) -> Cell {
        let width = self.width as usize;
        Cell::new((index % width) as i32, (index / width) as i32)
    }
}
