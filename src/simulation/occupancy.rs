//! Cell ownership table for the parking grid
//!
//! The single source of truth for which vehicle occupies which cell. Cells are
//! stored row-major in a dense array sized once at construction.

use log::{debug, trace};

use super::error::{GridError, GridResult};
use super::mapper::GridMapper;
use super::types::{Cell, VehicleId};

/// Result of checking whether a vehicle could stand on a set of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Free,
    OutOfBounds(Cell),
    Occupied(Cell, VehicleId),
}

/// Dense cell -> vehicle table
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    mapper: GridMapper,
    cells: Vec<Option<VehicleId>>,
}

impl OccupancyGrid {
    /// Create an empty grid covering every cell of `mapper`
    pub fn new(mapper: GridMapper) -> Self {
        let len = mapper.width() as usize * mapper.height() as usize;
        Self {
            mapper,
            cells: vec![None; len],
        }
    }

    pub fn mapper(&self) -> &GridMapper {
        &self.mapper
    }

    /// Who occupies `cell`
    ///
    /// Cells outside the grid are an error rather than empty, so "off the grid"
    /// can never be mistaken for "free to occupy".
    pub fn occupant_at(&self, cell: Cell) -> GridResult<Option<VehicleId>> {
        let index = self.checked_index(cell)?;
        Ok(self.cells[index])
    }

    /// True if `cell` is in bounds and unclaimed
    pub fn is_free(&self, cell: Cell) -> bool {
        matches!(self.occupant_at(cell), Ok(None))
    }

    /// Claim `cell` for `vehicle` if it is empty
    ///
    /// Never overwrites another vehicle. Returns whether `vehicle` owns the
    /// cell afterwards.
    pub fn register_head(&mut self, cell: Cell, vehicle: VehicleId) -> bool {
        let Some(index) = self.mapper.index_of(cell) else {
            trace!("Ignoring head registration outside the grid at {:?}", cell);
            return false;
        };
        match self.cells[index] {
            None => {
                self.cells[index] = Some(vehicle);
                debug!("{:?} registered head at {:?}", vehicle, cell);
                true
            }
            Some(owner) => owner == vehicle,
        }
    }

    /// Clear `cell` if, and only if, `vehicle` holds it
    ///
    /// Redundant calls are no-ops.
    pub fn unregister(&mut self, cell: Cell, vehicle: VehicleId) {
        let Some(index) = self.mapper.index_of(cell) else {
            return;
        };
        if let Some(current) = self.cells[index] {
            if current == vehicle {
                self.cells[index] = None;
                debug!("{:?} vacated {:?}", vehicle, cell);
            } else {
                trace!(
                    "{:?} tried to vacate {:?} owned by {:?}; ignored",
                    vehicle,
                    cell,
                    current
                );
            }
        }
    }

    /// Claim every currently empty cell in `cells` for `vehicle`
    ///
    /// Cells held by another vehicle are skipped. Returns how many cells were
    /// newly claimed.
    pub fn register_tail(&mut self, cells: &[Cell], vehicle: VehicleId) -> usize {
        let mut claimed = 0;
        for &cell in cells {
            let Some(index) = self.mapper.index_of(cell) else {
                continue;
            };
            match self.cells[index] {
                None => {
                    self.cells[index] = Some(vehicle);
                    claimed += 1;
                }
                Some(owner) if owner != vehicle => {
                    debug!(
                        "{:?} tail skipped {:?}, already held by {:?}",
                        vehicle, cell, owner
                    );
                }
                Some(_) => {}
            }
        }
        claimed
    }

    /// Clear every cell held by `vehicle`
    pub fn unregister_vehicle(&mut self, vehicle: VehicleId) -> usize {
        let mut cleared = 0;
        for slot in self.cells.iter_mut() {
            if *slot == Some(vehicle) {
                *slot = None;
                cleared += 1;
            }
        }
        if cleared > 0 {
            debug!("{:?} vacated all {} cells", vehicle, cleared);
        }
        cleared
    }

    /// Check whether `vehicle` could stand on every cell in `cells`
    pub fn can_occupy(&self, cells: &[Cell], vehicle: VehicleId) -> Placement {
        for &cell in cells {
            match self.occupant_at(cell) {
                Err(_) => return Placement::OutOfBounds(cell),
                Ok(Some(owner)) if owner != vehicle => return Placement::Occupied(cell, owner),
                Ok(_) => {}
            }
        }
        Placement::Free
    }

    /// All cells currently held by `vehicle`, row-major
    pub fn cells_of(&self, vehicle: VehicleId) -> Vec<Cell> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, slot)| **slot == Some(vehicle))
            .map(|(index, _)| self.mapper.cell_at(index))
            .collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|slot| slot.is_some()).count()
    }

    /// Iterate over every cell with its occupant, row-major
    pub fn iter(&self) -> impl Iterator<Item = (Cell, Option<VehicleId>)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, slot)| (self.mapper.cell_at(index), *slot))
    }

    fn checked_index(&self, cell: Cell) -> GridResult<usize> {
        let mapper = &self.mapper;
        mapper
            .index_of(cell)
            .ok_or_else(|| GridError::out_of_bounds(cell, mapper.width(), mapper.height()))
    }
}
