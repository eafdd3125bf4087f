//! Movement resolution for sliding vehicles
//!
//! A vehicle slides along its orientation axis until the next cell is held by
//! another vehicle or the grid edge is reached. The resolver computes that
//! furthest legal cell from the current occupancy without mutating anything.

use log::debug;

use super::mapper::GridMapper;
use super::occupancy::OccupancyGrid;
use super::types::{Cell, DirectionSign, MoveOutcome, Orientation, Position, VehicleId};

/// Decides whether a terminal edge cell leads onto the track
///
/// Track adjacency is external state, so it is supplied by the caller.
pub trait ExitRule {
    fn is_exit(&self, cell: Cell) -> bool;
}

impl<F> ExitRule for F
where
    F: Fn(Cell) -> bool,
{
    fn is_exit(&self, cell: Cell) -> bool {
        self(cell)
    }
}

/// Exit rule for grids with no track attached
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExits;

impl ExitRule for NoExits {
    fn is_exit(&self, _cell: Cell) -> bool {
        false
    }
}

/// A single move request
#[derive(Debug, Clone, Copy)]
pub struct MoveQuery {
    pub vehicle: VehicleId,
    pub position: Position,
    pub orientation: Orientation,
    pub sign: DirectionSign,
    /// Number of steps to search; grid width + height always reaches an edge
    pub max_distance: i32,
}

/// Where a move request ends and why
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Cell the vehicle started from
    pub start: Cell,
    /// Furthest legal cell
    pub cell: Cell,
    /// World position of `cell`
    pub position: Position,
    pub outcome: MoveOutcome,
    /// The vehicle that stopped the scan, if any
    pub blocker: Option<VehicleId>,
    /// Cells scanned in visiting order, excluding `start`
    pub path: Vec<Cell>,
}

impl Resolution {
    pub fn moves(&self) -> bool {
        self.cell != self.start
    }
}

/// Read-only view over the occupancy grid that answers move requests
pub struct MovementResolver<'a> {
    grid: &'a OccupancyGrid,
}

impl<'a> MovementResolver<'a> {
    pub fn new(grid: &'a OccupancyGrid) -> Self {
        Self { grid }
    }

    /// Compute the furthest legal cell for `query`
    ///
    /// The current position is snapped to the nearest in-bounds cell before
    /// scanning, so a request made off-centre still resolves deterministically.
    pub fn resolve(&self, query: &MoveQuery, exits: &dyn ExitRule) -> Resolution {
        let mapper = self.grid.mapper();
        let start = mapper.snap(query.position);
        let target = target_cell(
            mapper,
            start,
            query.orientation,
            query.sign,
            query.max_distance,
        );
        let path = visited_cells(start, target);

        let mut furthest = start;
        let mut outcome = MoveOutcome::ClearPath;
        let mut blocker = None;

        for (i, &cell) in path.iter().enumerate() {
            match self.grid.occupant_at(cell) {
                Ok(Some(owner)) if owner != query.vehicle => {
                    furthest = if i == 0 { start } else { path[i - 1] };
                    outcome = MoveOutcome::BlockedByVehicle;
                    blocker = Some(owner);
                    break;
                }
                _ => furthest = cell,
            }
        }

        if outcome == MoveOutcome::ClearPath && exits.is_exit(furthest) {
            outcome = MoveOutcome::BlockedByBoundary;
        }

        debug!(
            "{:?} resolved {:?} -> {:?} ({:?})",
            query.vehicle, start, furthest, outcome
        );

        Resolution {
            start,
            cell: furthest,
            position: mapper.grid_to_world(furthest),
            outcome,
            blocker,
            path,
        }
    }
}

/// Walk `distance` steps from `from` along the axis, then clamp into the grid
pub fn target_cell(
    mapper: &GridMapper,
    from: Cell,
    orientation: Orientation,
    sign: DirectionSign,
    distance: i32,
) -> Cell {
    mapper.clamp_to_grid(from.step(orientation, sign, distance))
}

/// Every cell after `from` up to and including `to`, in visiting order
///
/// Columns are walked first, then rows, so cells that differ on both axes
/// produce an L-shaped walk. Equal cells yield an empty list.
pub fn visited_cells(from: Cell, to: Cell) -> Vec<Cell> {
    let mut cells = Vec::new();

    let step_x = (to.column - from.column).signum();
    if step_x != 0 {
        let mut column = from.column;
        while column != to.column {
            column += step_x;
            cells.push(Cell::new(column, from.row));
        }
    }

    let step_y = (to.row - from.row).signum();
    if step_y != 0 {
        let mut row = from.row;
        while row != to.row {
            row += step_y;
            cells.push(Cell::new(to.column, row));
        }
    }

    cells
}

/// Tail cells behind `head`, nearest first, clipped at the grid edge
pub fn tail_cells(
    mapper: &GridMapper,
    head: Cell,
    orientation: Orientation,
    sign: DirectionSign,
    length: u32,
) -> Vec<Cell> {
    if length <= 1 {
        return Vec::new();
    }
    let steps = i32::try_from(length - 1)
        .unwrap_or(i32::MAX)
        .min(mapper.max_search_distance());
    let end = target_cell(mapper, head, orientation, sign.reversed(), steps);
    visited_cells(head, end)
}

/// Head cell followed by its tail
pub fn footprint_cells(
    mapper: &GridMapper,
    head: Cell,
    orientation: Orientation,
    sign: DirectionSign,
    length: u32,
) -> Vec<Cell> {
    let mut cells = vec![head];
    cells.extend(tail_cells(mapper, head, orientation, sign, length));
    cells
}
