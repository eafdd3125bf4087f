//! Vehicle movement state machine
//!
//! Standalone implementation that doesn't depend on any engine. A vehicle is
//! Idle until a move request finds room ahead of it, Sliding while the
//! animator carries it to the resolved cell, and back to Idle once the
//! one-shot completion ticket is handed back. Reaching a track exit instead
//! ends grid management for good.

use log::{debug, info, trace, warn};

use super::error::{GridError, GridResult};
use super::occupancy::{OccupancyGrid, Placement};
use super::resolver::{
    footprint_cells, tail_cells, visited_cells, ExitRule, MoveQuery, MovementResolver,
};
use super::track::BoundaryExit;
use super::types::{
    Cell, DirectionSign, MoveOutcome, Orientation, Position, VehicleId, VehicleState,
};

/// Proof of one in-flight slide
///
/// Issued when a slide starts and consumed when it completes. It cannot be
/// cloned, so each slide completes at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct SlideTicket {
    vehicle: VehicleId,
    slide: u64,
}

impl SlideTicket {
    pub fn vehicle(&self) -> VehicleId {
        self.vehicle
    }
}

/// What a move request did
#[derive(Debug)]
pub struct MoveResponse {
    pub outcome: MoveOutcome,
    pub blocker: Option<VehicleId>,
    pub from: Position,
    pub target: Position,
    /// Present when the vehicle started sliding; hand it to the animator
    pub ticket: Option<SlideTicket>,
}

impl MoveResponse {
    pub fn bumped(&self) -> bool {
        self.outcome == MoveOutcome::BlockedByVehicle
    }

    pub fn started_sliding(&self) -> bool {
        self.ticket.is_some()
    }
}

/// How a slide ended
#[derive(Debug, Clone, PartialEq)]
pub enum MoveCompletion {
    /// Back on the grid with the footprint registered from `head`
    Parked { head: Cell, outcome: MoveOutcome },
    /// Left the grid for the path system
    HandedOff(BoundaryExit),
}

#[derive(Debug, Clone, Copy)]
struct ActiveSlide {
    id: u64,
    start: Cell,
    target: Cell,
    outcome: MoveOutcome,
    started_at: f32,
}

/// A vehicle in the parking simulation
#[derive(Debug, Clone)]
pub struct SimVehicle {
    pub id: VehicleId,
    pub name: Option<String>,
    orientation: Orientation,
    length: u32,
    sign: DirectionSign,
    state: VehicleState,
    head: Cell,
    position: Position,
    slide: Option<ActiveSlide>,
    next_slide: u64,
}

impl SimVehicle {
    pub fn new(
        id: VehicleId,
        orientation: Orientation,
        length: u32,
        sign: DirectionSign,
    ) -> GridResult<Self> {
        if length == 0 {
            return Err(GridError::InvalidFootprint(length));
        }
        Ok(Self {
            id,
            name: None,
            orientation,
            length,
            sign,
            state: VehicleState::Idle,
            head: Cell::new(0, 0),
            position: Position::default(),
            slide: None,
            next_slide: 0,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn sign(&self) -> DirectionSign {
        self.sign
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    pub fn is_sliding(&self) -> bool {
        self.state == VehicleState::Sliding
    }

    /// Last known head cell
    pub fn head(&self) -> Cell {
        self.head
    }

    /// Current head position; follows the animator while sliding
    pub fn position(&self) -> Position {
        self.position
    }

    /// Cell the current slide is heading for
    pub fn slide_target(&self) -> Option<Cell> {
        self.slide.map(|slide| slide.target)
    }

    /// Seconds the current slide has been in flight
    pub fn slide_elapsed(&self, now: f32) -> Option<f32> {
        self.slide.map(|slide| now - slide.started_at)
    }

    /// Head and tail cells anchored at the last known head
    pub fn footprint(&self, grid: &OccupancyGrid) -> Vec<Cell> {
        footprint_cells(grid.mapper(), self.head, self.orientation, self.sign, self.length)
    }

    /// Snap to the cell nearest `position` and register the footprint there
    ///
    /// Returns what stood in the way before registering; cells held by other
    /// vehicles are left untouched.
    pub fn place(&mut self, grid: &mut OccupancyGrid, position: Position) -> Placement {
        let mapper = *grid.mapper();
        self.head = mapper.snap(position);
        self.position = mapper.grid_to_world(self.head);

        let footprint = self.footprint(grid);
        let placement = grid.can_occupy(&footprint, self.id);
        self.register_footprint(grid);
        placement
    }

    /// Follow the animator's interpolated position while sliding
    pub fn sync_position(&mut self, position: Position) {
        if self.state == VehicleState::Sliding {
            self.position = position;
        }
    }

    /// Ask to slide forward as far as the grid allows
    ///
    /// Returns `None` when the request is ignored because the vehicle is
    /// already sliding or has left the grid. A vehicle with no room to move
    /// stays Idle and only reports why.
    pub fn request_move(
        &mut self,
        grid: &mut OccupancyGrid,
        exits: &dyn ExitRule,
        now: f32,
    ) -> Option<MoveResponse> {
        if self.state != VehicleState::Idle {
            trace!("{:?} ignored move request while {:?}", self.id, self.state);
            return None;
        }

        let query = MoveQuery {
            vehicle: self.id,
            position: self.position,
            orientation: self.orientation,
            sign: self.sign,
            max_distance: grid.mapper().max_search_distance(),
        };
        let resolution = MovementResolver::new(grid).resolve(&query, exits);

        let mut response = MoveResponse {
            outcome: resolution.outcome,
            blocker: resolution.blocker,
            from: self.position,
            target: resolution.position,
            ticket: None,
        };

        if resolution.moves() {
            self.vacate(grid);
            let id = self.next_slide;
            self.next_slide += 1;
            self.slide = Some(ActiveSlide {
                id,
                start: resolution.start,
                target: resolution.cell,
                outcome: resolution.outcome,
                started_at: now,
            });
            self.state = VehicleState::Sliding;
            response.ticket = Some(SlideTicket {
                vehicle: self.id,
                slide: id,
            });
        }

        Some(response)
    }

    /// Complete the slide `ticket` was issued for
    ///
    /// Tickets for another vehicle or an earlier slide are ignored.
    pub fn finish_move(
        &mut self,
        ticket: SlideTicket,
        grid: &mut OccupancyGrid,
    ) -> Option<MoveCompletion> {
        let slide = match self.slide {
            Some(slide) if ticket.vehicle == self.id && ticket.slide == slide.id => slide,
            _ => {
                trace!("{:?} ignored stale completion {:?}", self.id, ticket);
                return None;
            }
        };
        Some(self.settle(grid, slide.target, slide.outcome))
    }

    /// Complete the current slide without a ticket, at its resolved target
    pub fn force_complete(&mut self, grid: &mut OccupancyGrid) -> Option<MoveCompletion> {
        let slide = self.slide?;
        warn!("{:?} force-completing slide to {:?}", self.id, slide.target);
        Some(self.settle(grid, slide.target, slide.outcome))
    }

    /// Stop the current slide and park at the cell nearest `at`
    ///
    /// If another vehicle moved into that cell during the slide, the vehicle
    /// backs up toward where the slide started until it finds a cell it can
    /// hold. A cancelled slide never hands off, even if it was heading for an
    /// exit.
    pub fn cancel_move(
        &mut self,
        grid: &mut OccupancyGrid,
        at: Position,
    ) -> Option<MoveCompletion> {
        let slide = self.slide?;
        let nearest = grid.mapper().snap(at);
        let cell = self.parking_cell(grid, nearest, slide.start);
        let outcome = if cell == slide.target && slide.outcome != MoveOutcome::BlockedByBoundary {
            slide.outcome
        } else {
            MoveOutcome::ClearPath
        };
        Some(self.settle(grid, cell, outcome))
    }

    /// Nearest cell at or behind `from`, back to `start`, that is free or ours
    fn parking_cell(&self, grid: &OccupancyGrid, from: Cell, start: Cell) -> Cell {
        let holdable = |cell: &Cell| {
            matches!(
                grid.occupant_at(*cell),
                Ok(occupant) if occupant.map_or(true, |owner| owner == self.id)
            )
        };
        match visited_cells(start, from).into_iter().rev().find(holdable) {
            Some(cell) => cell,
            None => {
                if from != start {
                    debug!("{:?} backed up to slide start {:?}", self.id, start);
                }
                start
            }
        }
    }

    fn settle(
        &mut self,
        grid: &mut OccupancyGrid,
        cell: Cell,
        outcome: MoveOutcome,
    ) -> MoveCompletion {
        self.slide = None;
        self.position = grid.mapper().grid_to_world(cell);

        if outcome == MoveOutcome::BlockedByBoundary {
            return MoveCompletion::HandedOff(self.leave_grid(cell));
        }

        self.head = cell;
        self.state = VehicleState::Idle;
        self.register_footprint(grid);

        MoveCompletion::Parked {
            head: cell,
            outcome,
        }
    }

    fn register_footprint(&self, grid: &mut OccupancyGrid) {
        if !grid.register_head(self.head, self.id) {
            warn!(
                "{:?} could not claim head cell {:?}; it is held by {:?}",
                self.id,
                self.head,
                grid.occupant_at(self.head).ok().flatten()
            );
        }
        let tail = tail_cells(grid.mapper(), self.head, self.orientation, self.sign, self.length);
        grid.register_tail(&tail, self.id);
    }

    fn vacate(&self, grid: &mut OccupancyGrid) {
        for cell in self.footprint(grid) {
            grid.unregister(cell, self.id);
        }
    }

    fn leave_grid(&mut self, cell: Cell) -> BoundaryExit {
        self.head = cell;
        self.state = VehicleState::OnTrack;
        info!("{:?} reached the track boundary at {:?}", self.id, cell);
        BoundaryExit {
            vehicle: self.id,
            cell,
            position: self.position,
        }
    }
}
