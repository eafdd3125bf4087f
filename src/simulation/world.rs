//! Main simulation world that ties everything together
//!
//! This is the entry point for running the parking simulation without any
//! engine. The world owns the occupancy grid and passes it explicitly to
//! every vehicle operation; nothing looks the grid up through global state.

use anyhow::{Context, Result};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

use super::animator::SlideAnimator;
use super::error::{GridError, GridResult};
use super::mapper::GridMapper;
use super::occupancy::{OccupancyGrid, Placement};
use super::scenario::{ScenarioConfig, VehicleConfig};
use super::track::{BoundaryExit, PathSystem, TrackExits, TrackPoint, TrackRegistry};
use super::types::{
    Cell, DirectionSign, MoveOutcome, Orientation, Position, SimId, VehicleId, VehicleState,
    DEFAULT_SLIDE_DURATION, DEFAULT_SLIDE_TIMEOUT,
};
use super::vehicle::{MoveCompletion, MoveResponse, SimVehicle};

/// Notifications raised by the world, drained by the caller once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// A move request ran into another vehicle
    Bumped {
        vehicle: VehicleId,
        blocker: Option<VehicleId>,
    },
    /// A slide finished and the footprint was registered at `head`
    Arrived {
        vehicle: VehicleId,
        head: Cell,
        outcome: MoveOutcome,
    },
    /// A vehicle left the grid for the track
    BoundaryReached(BoundaryExit),
    /// A slide ran past the timeout and was snapped to its target
    SlideTimedOut { vehicle: VehicleId },
    /// A slide was cancelled and the vehicle parked at `head`
    SlideCancelled { vehicle: VehicleId, head: Cell },
}

/// What a click did, as seen from outside the world
#[derive(Debug, Clone, PartialEq)]
pub struct MoveReport {
    pub outcome: MoveOutcome,
    pub blocker: Option<VehicleId>,
    /// World position of the furthest legal cell
    pub target: Position,
    pub started_sliding: bool,
}

impl From<&MoveResponse> for MoveReport {
    fn from(response: &MoveResponse) -> Self {
        Self {
            outcome: response.outcome,
            blocker: response.blocker,
            target: response.target,
            started_sliding: response.started_sliding(),
        }
    }
}

/// The main simulation world
pub struct SimWorld {
    grid: OccupancyGrid,

    exits: TrackExits,

    /// All vehicles, including those handed off to the track
    pub vehicles: BTreeMap<VehicleId, SimVehicle>,

    animator: SlideAnimator,

    /// Seconds after which an unfinished slide is force-completed
    slide_timeout: f32,

    track: TrackRegistry,

    events: Vec<SimEvent>,

    /// Next ID to assign
    next_id: usize,

    /// Simulation time
    pub time: f32,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,
}

impl SimWorld {
    fn new_internal(mapper: GridMapper, rng: Option<StdRng>) -> Self {
        Self {
            grid: OccupancyGrid::new(mapper),
            exits: TrackExits::new(&mapper),
            vehicles: BTreeMap::new(),
            animator: SlideAnimator::new(DEFAULT_SLIDE_DURATION),
            slide_timeout: DEFAULT_SLIDE_TIMEOUT,
            track: TrackRegistry::new(),
            events: Vec::new(),
            next_id: 0,
            time: 0.0,
            rng,
        }
    }

    /// Create an empty world, failing fast on invalid grid settings
    pub fn new(width: u32, height: u32, cell_size: f32) -> GridResult<Self> {
        Ok(Self::new_internal(GridMapper::new(width, height, cell_size)?, None))
    }

    /// Create an empty world with a seeded RNG for reproducible simulations
    pub fn new_with_seed(width: u32, height: u32, cell_size: f32, seed: u64) -> GridResult<Self> {
        Ok(Self::new_internal(
            GridMapper::new(width, height, cell_size)?,
            Some(StdRng::seed_from_u64(seed)),
        ))
    }

    pub fn with_exits(mut self, exits: TrackExits) -> Self {
        self.exits = exits;
        self
    }

    /// Set how long a slide animates and when it is force-completed
    pub fn with_slide_timing(mut self, duration: f32, timeout: f32) -> GridResult<Self> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(GridError::InvalidSlideDuration(duration));
        }
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(GridError::InvalidSlideTimeout(timeout));
        }
        self.animator = SlideAnimator::new(duration);
        self.slide_timeout = timeout;
        Ok(self)
    }

    /// Build a world from a scenario, registering every vehicle
    pub fn from_scenario(config: &ScenarioConfig, seed: Option<u64>) -> Result<Self> {
        let grid = &config.grid;
        let mapper = GridMapper::new(grid.width, grid.height, grid.cell_size)
            .context("Invalid grid configuration")?;
        let rng = seed.map(StdRng::seed_from_u64);

        let mut exits = TrackExits::new(&mapper);
        for edge in &config.exits.edges {
            exits = exits.with_edge(*edge);
        }
        for [column, row] in &config.exits.cells {
            exits = exits.with_cell(Cell::new(*column, *row));
        }

        let mut world = Self::new_internal(mapper, rng)
            .with_exits(exits)
            .with_slide_timing(config.slide.duration, config.slide.timeout)
            .context("Invalid slide configuration")?;

        for (index, vehicle) in config.vehicles.iter().enumerate() {
            world
                .add_vehicle_from_config(vehicle)
                .with_context(|| format!("Invalid vehicle #{} in scenario", index))?;
        }

        Ok(world)
    }

    /// Create the built-in demo lot
    pub fn create_test_world() -> Result<Self> {
        Self::from_scenario(&ScenarioConfig::default(), None)
    }

    /// Create the built-in demo lot with a seeded RNG
    pub fn create_test_world_with_seed(seed: u64) -> Result<Self> {
        Self::from_scenario(&ScenarioConfig::default(), Some(seed))
    }

    fn next_sim_id(&mut self) -> SimId {
        let id = SimId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn mapper(&self) -> &GridMapper {
        self.grid.mapper()
    }

    pub fn exits(&self) -> &TrackExits {
        &self.exits
    }

    pub fn track(&self) -> &TrackRegistry {
        &self.track
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&SimVehicle> {
        self.vehicles.get(&id)
    }

    pub fn occupant_at(&self, cell: Cell) -> GridResult<Option<VehicleId>> {
        self.grid.occupant_at(cell)
    }

    /// Add a vehicle whose head starts nearest `position`
    pub fn add_vehicle(
        &mut self,
        position: Position,
        orientation: Orientation,
        length: u32,
        sign: DirectionSign,
    ) -> GridResult<VehicleId> {
        let id = VehicleId(self.next_sim_id());
        let vehicle = SimVehicle::new(id, orientation, length, sign)?;
        Ok(self.insert_vehicle(vehicle, position))
    }

    /// Add a vehicle with its head at `cell`
    pub fn add_vehicle_at(
        &mut self,
        cell: Cell,
        orientation: Orientation,
        length: u32,
        sign: DirectionSign,
    ) -> GridResult<VehicleId> {
        let position = self.mapper().grid_to_world(cell);
        self.add_vehicle(position, orientation, length, sign)
    }

    pub fn add_vehicle_from_config(&mut self, config: &VehicleConfig) -> GridResult<VehicleId> {
        let id = VehicleId(self.next_sim_id());
        let mut vehicle = SimVehicle::new(id, config.orientation, config.length, config.sign)?;
        if let Some(name) = &config.name {
            vehicle = vehicle.with_name(name.clone());
        }
        let position = self
            .mapper()
            .grid_to_world(Cell::new(config.column, config.row));
        Ok(self.insert_vehicle(vehicle, position))
    }

    fn insert_vehicle(&mut self, mut vehicle: SimVehicle, position: Position) -> VehicleId {
        let id = vehicle.id;
        match vehicle.place(&mut self.grid, position) {
            Placement::Free => {}
            Placement::OutOfBounds(cell) => warn!(
                "{} footprint is clipped at {:?}; the cell lies outside the grid",
                display_name(&vehicle),
                cell
            ),
            Placement::Occupied(cell, owner) => warn!(
                "{} overlaps {:?} at {:?}; the cell was left to its owner",
                display_name(&vehicle),
                owner,
                cell
            ),
        }
        self.vehicles.insert(id, vehicle);
        id
    }

    /// Remove a vehicle and every cell it holds
    pub fn remove_vehicle(&mut self, id: VehicleId) -> Option<SimVehicle> {
        let vehicle = self.vehicles.remove(&id)?;
        self.animator.cancel(id);
        self.grid.unregister_vehicle(id);
        self.track.release(id);
        Some(vehicle)
    }

    /// Ask a vehicle to slide forward
    ///
    /// Returns `Ok(None)` when the request is ignored because the vehicle is
    /// already sliding or has left the grid.
    pub fn click(&mut self, id: VehicleId) -> GridResult<Option<MoveReport>> {
        let vehicle = self
            .vehicles
            .get_mut(&id)
            .ok_or(GridError::UnknownVehicle(id))?;

        let Some(response) = vehicle.request_move(&mut self.grid, &self.exits, self.time) else {
            return Ok(None);
        };
        let report = MoveReport::from(&response);

        if response.bumped() {
            info!("{} bumped into {:?}", display_name(vehicle), response.blocker);
            self.events.push(SimEvent::Bumped {
                vehicle: id,
                blocker: response.blocker,
            });
        }

        if let Some(ticket) = response.ticket {
            self.animator.move_to(ticket, response.from, response.target);
        }

        Ok(Some(report))
    }

    /// Click a random idle vehicle, using the seeded RNG if available
    pub fn click_random_vehicle(&mut self) -> Option<(VehicleId, Option<MoveReport>)> {
        let idle: Vec<VehicleId> = self
            .vehicles
            .values()
            .filter(|v| v.state() == VehicleState::Idle)
            .map(|v| v.id)
            .collect();

        let chosen = match &mut self.rng {
            Some(rng) => idle.choose(rng).copied(),
            None => idle.choose(&mut rand::rng()).copied(),
        }?;

        let report = self.click(chosen).ok().flatten();
        Some((chosen, report))
    }

    /// Advance the simulation by one frame
    pub fn tick(&mut self, delta_secs: f32) {
        self.time += delta_secs;

        for finished in self.animator.advance(delta_secs) {
            let id = finished.ticket.vehicle();
            let Some(vehicle) = self.vehicles.get_mut(&id) else {
                continue;
            };
            vehicle.sync_position(finished.position);
            if let Some(completion) = vehicle.finish_move(finished.ticket, &mut self.grid) {
                self.record_completion(id, completion);
            }
        }

        for (id, position) in self.animator.positions() {
            if let Some(vehicle) = self.vehicles.get_mut(&id) {
                vehicle.sync_position(position);
            }
        }

        self.expire_slides();
    }

    /// Force-complete slides that have been in flight longer than the timeout
    fn expire_slides(&mut self) {
        let expired: Vec<VehicleId> = self
            .vehicles
            .values()
            .filter(|v| {
                v.slide_elapsed(self.time)
                    .is_some_and(|elapsed| elapsed > self.slide_timeout)
            })
            .map(|v| v.id)
            .collect();

        for id in expired {
            self.animator.cancel(id);
            let Some(vehicle) = self.vehicles.get_mut(&id) else {
                continue;
            };
            warn!("{} slide timed out", display_name(vehicle));
            if let Some(completion) = vehicle.force_complete(&mut self.grid) {
                self.events.push(SimEvent::SlideTimedOut { vehicle: id });
                self.record_completion(id, completion);
            }
        }
    }

    /// Stop a vehicle's slide and park it at the cell nearest its current position
    pub fn cancel_move(&mut self, id: VehicleId) -> GridResult<Option<MoveCompletion>> {
        let vehicle = self
            .vehicles
            .get_mut(&id)
            .ok_or(GridError::UnknownVehicle(id))?;
        if !vehicle.is_sliding() {
            return Ok(None);
        }

        let at = self.animator.cancel(id).unwrap_or_else(|| vehicle.position());
        let completion = vehicle.cancel_move(&mut self.grid, at);
        if let Some(MoveCompletion::Parked { head, .. }) = &completion {
            info!("{} slide cancelled at {:?}", display_name(vehicle), head);
            self.events.push(SimEvent::SlideCancelled {
                vehicle: id,
                head: *head,
            });
        }
        Ok(completion)
    }

    fn record_completion(&mut self, id: VehicleId, completion: MoveCompletion) {
        match completion {
            MoveCompletion::Parked { head, outcome } => {
                self.events.push(SimEvent::Arrived {
                    vehicle: id,
                    head,
                    outcome,
                });
            }
            MoveCompletion::HandedOff(exit) => {
                self.events.push(SimEvent::BoundaryReached(exit));
            }
        }
    }

    /// Tick until no vehicle is sliding or `max_ticks` have run
    ///
    /// Returns true if everything settled.
    pub fn run_until_settled(&mut self, delta_secs: f32, max_ticks: u32) -> bool {
        for _ in 0..max_ticks {
            if self.sliding_count() == 0 {
                return true;
            }
            self.tick(delta_secs);
        }
        self.sliding_count() == 0
    }

    /// Take every event raised since the last call
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Place a handed-off vehicle on the track at its nearest point
    pub fn admit_to_track(
        &mut self,
        exit: &BoundaryExit,
        path: &dyn PathSystem,
    ) -> Option<TrackPoint> {
        let point = self.track.admit(exit, path)?;
        info!("{:?} joined the track at t={:.3}", exit.vehicle, point.t);
        Some(point)
    }

    pub fn sliding_count(&self) -> usize {
        self.vehicles.values().filter(|v| v.is_sliding()).count()
    }

    pub fn on_track_count(&self) -> usize {
        self.vehicles
            .values()
            .filter(|v| v.state() == VehicleState::OnTrack)
            .count()
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        let mapper = self.mapper();
        println!("=== Parking Simulation Summary ===");
        println!("Time: {:.2}s", self.time);
        println!(
            "Grid: {}x{} (cell size {:.2}), occupied cells: {}",
            mapper.width(),
            mapper.height(),
            mapper.cell_size(),
            self.grid.occupied_count()
        );
        println!(
            "Vehicles: {} (sliding: {}, on track: {})",
            self.vehicles.len(),
            self.sliding_count(),
            self.on_track_count()
        );

        if !self.vehicles.is_empty() {
            println!("--- Vehicles ---");
            for vehicle in self.vehicles.values() {
                let heading = match vehicle.slide_target() {
                    Some(target) => format!(" -> ({}, {})", target.column, target.row),
                    None => String::new(),
                };
                println!(
                    "  {}: {:?} len={} sign={:+} head=({}, {}){} state={:?}",
                    display_name(vehicle),
                    vehicle.orientation(),
                    vehicle.length(),
                    vehicle.sign().value(),
                    vehicle.head().column,
                    vehicle.head().row,
                    heading,
                    vehicle.state()
                );
            }
        }
    }

    /// Draw the occupancy grid in the terminal, top row first
    pub fn draw_map(&self) {
        let mapper = self.mapper();
        let width = mapper.width() as usize;
        let height = mapper.height() as usize;
        let mut rows = vec![vec!['.'; width]; height];

        for (cell, occupant) in self.grid.iter() {
            if let Some(id) = occupant {
                let symbol = self
                    .vehicles
                    .get(&id)
                    .map(map_symbol)
                    .unwrap_or('?');
                rows[cell.row as usize][cell.column as usize] = symbol;
            }
        }

        println!("\n=== Parking Grid ===");
        println!("Legend: .=Empty, letter=Vehicle footprint");
        println!();
        for row in rows.iter().rev() {
            let line: String = row.iter().collect();
            println!("{}", line);
        }
        println!();
    }
}

fn display_name(vehicle: &SimVehicle) -> String {
    match &vehicle.name {
        Some(name) => name.clone(),
        None => format!("Vehicle {}", vehicle.id.0 .0),
    }
}

fn map_symbol(vehicle: &SimVehicle) -> char {
    vehicle
        .name
        .as_ref()
        .and_then(|name| name.chars().next())
        .unwrap_or_else(|| char::from(b'a' + (vehicle.id.0 .0 % 26) as u8))
}
