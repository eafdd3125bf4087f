//! Standalone parking grid simulation module
//!
//! This module contains the grid occupancy and movement-resolution logic
//! that can run independently of any game engine. It can be tested via
//! console without needing to boot up rendering or input handling.

mod animator;
mod error;
mod mapper;
mod occupancy;
mod resolver;
mod scenario;
mod track;
mod types;
mod vehicle;
mod world;

// Re-export public types for external use
pub use animator::{FinishedSlide, SlideAnimator};
pub use error::{GridError, GridResult};
pub use mapper::GridMapper;
pub use occupancy::{OccupancyGrid, Placement};
pub use resolver::{
    footprint_cells, tail_cells, target_cell, visited_cells, ExitRule, MoveQuery,
    MovementResolver, NoExits, Resolution,
};
pub use scenario::{ExitConfig, GridConfig, ScenarioConfig, SlideConfig, VehicleConfig};
pub use track::{BoundaryExit, Edge, PathSystem, TrackExits, TrackPoint, TrackRegistry};
pub use types::{
    Cell, DirectionSign, MoveOutcome, Orientation, Position, SimId, VehicleId, VehicleState,
    DEFAULT_CELL_SIZE, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DEFAULT_SLIDE_DURATION,
    DEFAULT_SLIDE_TIMEOUT,
};
pub use vehicle::{MoveCompletion, MoveResponse, SimVehicle, SlideTicket};
pub use world::{MoveReport, SimEvent, SimWorld};
