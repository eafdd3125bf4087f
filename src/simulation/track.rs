//! Hand-off from grid locomotion to the track
//!
//! The grid only knows which edge cells lead onto the track. Following the
//! curve itself belongs to an external path system; this module defines what
//! the grid hands over and keeps the order in which vehicles joined.

use log::debug;
use ordered_float::OrderedFloat;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;

use super::mapper::GridMapper;
use super::resolver::ExitRule;
use super::types::{Cell, Position, VehicleId};

/// A side of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    /// Column 0
    Left,
    /// Last column
    Right,
    /// Row 0
    Bottom,
    /// Last row
    Top,
}

/// Edge cells that lead onto the track
#[derive(Debug, Clone, Default)]
pub struct TrackExits {
    width: i32,
    height: i32,
    edges: HashSet<Edge>,
    cells: HashSet<Cell>,
}

impl TrackExits {
    pub fn new(mapper: &GridMapper) -> Self {
        Self {
            width: mapper.width() as i32,
            height: mapper.height() as i32,
            edges: HashSet::new(),
            cells: HashSet::new(),
        }
    }

    /// Every cell along `edge` becomes an exit
    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.insert(edge);
        self
    }

    pub fn with_cell(mut self, cell: Cell) -> Self {
        self.cells.insert(cell);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.cells.is_empty()
    }

    fn on_edge(&self, edge: Edge, cell: Cell) -> bool {
        match edge {
            Edge::Left => cell.column == 0,
            Edge::Right => cell.column == self.width - 1,
            Edge::Bottom => cell.row == 0,
            Edge::Top => cell.row == self.height - 1,
        }
    }
}

impl ExitRule for TrackExits {
    fn is_exit(&self, cell: Cell) -> bool {
        self.cells.contains(&cell) || self.edges.iter().any(|edge| self.on_edge(*edge, cell))
    }
}

/// Raised once when a vehicle leaves the grid for the track
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryExit {
    pub vehicle: VehicleId,
    /// Exit cell the vehicle stopped on
    pub cell: Cell,
    /// World position of the vehicle's head at hand-off
    pub position: Position,
}

/// Nearest point on the track to a query position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub position: Position,
    /// Normalised curve parameter in `[0, 1]`
    pub t: f32,
}

/// External curve-following collaborator
pub trait PathSystem {
    fn nearest_point(&self, position: Position) -> TrackPoint;
}

/// Vehicles on the track ordered by curve parameter
#[derive(Debug, Clone, Default)]
pub struct TrackRegistry {
    vehicles: BTreeMap<OrderedFloat<f32>, VehicleId>,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the vehicle from `exit` on the track at its nearest point
    ///
    /// Returns `None` if another vehicle already sits at that parameter.
    pub fn admit(&mut self, exit: &BoundaryExit, path: &dyn PathSystem) -> Option<TrackPoint> {
        let point = path.nearest_point(exit.position);
        let key = OrderedFloat(point.t.clamp(0.0, 1.0));
        if self.vehicles.contains_key(&key) {
            debug!("{:?} cannot join the track at t={}: taken", exit.vehicle, key);
            return None;
        }
        self.release(exit.vehicle);
        self.vehicles.insert(key, exit.vehicle);
        debug!("{:?} joined the track at t={}", exit.vehicle, key);
        Some(TrackPoint {
            position: point.position,
            t: key.into_inner(),
        })
    }

    /// Move a vehicle already on the track to parameter `t`
    pub fn update(&mut self, vehicle: VehicleId, t: f32) -> bool {
        let key = OrderedFloat(t.clamp(0.0, 1.0));
        match self.vehicles.get(&key) {
            Some(other) if *other != vehicle => false,
            _ => {
                self.release(vehicle);
                self.vehicles.insert(key, vehicle);
                true
            }
        }
    }

    pub fn release(&mut self, vehicle: VehicleId) {
        self.vehicles.retain(|_, id| *id != vehicle);
    }

    /// True if no vehicle sits within `spacing` of `t`
    pub fn is_free(&self, t: f32, spacing: f32) -> bool {
        let low = OrderedFloat(t - spacing);
        let high = OrderedFloat(t + spacing);
        self.vehicles
            .range((Bound::Included(low), Bound::Included(high)))
            .next()
            .is_none()
    }

    /// The vehicle directly ahead of parameter `t`
    pub fn vehicle_ahead(&self, t: f32) -> Option<(f32, VehicleId)> {
        self.vehicles
            .range((Bound::Excluded(OrderedFloat(t)), Bound::Unbounded))
            .next()
            .map(|(t, vehicle)| (t.into_inner(), *vehicle))
    }

    pub fn position_of(&self, vehicle: VehicleId) -> Option<f32> {
        self.vehicles
            .iter()
            .find(|(_, id)| **id == vehicle)
            .map(|(t, _)| t.into_inner())
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}
