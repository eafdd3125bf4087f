//! Track hand-off and registry tests

use parking_sim::simulation::{
    BoundaryExit, Cell, DirectionSign, Edge, ExitRule, GridMapper, Orientation, PathSystem,
    Position, SimEvent, SimId, SimWorld, TrackExits, TrackPoint, TrackRegistry, VehicleId,
};

/// A straight track running along world Z from 0 to 10
struct StraightTrack;

impl PathSystem for StraightTrack {
    fn nearest_point(&self, position: Position) -> TrackPoint {
        let z = position.z.clamp(0.0, 10.0);
        TrackPoint {
            position: Position::new(8.0, 0.0, z),
            t: z / 10.0,
        }
    }
}

fn exit_at(id: usize, z: f32) -> BoundaryExit {
    BoundaryExit {
        vehicle: VehicleId(SimId(id)),
        cell: Cell::new(5, z as i32),
        position: Position::new(5.0, 0.0, z),
    }
}

#[test]
fn test_track_exits_cover_edges_and_cells() {
    let mapper = GridMapper::new(6, 8, 1.0).unwrap();
    let exits = TrackExits::new(&mapper)
        .with_edge(Edge::Right)
        .with_edge(Edge::Bottom)
        .with_cell(Cell::new(2, 7));

    assert!(exits.is_exit(Cell::new(5, 3)));
    assert!(exits.is_exit(Cell::new(0, 0)));
    assert!(exits.is_exit(Cell::new(2, 7)));
    assert!(!exits.is_exit(Cell::new(0, 7)));
    assert!(!exits.is_exit(Cell::new(3, 3)));
    assert!(TrackExits::new(&mapper).is_empty());
}

#[test]
fn test_registry_orders_vehicles_by_parameter() {
    let mut registry = TrackRegistry::new();
    let first = registry.admit(&exit_at(1, 2.0), &StraightTrack).unwrap();
    let second = registry.admit(&exit_at(2, 6.0), &StraightTrack).unwrap();

    assert!((first.t - 0.2).abs() < 1e-6);
    assert!((second.t - 0.6).abs() < 1e-6);
    assert_eq!(registry.len(), 2);

    let (t, ahead) = registry.vehicle_ahead(first.t).unwrap();
    assert_eq!(ahead, VehicleId(SimId(2)));
    assert!((t - 0.6).abs() < 1e-6);
    assert!(registry.vehicle_ahead(second.t).is_none());
}

#[test]
fn test_registry_refuses_taken_parameter() {
    let mut registry = TrackRegistry::new();
    assert!(registry.admit(&exit_at(1, 4.0), &StraightTrack).is_some());
    assert!(registry.admit(&exit_at(2, 4.0), &StraightTrack).is_none());
    assert_eq!(registry.position_of(VehicleId(SimId(2))), None);
}

#[test]
fn test_registry_spacing_and_updates() {
    let mut registry = TrackRegistry::new();
    let id = VehicleId(SimId(1));
    registry.admit(&exit_at(1, 5.0), &StraightTrack).unwrap();

    assert!(!registry.is_free(0.52, 0.05));
    assert!(registry.is_free(0.7, 0.05));

    assert!(registry.update(id, 0.9));
    assert_eq!(registry.len(), 1);
    assert!(registry.is_free(0.5, 0.05));
    assert_eq!(registry.position_of(id), Some(0.9));

    registry.release(id);
    assert!(registry.is_empty());
}

#[test]
fn test_world_hands_exit_to_path_system() {
    let mut world = SimWorld::new(6, 8, 1.0).unwrap();
    let exits = TrackExits::new(world.mapper()).with_edge(Edge::Right);
    world = world.with_exits(exits);
    let a = world
        .add_vehicle_at(Cell::new(0, 3), Orientation::Horizontal, 2, DirectionSign::Positive)
        .unwrap();

    world.click(a).unwrap();
    assert!(world.run_until_settled(0.05, 100));

    let exit = world
        .drain_events()
        .into_iter()
        .find_map(|event| match event {
            SimEvent::BoundaryReached(exit) => Some(exit),
            _ => None,
        })
        .expect("vehicle reached the right edge");
    assert_eq!(exit.position, Position::new(5.0, 0.0, 3.0));

    let point = world.admit_to_track(&exit, &StraightTrack).unwrap();
    assert!((point.t - 0.3).abs() < 1e-6);
    assert_eq!(world.track().position_of(a), Some(point.t));

    assert!(world.remove_vehicle(a).is_some());
    assert!(world.track().is_empty());
}
