//! Movement resolution tests on a 6x8 lot

use parking_sim::simulation::{
    footprint_cells, tail_cells, visited_cells, Cell, DirectionSign, GridMapper, MoveOutcome,
    MoveQuery, MovementResolver, NoExits, OccupancyGrid, Orientation, SimId, VehicleId,
};

fn vehicle(n: usize) -> VehicleId {
    VehicleId(SimId(n))
}

fn grid_6x8() -> OccupancyGrid {
    OccupancyGrid::new(GridMapper::new(6, 8, 1.0).expect("valid grid"))
}

fn query(
    grid: &OccupancyGrid,
    id: VehicleId,
    head: Cell,
    orientation: Orientation,
    sign: DirectionSign,
) -> MoveQuery {
    MoveQuery {
        vehicle: id,
        position: grid.mapper().grid_to_world(head),
        orientation,
        sign,
        max_distance: grid.mapper().max_search_distance(),
    }
}

#[test]
fn test_visited_cells_walks_one_axis() {
    assert_eq!(
        visited_cells(Cell::new(1, 2), Cell::new(4, 2)),
        vec![Cell::new(2, 2), Cell::new(3, 2), Cell::new(4, 2)]
    );
    assert_eq!(
        visited_cells(Cell::new(3, 5), Cell::new(3, 3)),
        vec![Cell::new(3, 4), Cell::new(3, 3)]
    );
    assert!(visited_cells(Cell::new(3, 3), Cell::new(3, 3)).is_empty());
}

#[test]
fn test_clear_path_reaches_grid_edge() {
    let mut grid = grid_6x8();
    let a = vehicle(1);
    grid.register_head(Cell::new(0, 0), a);

    let q = query(&grid, a, Cell::new(0, 0), Orientation::Horizontal, DirectionSign::Positive);
    let resolution = MovementResolver::new(&grid).resolve(&q, &NoExits);

    assert_eq!(resolution.cell, Cell::new(5, 0));
    assert_eq!(resolution.position, grid.mapper().grid_to_world(Cell::new(5, 0)));
    assert_eq!(resolution.outcome, MoveOutcome::ClearPath);
    assert_eq!(resolution.blocker, None);
    assert!(resolution.moves());
}

#[test]
fn test_stops_one_cell_before_another_vehicle() {
    let mut grid = grid_6x8();
    let (a, b) = (vehicle(1), vehicle(2));
    grid.register_head(Cell::new(0, 0), a);
    grid.register_head(Cell::new(3, 0), b);

    let q = query(&grid, a, Cell::new(0, 0), Orientation::Horizontal, DirectionSign::Positive);
    let resolution = MovementResolver::new(&grid).resolve(&q, &NoExits);

    assert_eq!(resolution.cell, Cell::new(2, 0));
    assert_eq!(resolution.outcome, MoveOutcome::BlockedByVehicle);
    assert_eq!(resolution.blocker, Some(b));
}

#[test]
fn test_adjacent_vehicle_means_no_movement() {
    let mut grid = grid_6x8();
    let (a, b) = (vehicle(1), vehicle(2));
    grid.register_head(Cell::new(2, 0), a);
    grid.register_tail(&[Cell::new(1, 0)], a);
    grid.register_head(Cell::new(3, 0), b);

    let q = query(&grid, a, Cell::new(2, 0), Orientation::Horizontal, DirectionSign::Positive);
    let resolution = MovementResolver::new(&grid).resolve(&q, &NoExits);

    assert_eq!(resolution.cell, Cell::new(2, 0));
    assert_eq!(resolution.outcome, MoveOutcome::BlockedByVehicle);
    assert!(!resolution.moves());
}

#[test]
fn test_vertical_negative_direction() {
    let mut grid = grid_6x8();
    let (a, b) = (vehicle(1), vehicle(2));
    grid.register_head(Cell::new(4, 6), a);
    grid.register_head(Cell::new(4, 1), b);

    let q = query(&grid, a, Cell::new(4, 6), Orientation::Vertical, DirectionSign::Negative);
    let resolution = MovementResolver::new(&grid).resolve(&q, &NoExits);

    assert_eq!(resolution.cell, Cell::new(4, 2));
    assert_eq!(resolution.path.first(), Some(&Cell::new(4, 5)));
    assert_eq!(resolution.outcome, MoveOutcome::BlockedByVehicle);
}

#[test]
fn test_own_cells_do_not_block() {
    let mut grid = grid_6x8();
    let a = vehicle(1);
    // A stale claim ahead of the head still belongs to the mover
    grid.register_head(Cell::new(1, 0), a);
    grid.register_head(Cell::new(3, 0), a);

    let q = query(&grid, a, Cell::new(1, 0), Orientation::Horizontal, DirectionSign::Positive);
    let resolution = MovementResolver::new(&grid).resolve(&q, &NoExits);

    assert_eq!(resolution.cell, Cell::new(5, 0));
    assert_eq!(resolution.outcome, MoveOutcome::ClearPath);
}

#[test]
fn test_exit_rule_marks_boundary() {
    let mut grid = grid_6x8();
    let a = vehicle(1);
    grid.register_head(Cell::new(0, 4), a);

    let right_edge = |cell: Cell| cell.column == 5;
    let q = query(&grid, a, Cell::new(0, 4), Orientation::Horizontal, DirectionSign::Positive);
    let resolution = MovementResolver::new(&grid).resolve(&q, &right_edge);
    assert_eq!(resolution.outcome, MoveOutcome::BlockedByBoundary);
    assert_eq!(resolution.cell, Cell::new(5, 4));

    // Blocked moves never count as boundary exits
    let b = vehicle(2);
    grid.register_head(Cell::new(5, 4), b);
    let resolution = MovementResolver::new(&grid).resolve(&q, &right_edge);
    assert_eq!(resolution.outcome, MoveOutcome::BlockedByVehicle);
    assert_eq!(resolution.cell, Cell::new(4, 4));
}

#[test]
fn test_off_centre_position_snaps_before_scanning() {
    let mut grid = grid_6x8();
    let a = vehicle(1);
    grid.register_head(Cell::new(1, 2), a);

    let mut q = query(&grid, a, Cell::new(1, 2), Orientation::Vertical, DirectionSign::Positive);
    q.position.x += 0.3;
    q.position.z -= 0.2;
    let resolution = MovementResolver::new(&grid).resolve(&q, &NoExits);

    assert_eq!(resolution.start, Cell::new(1, 2));
    assert_eq!(resolution.cell, Cell::new(1, 7));
}

#[test]
fn test_resolution_is_deterministic() {
    let mut grid = grid_6x8();
    let (a, b) = (vehicle(1), vehicle(2));
    grid.register_head(Cell::new(2, 7), a);
    grid.register_head(Cell::new(2, 3), b);

    let q = query(&grid, a, Cell::new(2, 7), Orientation::Vertical, DirectionSign::Negative);
    let resolver = MovementResolver::new(&grid);
    let first = resolver.resolve(&q, &NoExits);
    for _ in 0..10 {
        assert_eq!(resolver.resolve(&q, &NoExits), first);
    }
}

#[test]
fn test_tail_extends_behind_head_and_clips_at_edge() {
    let mapper = GridMapper::new(6, 8, 1.0).unwrap();

    assert_eq!(
        tail_cells(&mapper, Cell::new(4, 0), Orientation::Horizontal, DirectionSign::Positive, 3),
        vec![Cell::new(3, 0), Cell::new(2, 0)]
    );
    assert_eq!(
        tail_cells(&mapper, Cell::new(2, 2), Orientation::Vertical, DirectionSign::Negative, 2),
        vec![Cell::new(2, 3)]
    );
    assert_eq!(
        tail_cells(&mapper, Cell::new(1, 0), Orientation::Horizontal, DirectionSign::Positive, 4),
        vec![Cell::new(0, 0)]
    );
    assert!(
        tail_cells(&mapper, Cell::new(1, 1), Orientation::Vertical, DirectionSign::Positive, 1)
            .is_empty()
    );
    assert_eq!(
        footprint_cells(
            &mapper,
            Cell::new(5, 7),
            Orientation::Vertical,
            DirectionSign::Positive,
            2
        ),
        vec![Cell::new(5, 7), Cell::new(5, 6)]
    );
}

#[test]
fn test_huge_length_tail_is_clipped_to_grid() {
    use DirectionSign::{Negative, Positive};
    use Orientation::{Horizontal, Vertical};

    let mapper = GridMapper::new(6, 8, 1.0).unwrap();
    for length in [i32::MAX as u32, u32::MAX] {
        assert_eq!(
            tail_cells(&mapper, Cell::new(3, 0), Horizontal, Negative, length),
            vec![Cell::new(4, 0), Cell::new(5, 0)]
        );
    }
    assert_eq!(
        tail_cells(&mapper, Cell::new(3, 6), Vertical, Positive, u32::MAX),
        (0..6).rev().map(|row| Cell::new(3, row)).collect::<Vec<_>>()
    );
}

#[test]
fn test_step_saturates_instead_of_overflowing() {
    use DirectionSign::{Negative, Positive};
    use Orientation::{Horizontal, Vertical};

    let far = Cell::new(i32::MAX - 1, 0).step(Horizontal, Positive, 10);
    assert_eq!(far, Cell::new(i32::MAX, 0));
    let low = Cell::new(0, i32::MIN + 1).step(Vertical, Negative, i32::MAX);
    assert_eq!(low, Cell::new(0, i32::MIN));
}
