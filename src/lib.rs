//! Parking Grid Simulation Library
//!
//! The grid occupancy and movement-resolution engine of a vehicle-shuffling
//! puzzle, runnable headless from the command line or embedded in a game.

pub mod simulation;
