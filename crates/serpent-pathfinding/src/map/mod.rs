//! Grid-related functionality for pathfinding.
//!
//! This module provides the cell grid, the nodes it is made of, and the
//! occupant types that decide which cells can be entered.

pub mod grid;
pub mod node;
pub mod occupant;
pub mod point_types;

pub use grid::Grid;
pub use node::Node;
pub use occupant::{Occupant, OccupantRef, Tile, TileType};
pub use point_types::{GridPoint, WorldPoint};
