//! Grid A* pathfinding for tile-based games.
//!
//! The crate is built from four pieces, leaves first:
//!
//! - [`map::Grid`]: a fixed arena of [`map::Node`]s holding weak references to
//!   whatever occupies each cell.
//! - [`heap::PriorityQueue`]: an intrusive binary min-heap over arena indices.
//! - [`astar`]: the search itself, plus retracing and waypoint simplification.
//! - [`request::RequestQueue`]: runs one search at a time and delivers results
//!   in submission order.
//!
//! [`service`] wraps the queue in a tokio task for async callers.

pub mod astar;
pub mod error;
pub mod heap;
pub mod map;
pub mod request;
pub mod service;

pub use astar::{PathResult, Pathfinder, SearchTask, SharedGrid};
pub use error::PathfindingError;
pub use map::{Grid, GridPoint, Node, Occupant, Tile, TileType, WorldPoint};
pub use request::{PathCallback, RequestQueue};
pub use service::{PathOutcome, PathServiceHandle, ServiceConfig, spawn_path_service};
