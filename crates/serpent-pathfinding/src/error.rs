//! This module defines the error types used by the `serpent-pathfinding` crate.

#![warn(missing_docs)]

/// Error type for grid and path request operations.
///
/// Search failures are not errors: an unreachable target is reported through
/// the normal result channel with `success == false`.
#[derive(Debug, Clone, PartialEq)]
pub enum PathfindingError {
    /// Error for invalid grid dimensions.
    /// This variant is returned when the grid width or height is not positive.
    InvalidDimensions(&'static str),
    /// Error for an invalid tile size.
    /// This variant is returned when the world size of a tile is not positive.
    InvalidTileSize(&'static str),
    /// Error for out-of-bounds access.
    /// Carries the offending coordinate so the caller can report it.
    OutOfBounds {
        /// The x-coordinate that was requested.
        x: i32,
        /// The y-coordinate that was requested.
        y: i32,
    },
    /// No walkable cell was left to pick from.
    NoWalkableCell,
    /// Error for unusable path service settings.
    /// This variant is returned for a zero tick or a zero channel capacity.
    InvalidServiceConfig(&'static str),
    /// The background path service is no longer running.
    ServiceStopped,
}

impl core::fmt::Display for PathfindingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PathfindingError::InvalidDimensions(msg) => write!(f, "Invalid grid dimensions: {}", msg),
            PathfindingError::InvalidTileSize(msg) => write!(f, "Invalid tile size: {}", msg),
            PathfindingError::OutOfBounds { x, y } => {
                write!(f, "Grid access out of bounds: ({}, {})", x, y)
            }
            PathfindingError::NoWalkableCell => write!(f, "No walkable cell available"),
            PathfindingError::InvalidServiceConfig(msg) => write!(f, "Invalid path service config: {}", msg),
            PathfindingError::ServiceStopped => write!(f, "Path service has stopped"),
        }
    }
}

impl core::error::Error for PathfindingError {}
