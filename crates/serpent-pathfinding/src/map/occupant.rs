use std::sync::{Arc, Weak};

/// Classification of an object that occupies a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileType {
    /// Blocks movement. The only classification that makes a cell unwalkable.
    Obstacle,
    /// Something to be collected.
    Food,
    /// A body segment or head of a snake.
    Snake,
}

impl TileType {
    /// Returns true if a cell holding this classification can be entered.
    pub fn is_walkable(self) -> bool {
        !matches!(self, TileType::Obstacle)
    }
}

impl std::fmt::Display for TileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TileType::Obstacle => write!(f, "Obstacle"),
            TileType::Food => write!(f, "Food"),
            TileType::Snake => write!(f, "Snake"),
        }
    }
}

/// An external object placed on the grid.
///
/// The grid never owns occupants; it keeps weak references and treats a
/// dropped occupant the same as an empty cell.
pub trait Occupant: Send + Sync {
    /// The classification that decides walkability.
    fn tile_type(&self) -> TileType;
}

/// A plain occupant that only carries its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile(pub TileType);

impl Occupant for Tile {
    fn tile_type(&self) -> TileType {
        self.0
    }
}

impl Tile {
    /// Allocates a shared obstacle tile.
    pub fn obstacle() -> Arc<dyn Occupant> {
        Arc::new(Tile(TileType::Obstacle))
    }

    /// Allocates a shared food tile.
    pub fn food() -> Arc<dyn Occupant> {
        Arc::new(Tile(TileType::Food))
    }

    /// Allocates a shared snake tile.
    pub fn snake() -> Arc<dyn Occupant> {
        Arc::new(Tile(TileType::Snake))
    }
}

/// Weak handle stored on a node.
pub type OccupantRef = Weak<dyn Occupant>;
