/// Represents a cell in grid coordinates.
///
/// Components are signed so that direction deltas and rounded world
/// positions can be expressed without casts at every call site.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPoint {
    /// The x-coordinate (column index) in the grid.
    pub x: i32,
    /// The y-coordinate (row index) in the grid.
    pub y: i32,
}

impl GridPoint {
    /// Unit step towards negative x.
    pub const LEFT: GridPoint = GridPoint::new(-1, 0);
    /// Unit step towards positive x.
    pub const RIGHT: GridPoint = GridPoint::new(1, 0);
    /// Unit step towards positive y.
    pub const UP: GridPoint = GridPoint::new(0, 1);
    /// Unit step towards negative y.
    pub const DOWN: GridPoint = GridPoint::new(0, -1);

    /// Creates a new `GridPoint`.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub const fn delta(self, other: GridPoint) -> GridPoint {
        GridPoint::new(self.x - other.x, self.y - other.y)
    }

    /// Component-wise sum `self + step`.
    #[must_use]
    pub const fn offset(self, step: GridPoint) -> GridPoint {
        GridPoint::new(self.x + step.x, self.y + step.y)
    }
}

impl From<(i32, i32)> for GridPoint {
    fn from((x, y): (i32, i32)) -> Self {
        GridPoint::new(x, y)
    }
}

impl std::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Represents a point in world coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPoint {
    /// The x-coordinate in world units.
    pub x: f32,
    /// The y-coordinate in world units.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new `WorldPoint`.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}
