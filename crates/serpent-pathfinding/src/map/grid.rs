#![warn(missing_docs)]

use std::ops::Index;
use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, trace};

use super::node::Node;
use super::occupant::Occupant;
use super::{GridPoint, WorldPoint};
use crate::error::PathfindingError;

/// The four cardinal steps in the order neighbors are reported.
const CARDINAL_STEPS: [GridPoint; 4] = [GridPoint::LEFT, GridPoint::RIGHT, GridPoint::UP, GridPoint::DOWN];

/// A fixed-size 2D grid of [`Node`]s describing what occupies each cell.
///
/// The nodes live in a row-major arena so that the search and the heap can
/// refer to them by stable index. Replacing a node never moves it.
pub struct Grid {
    /// Width of the grid in cells
    size_x: usize,
    /// Height of the grid in cells
    size_y: usize,
    /// World units per cell
    tile_size: f32,
    nodes: Vec<Node>,
}

impl Grid {
    /// Creates a new grid, asking `obstacle_probe` once per cell for an initial occupant.
    ///
    /// # Arguments
    /// * `size_x` - Width of the grid in cells
    /// * `size_y` - Height of the grid in cells
    /// * `tile_size` - World units per cell
    /// * `obstacle_probe` - Returns the occupant found at a cell, if any
    ///
    /// # Returns
    /// * `Result<Self, PathfindingError>` - The created grid or an error if parameters are invalid
    pub fn new<F>(
        size_x: i32,
        size_y: i32,
        tile_size: f32,
        mut obstacle_probe: F,
    ) -> Result<Self, PathfindingError>
    where
        F: FnMut(GridPoint) -> Option<Arc<dyn Occupant>>,
    {
        if size_x <= 0 || size_y <= 0 {
            return Err(PathfindingError::InvalidDimensions("Width and height must be positive"));
        }
        if !(tile_size > 0.0) {
            return Err(PathfindingError::InvalidTileSize("Tile size must be positive"));
        }

        let (size_x, size_y) = (size_x as usize, size_y as usize);
        let cell_count = size_x
            .checked_mul(size_y)
            .ok_or(PathfindingError::InvalidDimensions("Grid dimensions too large, would cause overflow"))?;

        let mut nodes = Vec::with_capacity(cell_count);
        let mut occupied = 0usize;
        for y in 0..size_y {
            for x in 0..size_x {
                let position = GridPoint::new(x as i32, y as i32);
                let node = match obstacle_probe(position) {
                    Some(occupant) => {
                        occupied += 1;
                        Node::occupied(position, &occupant)
                    }
                    None => Node::empty(position),
                };
                nodes.push(node);
            }
        }

        debug!(size_x, size_y, tile_size, occupied, "Grid created");
        Ok(Grid {
            size_x,
            size_y,
            tile_size,
            nodes,
        })
    }

    /// Creates a grid with every cell empty.
    pub fn empty(size_x: i32, size_y: i32, tile_size: f32) -> Result<Self, PathfindingError> {
        Self::new(size_x, size_y, tile_size, |_| None)
    }

    /// Width of the grid in cells.
    pub fn size_x(&self) -> usize {
        self.size_x
    }

    /// Height of the grid in cells.
    pub fn size_y(&self) -> usize {
        self.size_y
    }

    /// World units per cell.
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Total number of cells, which bounds the size of any open set.
    pub fn max_size(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if `p` lies inside the grid.
    pub fn contains(&self, p: GridPoint) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.size_x && (p.y as usize) < self.size_y
    }

    /// Arena index of an in-bounds point.
    pub fn index_of(&self, p: GridPoint) -> Option<usize> {
        self.contains(p)
            .then(|| p.y as usize * self.size_x + p.x as usize)
    }

    /// Grid point of an arena index.
    pub fn point_of(&self, index: usize) -> GridPoint {
        GridPoint::new((index % self.size_x) as i32, (index / self.size_x) as i32)
    }

    fn checked_index(&self, p: GridPoint) -> Result<usize, PathfindingError> {
        self.index_of(p)
            .ok_or(PathfindingError::OutOfBounds { x: p.x, y: p.y })
    }

    pub(crate) fn expect_index(&self, p: GridPoint) -> usize {
        match self.index_of(p) {
            Some(index) => index,
            None => panic!(
                "grid point {} is outside the {}x{} grid",
                p, self.size_x, self.size_y
            ),
        }
    }

    /// Converts a world position to the nearest grid point.
    ///
    /// The result is not bounds checked.
    pub fn world_to_grid(&self, world_p: WorldPoint) -> GridPoint {
        GridPoint::new(
            (world_p.x / self.tile_size).round() as i32,
            (world_p.y / self.tile_size).round() as i32,
        )
    }

    /// Converts a grid point to its world position.
    pub fn grid_to_world(&self, grid_p: GridPoint) -> WorldPoint {
        WorldPoint::new(grid_p.x as f32 * self.tile_size, grid_p.y as f32 * self.tile_size)
    }

    /// Gets the node at a grid point.
    ///
    /// # Returns
    /// * `Result<&Node, PathfindingError>` - The node or an error if out of bounds
    pub fn get(&self, p: GridPoint) -> Result<&Node, PathfindingError> {
        let index = self.checked_index(p)?;
        Ok(&self.nodes[index])
    }

    /// Gets a mutable reference to the node at a grid point.
    pub fn get_mut(&mut self, p: GridPoint) -> Result<&mut Node, PathfindingError> {
        let index = self.checked_index(p)?;
        Ok(&mut self.nodes[index])
    }

    /// Gets the node at a grid point.
    ///
    /// # Panics
    /// Panics if `p` is outside the grid.
    pub fn node(&self, p: GridPoint) -> &Node {
        &self.nodes[self.expect_index(p)]
    }

    /// Gets a mutable reference to the node at a grid point.
    ///
    /// # Panics
    /// Panics if `p` is outside the grid.
    pub fn node_mut(&mut self, p: GridPoint) -> &mut Node {
        let index = self.expect_index(p);
        &mut self.nodes[index]
    }

    /// The node arena in row-major order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Returns true if the cell at `p` can be entered.
    ///
    /// # Panics
    /// Panics if `p` is outside the grid.
    pub fn is_walkable(&self, p: GridPoint) -> bool {
        self.node(p).walkable()
    }

    /// In-bounds cardinal neighbors of `p`: left, right, up, down.
    pub fn neighbors(&self, p: GridPoint) -> Vec<GridPoint> {
        CARDINAL_STEPS
            .iter()
            .map(|&step| p.offset(step))
            .filter(|&n| self.contains(n))
            .collect()
    }

    /// Returns the live occupant at `p`.
    ///
    /// # Panics
    /// Panics if `p` is outside the grid.
    pub fn check_collision(&self, p: GridPoint) -> Option<Arc<dyn Occupant>> {
        self.node(p).occupant()
    }

    /// Returns the live occupant at a world position.
    pub fn check_collision_at_world(&self, world_p: WorldPoint) -> Option<Arc<dyn Occupant>> {
        self.check_collision(self.world_to_grid(world_p))
    }

    /// Moves the occupant reference from `from` to `to` and clears `from`.
    ///
    /// Whatever was at `to` is overwritten. Callers check walkability first.
    /// Moving onto the same cell leaves the occupant in place.
    ///
    /// # Panics
    /// Panics if either point is outside the grid.
    pub fn move_occupant(&mut self, from: GridPoint, to: GridPoint) {
        let from_index = self.expect_index(from);
        let to_index = self.expect_index(to);
        if from_index == to_index {
            return;
        }

        let occupant = self.nodes[from_index].occupant_ref();
        self.nodes[to_index].set_occupant_ref(occupant);
        self.nodes[from_index] = Node::empty(from);
        trace!(%from, %to, "Occupant moved");
    }

    /// World-position variant of [`Grid::move_occupant`].
    pub fn move_occupant_world(&mut self, from: WorldPoint, to: WorldPoint) {
        let (from, to) = (self.world_to_grid(from), self.world_to_grid(to));
        self.move_occupant(from, to);
    }

    /// Replaces the node at `p` with a fresh node holding `occupant`.
    ///
    /// # Panics
    /// Panics if `p` is outside the grid.
    pub fn add_occupant(&mut self, p: GridPoint, occupant: &Arc<dyn Occupant>) {
        let index = self.expect_index(p);
        self.nodes[index] = Node::occupied(p, occupant);
        trace!(position = %p, tile_type = %occupant.tile_type(), "Occupant added");
    }

    /// World-position variant of [`Grid::add_occupant`].
    pub fn add_occupant_world(&mut self, world_p: WorldPoint, occupant: &Arc<dyn Occupant>) {
        let p = self.world_to_grid(world_p);
        self.add_occupant(p, occupant);
    }

    /// Replaces the node at `p` with a fresh empty node.
    pub fn clear_cell(&mut self, p: GridPoint) {
        let index = self.expect_index(p);
        self.nodes[index] = Node::empty(p);
    }

    /// Places `occupant` on every cell of the outer ring.
    pub fn add_border_walls(&mut self, occupant: &Arc<dyn Occupant>) {
        let (max_x, max_y) = (self.size_x as i32 - 1, self.size_y as i32 - 1);
        for index in 0..self.nodes.len() {
            let p = self.point_of(index);
            if p.x == 0 || p.y == 0 || p.x == max_x || p.y == max_y {
                self.nodes[index] = Node::occupied(p, occupant);
            }
        }
    }

    /// Walkable cells, excluding the outer ring of the grid.
    pub fn walkable_interior(&self) -> Vec<GridPoint> {
        let (max_x, max_y) = (self.size_x as i32 - 1, self.size_y as i32 - 1);
        self.nodes
            .iter()
            .map(Node::position)
            .filter(|p| p.x > 0 && p.y > 0 && p.x < max_x && p.y < max_y)
            .filter(|&p| self.is_walkable(p))
            .collect()
    }

    /// Picks a uniformly random walkable interior cell.
    ///
    /// # Returns
    /// * `Option<GridPoint>` - `None` when no interior cell is walkable
    pub fn random_walkable<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<GridPoint> {
        let candidates = self.walkable_interior();
        let picked = candidates.choose(rng).copied();
        if picked.is_none() {
            debug!("No walkable cell left to sample");
        }
        picked
    }

    /// [`Grid::random_walkable`] using the thread-local RNG.
    pub fn random_walkable_coordinate(&self) -> Option<GridPoint> {
        self.random_walkable(&mut rand::rng())
    }

    /// World-position variant of [`Grid::random_walkable_coordinate`].
    pub fn random_walkable_position(&self) -> Option<WorldPoint> {
        self.random_walkable_coordinate()
            .map(|p| self.grid_to_world(p))
    }
}

impl Index<GridPoint> for Grid {
    type Output = Node;

    fn index(&self, p: GridPoint) -> &Node {
        self.node(p)
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Grid ({}x{}, tile size: {:.3})", self.size_x, self.size_y, self.tile_size)?;

        // Top row first so the picture matches a y-up world.
        for y in (0..self.size_y).rev() {
            for x in 0..self.size_x {
                let node = &self.nodes[y * self.size_x + x];
                write!(f, "{}", if node.walkable() { '.' } else { '#' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Tile, TileType};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::empty(10, 6, 1.0).unwrap();
        assert_eq!(grid.size_x(), 10);
        assert_eq!(grid.size_y(), 6);
        assert_eq!(grid.max_size(), 60);
        assert!(grid.nodes().iter().all(Node::walkable));
    }

    #[test]
    fn test_invalid_creation() {
        assert!(matches!(
            Grid::empty(0, 10, 1.0),
            Err(PathfindingError::InvalidDimensions(_))
        ));
        assert!(matches!(
            Grid::empty(10, -3, 1.0),
            Err(PathfindingError::InvalidDimensions(_))
        ));
        assert!(matches!(
            Grid::empty(10, 10, 0.0),
            Err(PathfindingError::InvalidTileSize(_))
        ));
    }

    #[test]
    fn test_probe_is_called_once_per_cell() {
        let wall = Tile::obstacle();
        let mut calls = 0;
        let grid = Grid::new(4, 3, 1.0, |p| {
            calls += 1;
            (p.x == 2).then(|| wall.clone())
        })
        .unwrap();

        assert_eq!(calls, 12);
        assert!(!grid.is_walkable(GridPoint::new(2, 0)));
        assert!(!grid.is_walkable(GridPoint::new(2, 2)));
        assert!(grid.is_walkable(GridPoint::new(1, 1)));
    }

    #[test]
    fn test_coordinate_conversion() {
        let grid = Grid::empty(10, 10, 2.0).unwrap();

        assert_eq!(grid.world_to_grid(WorldPoint::new(4.0, 6.0)), GridPoint::new(2, 3));
        // Rounds to the nearest cell.
        assert_eq!(grid.world_to_grid(WorldPoint::new(4.9, 5.1)), GridPoint::new(2, 3));
        assert_eq!(grid.world_to_grid(WorldPoint::new(5.1, 2.9)), GridPoint::new(3, 1));

        assert_eq!(grid.grid_to_world(GridPoint::new(3, 4)), WorldPoint::new(6.0, 8.0));
        let p = GridPoint::new(7, 1);
        assert_eq!(grid.world_to_grid(grid.grid_to_world(p)), p);
    }

    #[test]
    fn test_checked_access() {
        let grid = Grid::empty(5, 5, 1.0).unwrap();
        assert!(grid.get(GridPoint::new(4, 4)).is_ok());
        assert_eq!(
            grid.get(GridPoint::new(5, 2)).unwrap_err(),
            PathfindingError::OutOfBounds { x: 5, y: 2 }
        );
        assert!(matches!(
            grid.get(GridPoint::new(-1, 0)),
            Err(PathfindingError::OutOfBounds { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_indexing_out_of_bounds_panics() {
        let grid = Grid::empty(3, 3, 1.0).unwrap();
        let _ = &grid[GridPoint::new(3, 0)];
    }

    #[test]
    fn test_neighbors_stay_in_bounds() {
        let grid = Grid::empty(3, 3, 1.0).unwrap();

        let corner = grid.neighbors(GridPoint::new(0, 0));
        assert_eq!(corner, vec![GridPoint::new(1, 0), GridPoint::new(0, 1)]);

        // The far edge must not admit x == size_x or y == size_y.
        let far = grid.neighbors(GridPoint::new(2, 2));
        assert_eq!(far, vec![GridPoint::new(1, 2), GridPoint::new(2, 1)]);

        let center = grid.neighbors(GridPoint::new(1, 1));
        assert_eq!(
            center,
            vec![
                GridPoint::new(0, 1),
                GridPoint::new(2, 1),
                GridPoint::new(1, 2),
                GridPoint::new(1, 0)
            ]
        );
    }

    #[test]
    fn test_move_occupant() {
        let mut grid = Grid::empty(5, 5, 1.0).unwrap();
        let head = Tile::snake();
        let food = Tile::food();
        let from = GridPoint::new(1, 1);
        let to = GridPoint::new(2, 1);

        grid.add_occupant(from, &head);
        grid.add_occupant(to, &food);
        grid.node_mut(from).g_cost = 42;

        grid.move_occupant(from, to);

        assert!(grid.check_collision(from).is_none());
        assert_eq!(grid.node(from).g_cost, 0);
        // The food reference is overwritten without complaint.
        assert_eq!(grid.node(to).tile_type(), Some(TileType::Snake));
    }

    #[test]
    fn test_move_occupant_onto_itself_keeps_it() {
        let mut grid = Grid::empty(3, 3, 1.0).unwrap();
        let head = Tile::snake();
        let p = GridPoint::new(1, 1);
        grid.add_occupant(p, &head);

        grid.move_occupant(p, p);

        assert_eq!(grid.node(p).tile_type(), Some(TileType::Snake));
    }

    #[test]
    fn test_add_occupant_resets_costs() {
        let mut grid = Grid::empty(4, 4, 1.0).unwrap();
        let p = GridPoint::new(2, 2);
        grid.node_mut(p).g_cost = 30;
        grid.node_mut(p).h_cost = 10;

        let wall = Tile::obstacle();
        grid.add_occupant(p, &wall);
        assert_eq!(grid.node(p).f_cost(), 0);
        assert!(!grid.is_walkable(p));
        assert!(grid.check_collision(p).is_some());

        grid.clear_cell(p);
        assert!(grid.is_walkable(p));
    }

    #[test]
    fn test_world_variants() {
        let mut grid = Grid::empty(4, 4, 0.5).unwrap();
        let head = Tile::snake();
        grid.add_occupant_world(WorldPoint::new(0.5, 0.5), &head);
        assert!(grid.check_collision(GridPoint::new(1, 1)).is_some());

        grid.move_occupant_world(WorldPoint::new(0.5, 0.5), WorldPoint::new(1.0, 0.5));
        assert!(grid.check_collision_at_world(WorldPoint::new(1.0, 0.5)).is_some());
        assert!(grid.check_collision_at_world(WorldPoint::new(0.5, 0.5)).is_none());
    }

    #[test]
    fn test_random_walkable_excludes_border() {
        let grid = Grid::empty(5, 4, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let p = grid.random_walkable(&mut rng).unwrap();
            assert!(p.x >= 1 && p.x <= 3, "x on border: {p}");
            assert!(p.y >= 1 && p.y <= 2, "y on border: {p}");
        }
    }

    #[test]
    fn test_random_walkable_saturated_grid() {
        let wall = Tile::obstacle();
        let mut grid = Grid::empty(4, 4, 1.0).unwrap();
        for x in 1..3 {
            for y in 1..3 {
                grid.add_occupant(GridPoint::new(x, y), &wall);
            }
        }
        assert_eq!(grid.random_walkable(&mut StdRng::seed_from_u64(1)), None);
        assert_eq!(grid.random_walkable_position(), None);

        // Food does not block sampling.
        let food = Tile::food();
        grid.add_occupant(GridPoint::new(2, 2), &food);
        assert_eq!(grid.random_walkable_coordinate(), Some(GridPoint::new(2, 2)));
    }

    #[test]
    fn test_border_walls_and_display() {
        let wall = Tile::obstacle();
        let mut grid = Grid::empty(4, 3, 1.0).unwrap();
        grid.add_border_walls(&wall);

        assert_eq!(grid.walkable_interior(), vec![GridPoint::new(1, 1), GridPoint::new(2, 1)]);

        let display_str = format!("{}", grid);
        assert!(display_str.contains("Grid (4x3"));
        assert!(display_str.contains("####\n#..#\n####"));
    }
}
