use std::sync::Arc;

use anyhow::Context;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serpent_pathfinding::{
    Grid, GridPoint, Occupant, PathfindingError, Pathfinder, ServiceConfig, SharedGrid, Tile,
    spawn_path_service,
};
use tracing::{debug, info, warn};

use crate::config::{GridSettings, Settings};

/// Owns the occupants placed on the grid and tracks the head and the food.
///
/// The grid only keeps weak references, so every occupant lives here.
pub struct Board {
    grid: SharedGrid,
    _walls: Vec<Arc<dyn Occupant>>,
    head: Arc<dyn Occupant>,
    food: Arc<dyn Occupant>,
    head_position: GridPoint,
    food_position: Option<GridPoint>,
    rng: StdRng,
}

impl Board {
    /// Builds a walled grid with random interior obstacles, a head and one food tile.
    pub fn new(settings: &GridSettings, seed: u64) -> Result<Self, PathfindingError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut walls: Vec<Arc<dyn Occupant>> = Vec::new();
        let (max_x, max_y) = (settings.size_x - 1, settings.size_y - 1);

        let grid = Grid::new(settings.size_x, settings.size_y, settings.tile_size, |p| {
            let border = p.x == 0 || p.y == 0 || p.x == max_x || p.y == max_y;
            if border || rng.random_bool(settings.obstacle_density.clamp(0.0, 1.0)) {
                let wall = Tile::obstacle();
                walls.push(Arc::clone(&wall));
                Some(wall)
            } else {
                None
            }
        })?;

        let head_position = grid
            .random_walkable(&mut rng)
            .ok_or(PathfindingError::NoWalkableCell)?;

        let mut board = Board {
            grid: Arc::new(RwLock::new(grid)),
            _walls: walls,
            head: Tile::snake(),
            food: Tile::food(),
            head_position,
            food_position: None,
            rng,
        };
        board.grid.write().add_occupant(head_position, &board.head);
        board.spawn_food();
        Ok(board)
    }

    pub fn grid(&self) -> SharedGrid {
        Arc::clone(&self.grid)
    }

    pub fn head_position(&self) -> GridPoint {
        self.head_position
    }

    pub fn food_position(&self) -> Option<GridPoint> {
        self.food_position
    }

    /// Places food on a random free interior cell other than the head.
    fn spawn_food(&mut self) -> Option<GridPoint> {
        let mut grid = self.grid.write();
        let candidates: Vec<GridPoint> = grid
            .walkable_interior()
            .into_iter()
            .filter(|&p| p != self.head_position)
            .collect();

        self.food_position = candidates.choose(&mut self.rng).copied();
        match self.food_position {
            Some(p) => {
                grid.add_occupant(p, &self.food);
                debug!(position = %p, "Food spawned");
            }
            None => info!("No free cell left for food"),
        }
        self.food_position
    }

    /// Moves the head one cell along `waypoints`.
    ///
    /// # Returns
    /// * `bool` - True if the head reached the food
    pub fn advance(&mut self, waypoints: &[GridPoint]) -> bool {
        let Some(&next_waypoint) = waypoints.iter().find(|&&p| p != self.head_position) else {
            return false;
        };

        let delta = next_waypoint.delta(self.head_position);
        let step = GridPoint::new(delta.x.signum(), delta.y.signum());
        let next = self.head_position.offset(step);

        let mut grid = self.grid.write();
        if !grid.is_walkable(next) {
            warn!(from = %self.head_position, to = %next, "Next cell is blocked");
            return false;
        }
        grid.move_occupant(self.head_position, next);
        drop(grid);
        self.head_position = next;

        if Some(next) == self.food_position {
            self.spawn_food();
            return true;
        }
        false
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AutopilotSummary {
    pub steps: u32,
    pub food_eaten: u32,
    pub failed_searches: u32,
}

/// Drives the head towards the food through the path service.
pub async fn run_autopilot(settings: &Settings) -> anyhow::Result<AutopilotSummary> {
    let mut board = Board::new(&settings.grid, settings.demo.seed).context("building the board")?;
    info!(head = %board.head_position(), food = ?board.food_position(), "Board ready");
    debug!("\n{}", board.grid.read());

    let (handle, service) = spawn_path_service(
        Pathfinder::new(board.grid()),
        ServiceConfig::from(&settings.service),
    )
    .context("starting the path service")?;
    let mut summary = AutopilotSummary::default();

    for _ in 0..settings.demo.steps {
        let Some(food) = board.food_position() else {
            info!("Board is full, stopping");
            break;
        };

        let outcome = handle
            .request_path(board.head_position(), food)
            .await
            .context("requesting a path to the food")?;
        summary.steps += 1;

        if !outcome.success {
            summary.failed_searches += 1;
            warn!(head = %board.head_position(), %food, "Food is unreachable");
            continue;
        }
        if board.advance(&outcome.waypoints) {
            summary.food_eaten += 1;
            info!(food_eaten = summary.food_eaten, "Food eaten");
        }
    }

    drop(handle);
    service.await.context("path service panicked")?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use serpent_pathfinding::astar::find_path;

    fn settings(steps: u32, density: f64) -> Settings {
        parse_config(&format!(
            "[grid]\nsize_x = 10\nsize_y = 8\ntile_size = 1.0\nobstacle_density = {density}\n\
             [service]\ntick_ms = 5\nchannel_capacity = 8\n\
             [demo]\nsteps = {steps}\nseed = 7\n"
        ))
        .unwrap()
    }

    #[test]
    fn test_board_places_head_and_food_inside_walls() {
        let board = Board::new(&settings(0, 0.0).grid, 3).unwrap();
        let grid = board.grid.read();
        let head = board.head_position();
        let food = board.food_position().unwrap();

        assert_ne!(head, food);
        assert!(grid.check_collision(head).is_some());
        assert!(grid.check_collision(food).is_some());
        assert!(!grid.is_walkable(GridPoint::new(0, 0)));
        assert!(!grid.is_walkable(GridPoint::new(9, 7)));
    }

    #[test]
    fn test_advance_moves_one_cell() {
        let mut board = Board::new(&settings(0, 0.0).grid, 11).unwrap();
        let head = board.head_position();
        let food = board.food_position().unwrap();
        let waypoints = {
            let mut grid = board.grid.write();
            find_path(&mut grid, head, food).into_path().unwrap()
        };

        board.advance(&waypoints);
        let moved = board.head_position();
        assert_eq!((moved.x - head.x).abs() + (moved.y - head.y).abs(), 1);
        assert!(board.grid.read().check_collision(head).is_none());
    }

    #[test]
    fn test_walled_in_board_has_no_room_for_the_head() {
        let mut grid_settings = settings(0, 0.0).grid;
        grid_settings.size_x = 2;
        grid_settings.size_y = 2;
        let err = Board::new(&grid_settings, 1).err();
        assert_eq!(err, Some(PathfindingError::NoWalkableCell));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_channel_capacity_aborts_the_run() {
        let mut settings = settings(5, 0.0);
        settings.service.channel_capacity = 0;
        let err = run_autopilot(&settings).await.unwrap_err();
        assert!(format!("{err:#}").contains("Channel capacity"), "{err:#}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_autopilot_eats_food() {
        let summary = run_autopilot(&settings(60, 0.0)).await.unwrap();
        assert_eq!(summary.steps, 60);
        assert_eq!(summary.failed_searches, 0);
        assert!(summary.food_eaten >= 1, "{summary:?}");
    }
}
