/*

A*: f(n) = g(n) + h(n)

    g(n) = cost of the best known route from the start to n
    h(n) = octile estimate from n to the target
    f(n) = estimated cost of the cheapest route through n

The open set is an intrusive heap over the grid's node arena, so a node whose
g(n) improves is re-sifted in place rather than pushed a second time. Nodes
that have been expanded go into the closed set and are never reopened; with a
consistent heuristic and non-negative penalties the first expansion of the
target is optimal.

*/

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::heap::PriorityQueue;
use crate::map::{Grid, GridPoint};

/// Cost of one straight step.
pub const STRAIGHT_COST: i32 = 10;
/// Cost of one diagonal step.
pub const DIAGONAL_COST: i32 = 14;

/// A grid shared between the pathfinder and whoever moves occupants around.
pub type SharedGrid = Arc<RwLock<Grid>>;

/// Represents the result of an A* search with metadata.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathResult {
    /// The simplified waypoints, if a path was found.
    pub path: Option<Vec<GridPoint>>,
    /// The accumulated cost of the path.
    pub total_cost: Option<i32>,
    /// The number of nodes expanded during the search.
    pub nodes_explored: usize,
    /// The number of waypoints.
    pub path_length: usize,
}

impl PathResult {
    /// Creates a new PathResult for a successful search.
    pub fn success(path: Vec<GridPoint>, total_cost: i32, nodes_explored: usize) -> Self {
        let path_length = path.len();
        Self {
            path: Some(path),
            total_cost: Some(total_cost),
            nodes_explored,
            path_length,
        }
    }

    /// Creates a new PathResult for a failed search.
    pub fn failure(nodes_explored: usize) -> Self {
        Self {
            path: None,
            total_cost: None,
            nodes_explored,
            path_length: 0,
        }
    }

    /// Returns true if a path was found.
    pub fn is_success(&self) -> bool {
        self.path.is_some()
    }

    /// Returns the path if one was found.
    pub fn into_path(self) -> Option<Vec<GridPoint>> {
        self.path
    }

    /// Splits into the `(waypoints, success)` pair handed to request callbacks.
    ///
    /// A failed search yields an empty waypoint list.
    pub fn into_parts(self) -> (Vec<GridPoint>, bool) {
        match self.path {
            Some(path) => (path, true),
            None => (Vec::new(), false),
        }
    }
}

impl fmt::Display for PathResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(_) => write!(
                f,
                "PathResult {{ success: true, path_length: {}, total_cost: {}, nodes_explored: {} }}",
                self.path_length,
                self.total_cost.unwrap_or(0),
                self.nodes_explored
            ),
            None => write!(
                f,
                "PathResult {{ success: false, nodes_explored: {} }}",
                self.nodes_explored
            ),
        }
    }
}

/// Integer octile distance between two grid points.
///
/// Diagonal steps cost 14 and straight steps 10, so on a 4-connected grid the
/// estimate never exceeds the true cost.
pub fn octile_distance(a: GridPoint, b: GridPoint) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let (low, high) = if dx < dy { (dx, dy) } else { (dy, dx) };
    DIAGONAL_COST * low + STRAIGHT_COST * (high - low)
}

/// Walks parent links from `target` back to `start` and returns the cells in start-to-target order.
fn retrace_path(grid: &Grid, start: usize, target: usize) -> Vec<GridPoint> {
    let nodes = grid.nodes();
    let mut path = vec![grid.point_of(target)];
    let mut current = target;
    while current != start {
        match nodes[current].parent {
            Some(parent) => {
                path.push(grid.point_of(parent));
                current = parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Collapses a cell-by-cell path into its direction-change points.
///
/// The first and last cells are always kept. A straight run becomes its two
/// endpoints and every turn contributes the cell where it happens.
pub fn simplify_path(path: &[GridPoint]) -> Vec<GridPoint> {
    let Some((&first, rest)) = path.split_first() else {
        return Vec::new();
    };

    let mut waypoints = vec![first];
    let mut previous = first;
    let mut previous_direction: Option<GridPoint> = None;

    for &cell in rest {
        let direction = cell.delta(previous);
        if previous_direction.is_some_and(|old| old != direction) {
            waypoints.push(previous);
        }
        previous_direction = Some(direction);
        previous = cell;
    }

    if !rest.is_empty() {
        waypoints.push(previous);
    }
    waypoints
}

/// Runs A* from `start` to `target` on `grid`.
///
/// Per-search node state (costs, parents, heap slots) is rewritten for every
/// node the search touches, so results never depend on an earlier search.
///
/// # Arguments
/// * `grid` - The grid to plan in. Node scratch fields are overwritten.
/// * `start` - Starting cell.
/// * `target` - Goal cell.
///
/// # Returns
/// * `PathResult` - Simplified waypoints and search metadata.
///
/// # Panics
/// Panics if `start` or `target` lies outside the grid.
pub fn find_path(grid: &mut Grid, start: GridPoint, target: GridPoint) -> PathResult {
    let start_index = grid.expect_index(start);
    let target_index = grid.expect_index(target);
    let mut nodes_explored = 0;

    if !grid.is_walkable(start) || !grid.is_walkable(target) {
        debug!(%start, %target, "Start or target is not walkable");
        return PathResult::failure(nodes_explored);
    }

    let mut open_set = PriorityQueue::with_capacity(grid.max_size());
    let mut closed_set: HashSet<usize> = HashSet::new();

    grid.nodes_mut()[start_index].reset_search_state();
    open_set.push(grid.nodes_mut(), start_index);

    let mut found = false;
    while let Some(current) = open_set.pop_min(grid.nodes_mut()) {
        nodes_explored += 1;
        closed_set.insert(current);

        if current == target_index {
            found = true;
            break;
        }

        let current_point = grid.point_of(current);
        let current_g = grid.nodes()[current].g_cost;

        for neighbor_point in grid.neighbors(current_point) {
            let neighbor = grid.expect_index(neighbor_point);
            let node = &grid.nodes()[neighbor];
            if closed_set.contains(&neighbor) || !node.walkable() {
                continue;
            }

            let tentative_g = current_g
                + octile_distance(current_point, neighbor_point)
                + node.movement_penalty();
            let in_open_set = open_set.contains(grid.nodes(), neighbor);

            if tentative_g < node.g_cost || !in_open_set {
                let node = &mut grid.nodes_mut()[neighbor];
                node.g_cost = tentative_g;
                node.h_cost = octile_distance(neighbor_point, target);
                node.parent = Some(current);

                if in_open_set {
                    open_set.decrease_key(grid.nodes_mut(), neighbor);
                } else {
                    open_set.push(grid.nodes_mut(), neighbor);
                }
            }
        }
        trace!(nodes_explored, open = open_set.len(), "Expanded {}", current_point);
    }

    open_set.clear(grid.nodes_mut());

    if !found {
        debug!(%start, %target, nodes_explored, "Open set exhausted without reaching target");
        return PathResult::failure(nodes_explored);
    }

    let total_cost = grid.nodes()[target_index].g_cost;
    let cells = retrace_path(grid, start_index, target_index);
    let waypoints = simplify_path(&cells);
    debug!(
        %start,
        %target,
        total_cost,
        nodes_explored,
        cells = cells.len(),
        waypoints = waypoints.len(),
        "Path found"
    );
    PathResult::success(waypoints, total_cost, nodes_explored)
}

/// Plans paths on a shared grid.
#[derive(Clone)]
pub struct Pathfinder {
    grid: SharedGrid,
}

impl Pathfinder {
    /// Creates a pathfinder over `grid`.
    pub fn new(grid: SharedGrid) -> Self {
        Self { grid }
    }

    /// The grid this pathfinder plans on.
    pub fn grid(&self) -> &SharedGrid {
        &self.grid
    }

    /// Runs a search to completion, holding the grid's write lock throughout.
    pub fn find_path(&self, start: GridPoint, target: GridPoint) -> PathResult {
        let mut grid = self.grid.write();
        find_path(&mut grid, start, target)
    }

    /// Creates a search that runs on its first poll and delivers on the next.
    pub fn start_search(&self, start: GridPoint, target: GridPoint) -> SearchTask {
        SearchTask {
            grid: Arc::clone(&self.grid),
            start,
            target,
            state: SearchState::NotStarted,
        }
    }
}

enum SearchState {
    NotStarted,
    Finished(PathResult),
    Delivered,
}

/// A search that yields exactly once between finishing and delivering its result.
///
/// The first poll runs the whole search and returns `Poll::Pending`; the
/// second returns the result. Delivery therefore always lands at least one
/// scheduling tick after the request, never inside the caller's own turn.
pub struct SearchTask {
    grid: SharedGrid,
    start: GridPoint,
    target: GridPoint,
    state: SearchState,
}

impl SearchTask {
    /// Starting cell of this search.
    pub fn start(&self) -> GridPoint {
        self.start
    }

    /// Goal cell of this search.
    pub fn target(&self) -> GridPoint {
        self.target
    }

    /// Advances the search by one scheduling step.
    ///
    /// # Panics
    /// Panics if polled again after returning `Poll::Ready`.
    pub fn poll_step(&mut self) -> Poll<PathResult> {
        match std::mem::replace(&mut self.state, SearchState::Delivered) {
            SearchState::NotStarted => {
                let result = {
                    let mut grid = self.grid.write();
                    find_path(&mut grid, self.start, self.target)
                };
                self.state = SearchState::Finished(result);
                Poll::Pending
            }
            SearchState::Finished(result) => Poll::Ready(result),
            SearchState::Delivered => panic!("SearchTask polled after completion"),
        }
    }
}

impl Future for SearchTask {
    type Output = PathResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<PathResult> {
        let poll = self.get_mut().poll_step();
        if poll.is_pending() {
            cx.waker().wake_by_ref();
        }
        poll
    }
}
