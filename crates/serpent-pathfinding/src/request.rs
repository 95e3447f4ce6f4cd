use std::collections::VecDeque;
use std::fmt;
use std::task::Poll;

use tracing::{debug, info};

use crate::astar::{Pathfinder, SearchTask};
use crate::error::PathfindingError;
use crate::map::GridPoint;

/// Receives `(waypoints, success)` once the search for a request completes.
pub type PathCallback = Box<dyn FnOnce(Vec<GridPoint>, bool) + Send>;

/// A queued path request.
pub struct PathRequest {
    /// Monotonic id, assigned in submission order.
    pub id: u64,
    /// Starting cell.
    pub start: GridPoint,
    /// Goal cell.
    pub target: GridPoint,
    callback: PathCallback,
}

impl fmt::Debug for PathRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathRequest")
            .field("id", &self.id)
            .field("start", &self.start)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

struct ActiveRequest {
    request: PathRequest,
    task: SearchTask,
}

/// Serializes path requests so that exactly one search is in flight.
///
/// Requests are dispatched in submission order. Each search runs as soon as it
/// is dispatched and then yields; its callback fires on a later [`tick`],
/// after which the next queued request is dispatched.
///
/// [`tick`]: RequestQueue::tick
pub struct RequestQueue {
    pathfinder: Pathfinder,
    queue: VecDeque<PathRequest>,
    active: Option<ActiveRequest>,
    next_id: u64,
}

impl RequestQueue {
    /// Creates an idle queue that dispatches to `pathfinder`.
    pub fn new(pathfinder: Pathfinder) -> Self {
        Self {
            pathfinder,
            queue: VecDeque::new(),
            active: None,
            next_id: 0,
        }
    }

    /// The pathfinder requests are dispatched to.
    pub fn pathfinder(&self) -> &Pathfinder {
        &self.pathfinder
    }

    /// Queues a path request and dispatches it right away if nothing is running.
    ///
    /// The callback never fires from inside this call.
    ///
    /// # Returns
    /// * `Result<u64, PathfindingError>` - The request id, or `OutOfBounds` if either cell is off the grid
    pub fn request<F>(&mut self, start: GridPoint, target: GridPoint, callback: F) -> Result<u64, PathfindingError>
    where
        F: FnOnce(Vec<GridPoint>, bool) + Send + 'static,
    {
        {
            let grid = self.pathfinder.grid().read();
            grid.get(start)?;
            grid.get(target)?;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.queue.push_back(PathRequest {
            id,
            start,
            target,
            callback: Box::new(callback),
        });
        debug!(id, %start, %target, queued = self.queue.len(), "Path request queued");

        self.try_process_next();
        Ok(id)
    }

    /// Advances the active search by one scheduling step.
    ///
    /// # Returns
    /// * `bool` - True if a callback fired during this tick
    pub fn tick(&mut self) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        match active.task.poll_step() {
            Poll::Pending => false,
            Poll::Ready(result) => {
                let (waypoints, success) = result.into_parts();
                self.on_search_finished(waypoints, success);
                true
            }
        }
    }

    /// Delivers the active request's result, then dispatches the next request.
    fn on_search_finished(&mut self, waypoints: Vec<GridPoint>, success: bool) {
        if let Some(ActiveRequest { request, .. }) = self.active.take() {
            info!(
                id = request.id,
                start = %request.start,
                target = %request.target,
                success,
                waypoints = waypoints.len(),
                "Path request finished"
            );
            (request.callback)(waypoints, success);
        }
        self.try_process_next();
    }

    fn try_process_next(&mut self) {
        if self.active.is_some() {
            return;
        }
        let Some(request) = self.queue.pop_front() else {
            return;
        };

        debug!(id = request.id, "Dispatching path request");
        let mut task = self.pathfinder.start_search(request.start, request.target);
        // The search runs now; its result is held until the next tick.
        let _ = task.poll_step();
        self.active = Some(ActiveRequest { request, task });
    }

    /// Returns true while a search is in flight.
    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// Number of requests waiting behind the active one.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is running or waiting.
    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.queue.is_empty()
    }
}
