//! Async front end for the request queue.
//!
//! A single tokio task owns the [`RequestQueue`] and advances it on a fixed
//! tick. Callers talk to it through a cloneable [`PathServiceHandle`].

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};

use crate::astar::Pathfinder;
use crate::error::PathfindingError;
use crate::map::GridPoint;
use crate::request::RequestQueue;

/// The answer to one path request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathOutcome {
    /// Simplified waypoints from start to target; empty on failure.
    pub waypoints: Vec<GridPoint>,
    /// Whether the target was reached.
    pub success: bool,
}

type Reply = oneshot::Sender<Result<PathOutcome, PathfindingError>>;

#[derive(Debug)]
struct Command {
    start: GridPoint,
    target: GridPoint,
    reply: Reply,
}

/// Cloneable handle for submitting requests to a running path service.
#[derive(Debug, Clone)]
pub struct PathServiceHandle {
    tx: mpsc::Sender<Command>,
}

impl PathServiceHandle {
    /// Requests a path and waits for the search to be delivered.
    ///
    /// Results arrive in the order requests reached the service.
    pub async fn request_path(
        &self,
        start: GridPoint,
        target: GridPoint,
    ) -> Result<PathOutcome, PathfindingError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command { start, target, reply })
            .await
            .map_err(|_| PathfindingError::ServiceStopped)?;
        rx.await.map_err(|_| PathfindingError::ServiceStopped)?
    }
}

/// Settings for the background path service.
#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
    /// Time between queue ticks.
    pub tick: Duration,
    /// Capacity of the request channel.
    pub channel_capacity: usize,
}

impl ServiceConfig {
    /// Rejects settings the service cannot run with.
    pub fn validate(&self) -> Result<(), PathfindingError> {
        if self.tick.is_zero() {
            return Err(PathfindingError::InvalidServiceConfig("Tick must be non-zero"));
        }
        if self.channel_capacity == 0 {
            return Err(PathfindingError::InvalidServiceConfig("Channel capacity must be at least 1"));
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(20),
            channel_capacity: 64,
        }
    }
}

/// Spawns the path service on the current tokio runtime.
///
/// The task exits once every handle is dropped and all accepted requests
/// have been delivered.
///
/// Returns [`PathfindingError::InvalidServiceConfig`] without spawning
/// anything if `config` has a zero tick or a zero channel capacity.
pub fn spawn_path_service(
    pathfinder: Pathfinder,
    config: ServiceConfig,
) -> Result<(PathServiceHandle, JoinHandle<()>), PathfindingError> {
    config.validate()?;
    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let queue = RequestQueue::new(pathfinder);
    let task = tokio::spawn(run_path_service(queue, rx, config.tick));
    Ok((PathServiceHandle { tx }, task))
}

async fn run_path_service(mut queue: RequestQueue, mut rx: mpsc::Receiver<Command>, tick: Duration) {
    info!(tick_ms = tick.as_millis() as u64, "Path service started");
    let mut ticker = time::interval(tick);
    let mut accepting = true;

    loop {
        if !accepting && queue.is_idle() {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {
                queue.tick();
            }
            command = rx.recv(), if accepting => {
                match command {
                    Some(command) => submit(&mut queue, command),
                    None => {
                        debug!(pending = queue.pending(), "All path service handles dropped, draining");
                        accepting = false;
                    }
                }
            }
        }
    }

    info!("Path service stopped");
}

fn submit(queue: &mut RequestQueue, Command { start, target, reply }: Command) {
    // The callback takes ownership of `reply`, so a rejection has to be
    // answered here before the request is handed to the queue.
    let in_bounds = {
        let grid = queue.pathfinder().grid().read();
        grid.get(start).and(grid.get(target)).map(|_| ())
    };
    if let Err(e) = in_bounds {
        warn!(%start, %target, "Rejected path request: {}", e);
        let _ = reply.send(Err(e));
        return;
    }

    let queued = queue.request(start, target, move |waypoints, success| {
        // The caller may have stopped waiting; that is not an error here.
        let _ = reply.send(Ok(PathOutcome { waypoints, success }));
    });
    debug_assert!(queued.is_ok(), "bounds were checked before queueing");
}
