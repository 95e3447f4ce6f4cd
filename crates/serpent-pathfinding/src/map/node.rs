use std::cmp::Ordering;
use std::sync::{Arc, Weak};

use super::GridPoint;
use super::occupant::{Occupant, OccupantRef, TileType};
use crate::heap::HeapItem;

/// A single grid cell and the A* bookkeeping attached to it.
///
/// Cost, parent and heap fields are scratch state owned by whichever search
/// touched the node last; they carry no meaning outside that search.
#[derive(Clone)]
pub struct Node {
    position: GridPoint,
    occupant: Option<OccupantRef>,
    /// Accumulated cost from the search start.
    pub g_cost: i32,
    /// Heuristic estimate of the remaining cost to the target.
    pub h_cost: i32,
    /// Arena index of the node this one was reached from.
    pub parent: Option<usize>,
    heap_index: Option<usize>,
    movement_penalty: i32,
}

impl Node {
    /// Creates a node with zeroed costs.
    pub fn new(position: GridPoint, occupant: Option<OccupantRef>, movement_penalty: i32) -> Self {
        debug_assert!(movement_penalty >= 0, "negative movement penalty {movement_penalty}");
        Self {
            position,
            occupant,
            g_cost: 0,
            h_cost: 0,
            parent: None,
            heap_index: None,
            movement_penalty,
        }
    }

    /// Creates an unoccupied node.
    pub fn empty(position: GridPoint) -> Self {
        Self::new(position, None, 0)
    }

    /// Creates a node that holds a weak reference to `occupant`.
    pub fn occupied(position: GridPoint, occupant: &Arc<dyn Occupant>) -> Self {
        Self::new(position, Some(Arc::downgrade(occupant)), 0)
    }

    /// The grid cell this node represents.
    pub fn position(&self) -> GridPoint {
        self.position
    }

    /// Total estimated cost through this node.
    pub fn f_cost(&self) -> i32 {
        self.g_cost + self.h_cost
    }

    /// Extra cost charged for entering this cell.
    pub fn movement_penalty(&self) -> i32 {
        self.movement_penalty
    }

    /// Sets the extra cost charged for entering this cell.
    ///
    /// The penalty must not be negative or the search may miss the cheapest path.
    pub fn set_movement_penalty(&mut self, penalty: i32) {
        debug_assert!(penalty >= 0, "negative movement penalty {penalty}");
        self.movement_penalty = penalty;
    }

    /// The occupant, if one is set and still alive.
    pub fn occupant(&self) -> Option<Arc<dyn Occupant>> {
        self.occupant.as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn occupant_ref(&self) -> Option<OccupantRef> {
        self.occupant.clone()
    }

    pub(crate) fn set_occupant_ref(&mut self, occupant: Option<OccupantRef>) {
        self.occupant = occupant;
    }

    /// Classification of the live occupant.
    pub fn tile_type(&self) -> Option<TileType> {
        self.occupant().map(|o| o.tile_type())
    }

    /// True iff the cell is empty or holds anything other than an obstacle.
    pub fn walkable(&self) -> bool {
        self.tile_type().is_none_or(TileType::is_walkable)
    }

    /// Clears per-search state.
    pub fn reset_search_state(&mut self) {
        self.g_cost = 0;
        self.h_cost = 0;
        self.parent = None;
        self.heap_index = None;
    }

    /// Heap ordering: lower F first, ties broken by lower H.
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        self.f_cost()
            .cmp(&other.f_cost())
            .then_with(|| self.h_cost.cmp(&other.h_cost))
    }
}

impl HeapItem for Node {
    fn heap_index(&self) -> Option<usize> {
        self.heap_index
    }

    fn set_heap_index(&mut self, index: Option<usize>) {
        self.heap_index = index;
    }

    fn priority_cmp(&self, other: &Self) -> Ordering {
        Node::priority_cmp(self, other)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("position", &self.position)
            .field("tile_type", &self.tile_type())
            .field("g_cost", &self.g_cost)
            .field("h_cost", &self.h_cost)
            .field("parent", &self.parent)
            .field("heap_index", &self.heap_index)
            .field("movement_penalty", &self.movement_penalty)
            .finish()
    }
}
