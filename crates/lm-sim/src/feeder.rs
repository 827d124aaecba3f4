//! Route feeders: the allocator side of the routing rings.
//!
//! The motion core only consumes cells.  Between advances the simulation asks
//! a [`RouteFeeder`] to push more cells onto a train's ring whenever fewer than
//! [`MIN_CELLS_AHEAD`] remain in front of the lead, and whenever the train is
//! stuck waiting for a route.

#[cfg(not(feature = "fx-hash"))]
use std::collections::HashMap;

#[cfg(feature = "fx-hash")]
use rustc_hash::FxHashMap as HashMap;

use log::trace;

use lm_core::{RingId, TrainId};
use lm_routing::{RoutingCell, RoutingSlot, RoutingStore};

/// Cells the lead should have reserved ahead of it before the feeder is
/// consulted again.
pub const MIN_CELLS_AHEAD: usize = 4;

pub trait RouteFeeder {
    /// Push cells onto `ring` for `train`.  Returns how many were pushed.
    fn feed(&mut self, train: TrainId, ring: RingId, routing: &mut RoutingStore) -> usize;
}

/// Never extends a route.  Trains stop once their initial cells run out.
pub struct NoFeeder;

impl RouteFeeder for NoFeeder {
    fn feed(&mut self, _train: TrainId, _ring: RingId, _routing: &mut RoutingStore) -> usize {
        0
    }
}

/// Repeats a fixed cell pattern, up to `batch` cells per call.
///
/// Each train keeps its own position in the pattern, so a loop of pieces
/// stays in phase with where the train actually is.
pub struct CycleFeeder {
    pattern: Vec<RoutingCell>,
    batch:   usize,
    next:    HashMap<TrainId, usize>,
}

impl CycleFeeder {
    pub fn new(pattern: Vec<RoutingCell>, batch: usize) -> Self {
        Self { pattern, batch, next: HashMap::default() }
    }

    /// Start `train` at `offset` into the pattern instead of at its head.
    pub fn with_offset(mut self, train: TrainId, offset: usize) -> Self {
        self.next.insert(train, offset);
        self
    }
}

impl RouteFeeder for CycleFeeder {
    fn feed(&mut self, train: TrainId, ring: RingId, routing: &mut RoutingStore) -> usize {
        if self.pattern.is_empty() {
            return 0;
        }
        let at = self.next.entry(train).or_insert(0);
        let mut pushed = 0;
        while pushed < self.batch {
            let cell = self.pattern[*at % self.pattern.len()];
            // A full ring just means the train already holds enough route.
            if routing.push(ring, RoutingSlot::Cell(cell)).is_err() {
                break;
            }
            *at += 1;
            pushed += 1;
        }
        trace!("{train}: fed {pushed} cells");
        pushed
    }
}
