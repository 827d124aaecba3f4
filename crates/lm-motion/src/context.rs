//! The world a motion call runs against.

use lm_core::{MotionConfig, Pos3, SimRng, TransportMode};
use lm_routing::RoutingStore;
use lm_track::{GeometryTables, ObjectCatalog, PieceTable, TrackNetwork};
use lm_vehicle::{MotionState, VehicleStore};

use crate::sink::EffectSink;

/// Everything one `advance` may read or write, borrowed for the call.
///
/// Immutable tables sit beside the mutable stores so helpers can take
/// `&MotionContext` for queries and `&mut MotionContext` for commits without
/// splitting the borrow by hand.
pub struct MotionContext<'a, N: TrackNetwork, S: EffectSink> {
    pub geometry: &'a GeometryTables,
    pub objects:  &'a ObjectCatalog,
    pub config:   &'a MotionConfig,
    pub routing:  &'a mut RoutingStore,
    pub vehicles: &'a mut VehicleStore,
    pub network:  &'a mut N,
    pub rng:      &'a mut SimRng,
    pub sink:     &'a mut S,
}

impl<N: TrackNetwork, S: EffectSink> MotionContext<'_, N, S> {
    #[inline]
    pub fn table(&self, mode: TransportMode) -> &PieceTable {
        self.geometry.table(mode)
    }

    /// Origin of the piece after `state`'s current one.
    #[inline]
    pub fn next_origin(&self, mode: TransportMode, state: &MotionState) -> Option<Pos3> {
        self.table(mode).exit(state.descriptor.key).map(|e| state.origin + e.delta)
    }
}
