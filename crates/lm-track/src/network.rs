//! Interfaces the motion core consumes from the world.
//!
//! The engine never owns map state.  It asks three narrow questions through
//! these traits: which pieces continue from here, who occupies this lane, and
//! what the ground looks like under a wreck.  [`TileLayout`][crate::TileLayout]
//! is the in-memory implementation used by the simulation and the tests.

use lm_core::{Pos3, TilePos, TransportMode};
use smallvec::SmallVec;

use crate::piece::{Heading, PieceDescriptor, PieceKey};

/// Pieces reachable from a (position, heading) pair.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Connections {
    pub keys:               SmallVec<[PieceKey; 4]>,
    pub has_level_crossing: bool,
}

impl Connections {
    /// Whether `key` is among the reachable pieces, compared on id and
    /// direction only.
    #[inline]
    pub fn reaches(&self, key: PieceKey) -> bool {
        self.keys.iter().any(|k| k.basic_bits() == key.basic_bits())
    }
}

/// Flags returned by an occupancy query.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct OccupancyResult {
    pub lane_occupied:      bool,
    pub has_level_crossing: bool,
    pub crossing_closed:    bool,
    pub has_station:        bool,
}

impl OccupancyResult {
    /// Occupied lane or closed crossing.
    #[inline]
    pub fn is_blocked(self) -> bool {
        self.lane_occupied || self.crossing_closed
    }
}

/// Physical connectivity.
pub trait ConnectionGraph {
    /// Pieces of `mode` whose entry lies at `pos` (tile corner plus entry
    /// height) and whose entry heading is `heading`.
    fn connections(&self, mode: TransportMode, pos: Pos3, heading: Heading) -> Connections;
}

/// Lane and crossing occupancy.
pub trait Occupancy {
    fn occupancy(&self, mode: TransportMode, pos: Pos3, descriptor: PieceDescriptor) -> OccupancyResult;

    /// Mark the descriptor's lane as held by one more vehicle.
    fn claim_lane(&mut self, pos: Pos3, descriptor: PieceDescriptor);

    /// Undo one [`claim_lane`][Self::claim_lane].
    fn release_lane(&mut self, pos: Pos3, descriptor: PieceDescriptor);

    fn set_crossing_closed(&mut self, tile: TilePos, closed: bool);
}

/// Ground and water height of one tile.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Surface {
    pub land:  i32,
    pub water: Option<i32>,
}

/// Static world geometry, as seen by a wreck in flight.
pub trait Terrain {
    fn surface(&self, tile: TilePos) -> Surface;

    /// Whether `pos` lies inside a solid structure (building, embankment).
    fn is_solid(&self, pos: Pos3) -> bool;
}

/// Everything the motion core needs from the map, in one bound.
pub trait TrackNetwork: ConnectionGraph + Occupancy + Terrain {}

impl<T: ConnectionGraph + Occupancy + Terrain> TrackNetwork for T {}
