//! In-memory tile layout: placed pieces, tile features, lane claims, and
//! terrain.  Implements every trait in [`network`][crate::network].

#[cfg(not(feature = "fx-hash"))]
use std::collections::HashMap;

#[cfg(feature = "fx-hash")]
use rustc_hash::FxHashMap as HashMap;

use lm_core::{PieceId, Pos3, TilePos, TransportMode};
use smallvec::SmallVec;

use crate::geometry::GeometryTables;
use crate::network::{ConnectionGraph, Connections, Occupancy, OccupancyResult, Surface, Terrain};
use crate::piece::{Direction, Heading, PieceDescriptor, PieceKey};
use crate::{TrackError, TrackResult};

#[derive(Copy, Clone, Debug)]
struct Entry {
    key:     PieceKey,
    heading: Heading,
}

#[derive(Copy, Clone, Debug, Default)]
struct TileFeatures {
    level_crossing:  bool,
    crossing_closed: bool,
    station:         bool,
}

/// One physical lane.  Both traversal directions of a piece share the key;
/// `side` says which half of the carriageway is meant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct LaneKey {
    tile:     TilePos,
    id:       PieceId,
    rotation: u8,
    side:     bool,
}

impl LaneKey {
    fn of(pos: Pos3, d: PieceDescriptor) -> Self {
        Self {
            tile:     pos.tile(),
            id:       d.key.id,
            rotation: d.key.direction.rotation(),
            side:     d.overtaking ^ d.key.direction.is_reversed(),
        }
    }
}

type EntryMap = HashMap<(TilePos, i32), SmallVec<[Entry; 4]>>;

#[derive(Debug, Default)]
pub struct TileLayout {
    rail:      EntryMap,
    road:      EntryMap,
    features:  HashMap<TilePos, TileFeatures>,
    lanes:     HashMap<LaneKey, u16>,
    surfaces:  HashMap<TilePos, Surface>,
    obstacles: HashMap<TilePos, SmallVec<[(i32, i32); 2]>>,
}

impl TileLayout {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries_mut(&mut self, mode: TransportMode) -> &mut EntryMap {
        match mode {
            TransportMode::Rail => &mut self.rail,
            TransportMode::Road => &mut self.road,
        }
    }

    /// Place piece `id` on `tile` with its low end at height `z`.  Both
    /// traversal directions become reachable: forward from `(tile, z)` and
    /// reversed from the far end's height.
    pub fn place_piece(
        &mut self,
        geometry: &GeometryTables,
        mode:     TransportMode,
        tile:     TilePos,
        z:        i32,
        id:       PieceId,
        rotation: u8,
    ) -> TrackResult<()> {
        let table = geometry.table(mode);
        let forward = PieceKey::new(id, Direction::new(rotation, false));
        let reversed = forward.reversed();
        let (Some(exit), Some(fwd_heading), Some(rev_heading)) = (
            table.exit(forward),
            table.entry_heading(forward),
            table.entry_heading(reversed),
        ) else {
            return Err(TrackError::UnknownPiece(forward));
        };

        let entries = self.entries_mut(mode);
        entries
            .entry((tile, z))
            .or_default()
            .push(Entry { key: forward, heading: fwd_heading });
        entries
            .entry((tile, z + exit.delta.z))
            .or_default()
            .push(Entry { key: reversed, heading: rev_heading });
        Ok(())
    }

    pub fn set_level_crossing(&mut self, tile: TilePos, present: bool) {
        self.features.entry(tile).or_default().level_crossing = present;
    }

    pub fn set_station(&mut self, tile: TilePos, present: bool) {
        self.features.entry(tile).or_default().station = present;
    }

    pub fn set_surface(&mut self, tile: TilePos, surface: Surface) {
        self.surfaces.insert(tile, surface);
    }

    /// Solid volume on `tile` covering heights `lo..hi`.
    pub fn add_obstacle(&mut self, tile: TilePos, lo: i32, hi: i32) {
        self.obstacles.entry(tile).or_default().push((lo, hi));
    }

    /// Vehicles currently holding the descriptor's lane.
    pub fn lane_claims(&self, pos: Pos3, descriptor: PieceDescriptor) -> u16 {
        self.lanes.get(&LaneKey::of(pos, descriptor)).copied().unwrap_or(0)
    }

    pub fn is_crossing_closed(&self, tile: TilePos) -> bool {
        self.features.get(&tile).is_some_and(|f| f.crossing_closed)
    }

    fn features(&self, tile: TilePos) -> TileFeatures {
        self.features.get(&tile).copied().unwrap_or_default()
    }
}

impl ConnectionGraph for TileLayout {
    fn connections(&self, mode: TransportMode, pos: Pos3, heading: Heading) -> Connections {
        let entries = match mode {
            TransportMode::Rail => &self.rail,
            TransportMode::Road => &self.road,
        };
        let tile = pos.tile();
        let keys = entries
            .get(&(tile, pos.z))
            .map(|list| list.iter().filter(|e| e.heading == heading).map(|e| e.key).collect())
            .unwrap_or_default();
        Connections { keys, has_level_crossing: self.features(tile).level_crossing }
    }
}

impl Occupancy for TileLayout {
    fn occupancy(&self, mode: TransportMode, pos: Pos3, descriptor: PieceDescriptor) -> OccupancyResult {
        let features = self.features(pos.tile());
        let lane_occupied = mode.is_road() && self.lane_claims(pos, descriptor) > 0;
        OccupancyResult {
            lane_occupied,
            has_level_crossing: features.level_crossing,
            crossing_closed:    features.level_crossing && features.crossing_closed,
            has_station:        features.station,
        }
    }

    fn claim_lane(&mut self, pos: Pos3, descriptor: PieceDescriptor) {
        *self.lanes.entry(LaneKey::of(pos, descriptor)).or_insert(0) += 1;
    }

    fn release_lane(&mut self, pos: Pos3, descriptor: PieceDescriptor) {
        let key = LaneKey::of(pos, descriptor);
        if let Some(count) = self.lanes.get_mut(&key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.lanes.remove(&key);
            }
        }
    }

    fn set_crossing_closed(&mut self, tile: TilePos, closed: bool) {
        let features = self.features.entry(tile).or_default();
        if features.level_crossing {
            features.crossing_closed = closed;
        }
    }
}

impl Terrain for TileLayout {
    fn surface(&self, tile: TilePos) -> Surface {
        self.surfaces.get(&tile).copied().unwrap_or_default()
    }

    fn is_solid(&self, pos: Pos3) -> bool {
        self.obstacles
            .get(&pos.tile())
            .is_some_and(|spans| spans.iter().any(|&(lo, hi)| (lo..hi).contains(&pos.z)))
    }
}
