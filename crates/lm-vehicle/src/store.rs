//! `VehicleStore`: Structure-of-Arrays component state plus the train table.
//!
//! Every per-component `Vec` has one element per component and is indexed by
//! `ComponentId::index()`:
//!
//! ```ignore
//! let here = vehicles.motion[c.index()].position;
//! ```
//!
//! Positions must be written through [`VehicleStore::set_position`] so the
//! per-tile index stays in sync.

#[cfg(not(feature = "fx-hash"))]
use std::collections::HashMap;

#[cfg(feature = "fx-hash")]
use rustc_hash::FxHashMap as HashMap;

use lm_core::{ComponentId, Pos3, TilePos, TrainId};
use smallvec::SmallVec;

use crate::state::{MotionRecord, MotionState, WreckState};
use crate::train::{ComponentKind, Train};
use crate::{VehicleError, VehicleResult};

#[derive(Default)]
pub struct VehicleStore {
    /// Indexed by `TrainId`.  Processing order is ascending index.
    pub trains: Vec<Train>,

    // ── Per-component SoA ─────────────────────────────────────────────────
    pub kind:        Vec<ComponentKind>,
    pub train_of:    Vec<TrainId>,
    /// Position within the owning train, lead = 0.
    pub chain_index: Vec<u8>,
    pub motion:      Vec<MotionState>,
    pub wreck:       Vec<WreckState>,

    /// Components by the tile they stand on, in insertion order.
    tiles: HashMap<TilePos, SmallVec<[ComponentId; 4]>>,
}

impl VehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn component_count(&self) -> usize {
        self.kind.len()
    }

    /// All trains in ascending id order.
    pub fn train_ids(&self) -> impl Iterator<Item = TrainId> + '_ {
        (0..self.trains.len() as u16).map(TrainId)
    }

    #[inline]
    pub fn train(&self, id: TrainId) -> Option<&Train> {
        self.trains.get(id.index())
    }

    #[inline]
    pub fn train_mut(&mut self, id: TrainId) -> Option<&mut Train> {
        self.trains.get_mut(id.index())
    }

    /// Move a component and update the tile index.
    pub fn set_position(&mut self, c: ComponentId, pos: Pos3) {
        let old = self.motion[c.index()].position.tile();
        let new = pos.tile();
        self.motion[c.index()].position = pos;
        if old != new {
            self.unindex(c, old);
            self.tiles.entry(new).or_default().push(c);
        }
    }

    /// Components standing on `tile`.
    pub fn components_on(&self, tile: TilePos) -> &[ComponentId] {
        self.tiles.get(&tile).map_or(&[], |v| v.as_slice())
    }

    /// Components on the 3×3 tiles around `tile`, centre tile first.
    pub fn components_near(&self, tile: TilePos) -> impl Iterator<Item = ComponentId> + '_ {
        tile.neighbourhood().flat_map(move |t| self.components_on(t).iter().copied())
    }

    pub fn record(&self, c: ComponentId) -> MotionRecord {
        MotionRecord::capture(&self.motion[c.index()])
    }

    /// Overwrite a component's motion state from a persisted record.
    pub fn restore(&mut self, c: ComponentId, record: &MotionRecord) {
        let mut state = record.restore();
        let pos = state.position;
        // Keep the indexed position until `set_position` moves it.
        state.position = self.motion[c.index()].position;
        self.motion[c.index()] = state;
        self.set_position(c, pos);
    }

    // ── Construction, used by TrainBuilder ────────────────────────────────

    pub(crate) fn push_train(&mut self, train: Train) -> VehicleResult<TrainId> {
        let id = TrainId::try_from(self.trains.len()).map_err(|_| VehicleError::TooManyComponents)?;
        if !id.is_valid() {
            return Err(VehicleError::TooManyComponents);
        }
        self.trains.push(train);
        Ok(id)
    }

    pub(crate) fn push_component(
        &mut self,
        kind:        ComponentKind,
        train:       TrainId,
        chain_index: u8,
        motion:      MotionState,
    ) -> VehicleResult<ComponentId> {
        let id = ComponentId::try_from(self.kind.len()).map_err(|_| VehicleError::TooManyComponents)?;
        if !id.is_valid() {
            return Err(VehicleError::TooManyComponents);
        }
        self.kind.push(kind);
        self.train_of.push(train);
        self.chain_index.push(chain_index);
        self.motion.push(motion);
        self.wreck.push(WreckState::default());
        self.tiles.entry(motion.position.tile()).or_default().push(id);
        Ok(id)
    }

    fn unindex(&mut self, c: ComponentId, tile: TilePos) {
        if let Some(list) = self.tiles.get_mut(&tile) {
            list.retain(|&mut x| x != c);
            if list.is_empty() {
                self.tiles.remove(&tile);
            }
        }
    }
}
