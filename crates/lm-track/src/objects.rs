//! Network object definitions the speed resolver reads limits from.

use lm_core::{BridgeId, RoadKind, Speed16};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackObject {
    /// Nominal speed through the tightest curve, scaled by each piece's
    /// curve fraction.
    pub curve_speed: Speed16,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadObject {
    pub max_speed: Speed16,
    pub kind:      RoadKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BridgeObject {
    /// `None` means the bridge imposes no limit.
    pub max_speed: Option<Speed16>,
}

/// Loaded track, road and bridge objects, indexed by object id.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectCatalog {
    pub tracks:  Vec<TrackObject>,
    pub roads:   Vec<RoadObject>,
    pub bridges: Vec<BridgeObject>,
}

impl ObjectCatalog {
    #[inline]
    pub fn track(&self, id: u8) -> Option<&TrackObject> {
        self.tracks.get(id as usize)
    }

    #[inline]
    pub fn road(&self, id: u8) -> Option<&RoadObject> {
        self.roads.get(id as usize)
    }

    /// Speed cap of a bridge; unknown bridges impose none.
    #[inline]
    pub fn bridge_speed(&self, id: BridgeId) -> Option<Speed16> {
        self.bridges.get(id.index()).and_then(|b| b.max_speed)
    }
}
