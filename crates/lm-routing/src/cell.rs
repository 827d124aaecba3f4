//! `RoutingCell` and its 16-bit packed form.
//!
//! Internal logic only ever sees the struct.  [`RoutingSlot::pack`] and
//! [`RoutingSlot::unpack`] exist for the save-record boundary.
//!
//! ```text
//!  15 14 13 12 11..9  8   7   6..3  2..0
//!   0  X  R  B  bid   C   O   id    dir      X crossing, R rack rail,
//!                                            B bridge, C changing lane,
//!                                            O overtaking
//! ```

use lm_core::{BridgeId, PieceId};
use lm_track::{Direction, PieceDescriptor, PieceKey};

use crate::{RoutingError, RoutingResult};

const UNALLOCATED_WORD: u16 = 0xFFFE;
const FREE_WORD:        u16 = 0xFFFF;

const OVERTAKING:     u16 = 1 << 7;
const CHANGING_LANE:  u16 = 1 << 8;
const BRIDGE_SHIFT:   u16 = 9;
const BRIDGE_PRESENT: u16 = 1 << 12;
const RACK_RAIL:      u16 = 1 << 13;
const LEVEL_CROSSING: u16 = 1 << 14;

/// One reserved upcoming piece.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutingCell {
    pub key:            PieceKey,
    pub overtaking:     bool,
    pub changing_lane:  bool,
    /// Bridge under this piece; ids above 7 do not survive packing.
    pub bridge:         Option<BridgeId>,
    pub rack_rail:      bool,
    pub level_crossing: bool,
}

impl RoutingCell {
    pub const fn new(key: PieceKey) -> Self {
        Self {
            key,
            overtaking:     false,
            changing_lane:  false,
            bridge:         None,
            rack_rail:      false,
            level_crossing: false,
        }
    }

    pub fn on_bridge(mut self, bridge: BridgeId) -> Self {
        debug_assert!(bridge.0 < 8, "bridge id {bridge} does not fit the packed field");
        self.bridge = Some(bridge);
        self
    }

    pub fn with_rack_rail(mut self) -> Self {
        self.rack_rail = true;
        self
    }

    pub fn with_level_crossing(mut self) -> Self {
        self.level_crossing = true;
        self
    }

    /// The descriptor a vehicle adopts on entering this cell.
    #[inline]
    pub fn descriptor(self) -> PieceDescriptor {
        PieceDescriptor {
            key:           self.key,
            overtaking:    self.overtaking,
            changing_lane: self.changing_lane,
        }
    }

    /// Replace both lane bits.
    #[inline]
    pub fn set_lane_bits(&mut self, overtaking: bool, changing_lane: bool) {
        self.overtaking = overtaking;
        self.changing_lane = changing_lane;
    }

    fn pack(self) -> u16 {
        let mut word = self.key.basic_bits();
        if self.overtaking {
            word |= OVERTAKING;
        }
        if self.changing_lane {
            word |= CHANGING_LANE;
        }
        if let Some(bridge) = self.bridge {
            word |= BRIDGE_PRESENT | ((u16::from(bridge.0) & 7) << BRIDGE_SHIFT);
        }
        if self.rack_rail {
            word |= RACK_RAIL;
        }
        if self.level_crossing {
            word |= LEVEL_CROSSING;
        }
        word
    }

    fn unpack(word: u16) -> Self {
        let key = PieceKey::new(
            PieceId(((word >> 3) & 0xF) as u8),
            Direction::from_bits((word & 7) as u8),
        );
        Self {
            key,
            overtaking:     word & OVERTAKING != 0,
            changing_lane:  word & CHANGING_LANE != 0,
            bridge:         (word & BRIDGE_PRESENT != 0)
                .then(|| BridgeId(((word >> BRIDGE_SHIFT) & 7) as u8)),
            rack_rail:      word & RACK_RAIL != 0,
            level_crossing: word & LEVEL_CROSSING != 0,
        }
    }
}

/// Contents of one ring slot.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoutingSlot {
    Cell(RoutingCell),
    /// Reserved for the train, but the allocator has not filled it yet.
    Unallocated,
    #[default]
    Free,
}

impl RoutingSlot {
    #[inline]
    pub fn cell(self) -> Option<RoutingCell> {
        match self {
            RoutingSlot::Cell(c) => Some(c),
            _ => None,
        }
    }

    pub fn pack(self) -> u16 {
        match self {
            RoutingSlot::Cell(c) => c.pack(),
            RoutingSlot::Unallocated => UNALLOCATED_WORD,
            RoutingSlot::Free => FREE_WORD,
        }
    }

    pub fn unpack(word: u16) -> RoutingResult<Self> {
        match word {
            UNALLOCATED_WORD => Ok(RoutingSlot::Unallocated),
            FREE_WORD => Ok(RoutingSlot::Free),
            w if w & 0x8000 != 0 => Err(RoutingError::BadWord(w)),
            w => Ok(RoutingSlot::Cell(RoutingCell::unpack(w))),
        }
    }
}
