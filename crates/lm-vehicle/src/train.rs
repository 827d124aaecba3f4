//! Logical trains: the head record a chain of components shares.

use lm_core::{CompanyId, ComponentId, RingId, RoadKind, Speed16, Speed32, TransportMode};
use smallvec::SmallVec;

// ── Component kinds ───────────────────────────────────────────────────────────

/// Role of one component within its train.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentKind {
    /// Plans, reserves and claims lanes.
    Lead,
    Bogie,
    Body,
    /// Frees what the train has passed.
    Tail,
}

impl ComponentKind {
    /// Bogies and bodies are physical: they collide and can be destroyed.
    #[inline]
    pub fn is_structural(self) -> bool {
        matches!(self, ComponentKind::Bogie | ComponentKind::Body)
    }
}

// ── Status / control ──────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrainStatus {
    #[default]
    Running,
    /// No route ahead; waits for more cells.
    Stuck,
    /// Terminal.
    Crashed,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlMode {
    #[default]
    Automatic,
    /// Direct player control.  `notch` is the power setting, negative for
    /// braking.
    Manual { notch: i8 },
}

impl ControlMode {
    #[inline]
    pub fn is_manual(self) -> bool {
        matches!(self, ControlMode::Manual { .. })
    }
}

/// Lane bits the train last committed to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneBits {
    pub overtaking:    bool,
    pub changing_lane: bool,
}

// ── Train ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Train {
    pub mode:                 TransportMode,
    pub road_kind:            RoadKind,
    pub owner:                CompanyId,
    pub ring:                 RingId,
    /// Lead first, tail last.
    pub components:           SmallVec<[ComponentId; 8]>,
    pub status:               TrainStatus,
    pub speed:                Speed32,
    pub target_speed:         Speed16,
    pub max_speed:            Speed16,
    pub rack_rail_max_speed:  Speed16,
    pub faster_around_curves: bool,
    /// Track or road object the train runs on, for curve and road limits.
    pub network_object:       Option<u8>,
    pub control:              ControlMode,
    pub command_stop:         bool,
    pub broken_down:          bool,
    /// Distance the lead actually covered in the last advance.
    pub lookahead_distance:   i32,
    pub lane:                 LaneBits,
}

impl Train {
    #[inline]
    pub fn lead(&self) -> ComponentId {
        self.components.first().copied().unwrap_or(ComponentId::INVALID)
    }

    #[inline]
    pub fn tail(&self) -> ComponentId {
        self.components.last().copied().unwrap_or(ComponentId::INVALID)
    }

    #[inline]
    pub fn is_crashed(&self) -> bool {
        self.status == TrainStatus::Crashed
    }

    /// Command stop, or manual control with the brake notch at `stop_notch`
    /// or below.
    pub fn is_forced_stop(&self, stop_notch: i8) -> bool {
        self.command_stop || matches!(self.control, ControlMode::Manual { notch } if notch <= stop_notch)
    }
}
