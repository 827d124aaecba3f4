//! Plain data row types written by trace backends.

use lm_vehicle::{ComponentKind, TrainStatus};

/// One component's state at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentTraceRow {
    pub tick:         u64,
    pub train:        u16,
    pub component:    u16,
    pub kind:         ComponentKind,
    pub x:            i32,
    pub y:            i32,
    pub z:            i32,
    pub sub_position: u16,
    /// `MotionFlags` bits of the component's most recent advance.
    pub flags:        u8,
    /// Wreck state: the component was destroyed in a crash.
    pub destroyed:    bool,
    pub status:       TrainStatus,
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:    u64,
    pub moved:   u64,
    pub stalled: u64,
    pub crashed: u64,
}
