//! Per-component motion and wreck state.

use lm_core::{MotionFlags, PieceId, Pos3, RingId};
use lm_routing::RoutingHandle;
use lm_track::{Direction, PieceDescriptor, PieceKey, Pitch};

use crate::{VehicleError, VehicleResult};

// ── MotionState ───────────────────────────────────────────────────────────────

/// Where one component is and how far it has left to go this tick.
///
/// `position == origin + samples(descriptor)[sub_position].offset` holds
/// after every advance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct MotionState {
    /// World position of the current sample.
    pub position:     Pos3,
    /// Current piece origin: tile corner at the piece's entry height.
    pub origin:       Pos3,
    pub descriptor:   PieceDescriptor,
    pub sub_position: u16,
    /// Ring slot of the current piece.
    pub handle:       RoutingHandle,
    /// Leftover distance, always below one quantum between advances.
    pub remainder:    i32,
    pub yaw:          u8,
    pub pitch:        Pitch,
    /// Flags of the most recent advance.
    pub flags:        MotionFlags,
}

// ── WreckState ────────────────────────────────────────────────────────────────

/// Bit 31 of the shared velocity word marks a destroyed component.
pub const DESTROYED: u32 = 1 << 31;

/// Ballistic state of a structural component after a crash.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct WreckState {
    /// Velocity magnitude in the low 31 bits, [`DESTROYED`] tag in bit 31.
    pub velocity: u32,
    /// Sub-unit x/y travel carried between ballistic ticks.
    pub frac_x:   u16,
    pub frac_y:   u16,
    /// Ticks spent falling; the drop per tick grows with it.
    pub fall:     u8,
    pub exploded: bool,
    pub splashed: bool,
}

impl WreckState {
    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.velocity & DESTROYED != 0
    }

    #[inline]
    pub fn magnitude(&self) -> u32 {
        self.velocity & !DESTROYED
    }

    /// Tag as destroyed, keeping an eighth of `velocity` as residual speed.
    pub fn destroy(&mut self, velocity: u32) {
        self.velocity = ((velocity & !DESTROYED) >> 3) | DESTROYED;
        self.frac_x = 0;
        self.frac_y = 0;
        self.fall = 0;
    }

    /// Replace the magnitude, keeping the tag.
    #[inline]
    pub fn set_magnitude(&mut self, magnitude: u32) {
        self.velocity = (self.velocity & DESTROYED) | (magnitude & !DESTROYED);
    }
}

// ── MotionRecord ──────────────────────────────────────────────────────────────

/// The persisted subset of [`MotionState`], in a fixed little-endian layout.
///
/// ```text
///  0..12  position  (3 × i32)      26..28  sub_position (u16)
/// 12..24  origin    (3 × i32)      28..30  ring         (u16)
/// 24..26  piece     (u16, packed)  30      slot         (u8)
///                                  31      flags        (u8)
///                                  32..36  remainder    (i32)
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionRecord {
    pub position:     Pos3,
    pub origin:       Pos3,
    pub piece:        u16,
    pub sub_position: u16,
    pub ring:         u16,
    pub slot:         u8,
    pub flags:        u8,
    pub remainder:    i32,
}

fn pack_descriptor(d: PieceDescriptor) -> u16 {
    d.key.basic_bits() | (u16::from(d.overtaking) << 7) | (u16::from(d.changing_lane) << 8)
}

fn unpack_descriptor(word: u16) -> PieceDescriptor {
    PieceDescriptor {
        key:           PieceKey::new(PieceId(((word >> 3) & 0xF) as u8), Direction::from_bits((word & 7) as u8)),
        overtaking:    word & (1 << 7) != 0,
        changing_lane: word & (1 << 8) != 0,
    }
}

impl MotionRecord {
    pub const LEN: usize = 36;

    pub fn capture(state: &MotionState) -> Self {
        Self {
            position:     state.position,
            origin:       state.origin,
            piece:        pack_descriptor(state.descriptor),
            sub_position: state.sub_position,
            ring:         state.handle.ring.0,
            slot:         state.handle.index,
            flags:        state.flags.bits(),
            remainder:    state.remainder,
        }
    }

    /// Rebuild a motion state.  Yaw and pitch are not persisted; they are
    /// re-read from the geometry tables on the next step.
    pub fn restore(&self) -> MotionState {
        MotionState {
            position:     self.position,
            origin:       self.origin,
            descriptor:   unpack_descriptor(self.piece),
            sub_position: self.sub_position,
            handle:       RoutingHandle::new(RingId(self.ring), self.slot),
            remainder:    self.remainder,
            yaw:          0,
            pitch:        Pitch::Flat,
            flags:        MotionFlags::from_bits_truncate(self.flags),
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        let words = [
            self.position.x, self.position.y, self.position.z,
            self.origin.x, self.origin.y, self.origin.z,
        ];
        for (i, w) in words.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&w.to_le_bytes());
        }
        out[24..26].copy_from_slice(&self.piece.to_le_bytes());
        out[26..28].copy_from_slice(&self.sub_position.to_le_bytes());
        out[28..30].copy_from_slice(&self.ring.to_le_bytes());
        out[30] = self.slot;
        out[31] = self.flags;
        out[32..36].copy_from_slice(&self.remainder.to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> VehicleResult<Self> {
        if bytes.len() != Self::LEN {
            return Err(VehicleError::BadRecord(bytes.len()));
        }
        let i32_at = |at: usize| i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        let u16_at = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);
        Ok(Self {
            position:     Pos3::new(i32_at(0), i32_at(4), i32_at(8)),
            origin:       Pos3::new(i32_at(12), i32_at(16), i32_at(20)),
            piece:        u16_at(24),
            sub_position: u16_at(26),
            ring:         u16_at(28),
            slot:         bytes[30],
            flags:        bytes[31],
            remainder:    i32_at(32),
        })
    }
}
