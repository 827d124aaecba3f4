use std::fmt;

use lm_core::RingId;

/// Slots per ring.  Handles wrap modulo this.
pub const RING_SLOTS: usize = 64;

/// Position of one slot in one ring.  Moves forward only.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutingHandle {
    pub ring:  RingId,
    pub index: u8,
}

impl RoutingHandle {
    #[inline]
    pub const fn new(ring: RingId, index: u8) -> Self {
        Self { ring, index: index % RING_SLOTS as u8 }
    }

    #[inline]
    pub const fn next(self) -> Self {
        Self::new(self.ring, self.index.wrapping_add(1))
    }

    /// Used by backward ring views only.  Component handles never move back.
    #[inline]
    pub(crate) const fn prev(self) -> Self {
        Self::new(self.ring, self.index.wrapping_add(RING_SLOTS as u8 - 1))
    }

    /// Slots from `self` forward to `other` in the same ring.
    #[inline]
    pub fn distance_to(self, other: RoutingHandle) -> usize {
        debug_assert_eq!(self.ring, other.ring);
        (other.index as usize + RING_SLOTS - self.index as usize) % RING_SLOTS
    }
}

impl fmt::Display for RoutingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.ring, self.index)
    }
}
