//! The flag set every advance returns.
//!
//! The hot path never returns `Result`: all outcomes, including "no route"
//! and "crashed", are bits in a [`MotionFlags`].

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionFlags(u8);

impl MotionFlags {
    pub const EMPTY: MotionFlags = MotionFlags(0);
    /// A transition had to wait (occupied lane, closed crossing); the
    /// remainder is handed back for the next tick.
    pub const LOOKAHEAD_EXHAUSTED: MotionFlags = MotionFlags(1 << 0);
    /// The next routing cell is unallocated or not physically reachable.
    pub const NO_ROUTE_FOUND: MotionFlags = MotionFlags(1 << 1);
    /// A rail bogie touched another train.
    pub const CRASHED: MotionFlags = MotionFlags(1 << 2);
    /// A follower caught up with the lead's routing handle.
    pub const BLOCKED_BY_LEAD: MotionFlags = MotionFlags(1 << 3);
    /// The next rail piece carries a level crossing.
    pub const APPROACHING_GRADE_CROSSING: MotionFlags = MotionFlags(1 << 4);

    const NAMES: [(MotionFlags, &'static str); 5] = [
        (Self::LOOKAHEAD_EXHAUSTED, "LOOKAHEAD_EXHAUSTED"),
        (Self::NO_ROUTE_FOUND, "NO_ROUTE_FOUND"),
        (Self::CRASHED, "CRASHED"),
        (Self::BLOCKED_BY_LEAD, "BLOCKED_BY_LEAD"),
        (Self::APPROACHING_GRADE_CROSSING, "APPROACHING_GRADE_CROSSING"),
    ];

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Rebuild from persisted bits, dropping unknown ones.
    #[inline]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        MotionFlags(bits & 0x1F)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, other: MotionFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn intersects(self, other: MotionFlags) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn insert(&mut self, other: MotionFlags) {
        self.0 |= other.0;
    }

    /// Any flag that means the transition did not go through.
    #[inline]
    pub const fn is_stalled(self) -> bool {
        self.intersects(MotionFlags(
            Self::LOOKAHEAD_EXHAUSTED.0 | Self::NO_ROUTE_FOUND.0 | Self::BLOCKED_BY_LEAD.0,
        ))
    }
}

impl BitOr for MotionFlags {
    type Output = MotionFlags;
    #[inline]
    fn bitor(self, rhs: MotionFlags) -> MotionFlags {
        MotionFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for MotionFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: MotionFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for MotionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}
