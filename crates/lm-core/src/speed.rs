//! Fixed-point speeds.
//!
//! `Speed16` is whole miles per hour.  `Speed32` is 16.16 fixed point in the
//! same unit, so `Speed32(1 << 16)` is one mph.  All resolver arithmetic is
//! done on the raw integers; nothing here touches floating point.

use std::fmt;

/// Whole mph.  `Speed16::MAX` doubles as "no limit".
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Speed16(pub i16);

impl Speed16 {
    pub const ZERO: Speed16 = Speed16(0);
    pub const MAX:  Speed16 = Speed16(i16::MAX);

    #[inline]
    pub const fn mph(n: i16) -> Self {
        Speed16(n)
    }

    /// `self × fraction / 65536` as a 16.16 speed.  `fraction` is a u16
    /// where `0xFFFF` means "almost exactly full speed".
    #[inline]
    pub fn scaled(self, fraction: u16) -> Speed32 {
        Speed32(i32::from(fraction) * i32::from(self.0))
    }

    #[inline]
    pub fn saturating_add(self, rhs: Speed16) -> Self {
        Speed16(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Speed16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mph", self.0)
    }
}

/// 16.16 fixed-point mph.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Speed32(pub i32);

impl Speed32 {
    pub const ZERO: Speed32 = Speed32(0);

    /// Truncate to whole mph.
    #[inline]
    pub fn to_speed16(self) -> Speed16 {
        Speed16((self.0 >> 16) as i16)
    }

    /// World distance covered in one tick at this speed.
    #[inline]
    pub fn distance_per_tick(self) -> i32 {
        self.0 / 2
    }

    /// Inverse of [`distance_per_tick`][Self::distance_per_tick].
    #[inline]
    pub fn from_distance_per_tick(distance: i32) -> Self {
        Speed32(distance.saturating_mul(2))
    }
}

impl From<Speed16> for Speed32 {
    #[inline]
    fn from(s: Speed16) -> Self {
        Speed32(i32::from(s.0) << 16)
    }
}
