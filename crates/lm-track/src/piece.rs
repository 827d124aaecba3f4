//! Piece keys and the descriptor a vehicle carries for its current piece.

use std::fmt;

use lm_core::PieceId;

/// Number of distinct directions per piece (4 rotations × forward/reversed).
pub const DIRECTIONS: usize = 8;

/// Piece ids must fit the 4-bit field of a packed routing cell.
pub const MAX_PIECE_ID: u8 = 15;

// ── Heading ───────────────────────────────────────────────────────────────────

/// Cardinal travel heading: 0 = +x, 1 = +y, 2 = -x, 3 = -y.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Heading(u8);

impl Heading {
    #[inline]
    pub const fn new(h: u8) -> Self {
        Heading(h & 3)
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        Heading((self.0 + 2) & 3)
    }

    #[inline]
    pub const fn turned(self, quarter_turns: u8) -> Self {
        Heading((self.0 + quarter_turns) & 3)
    }

    /// Unit step in world x/y.
    #[inline]
    pub const fn step(self) -> (i32, i32) {
        match self.0 {
            0 => (1, 0),
            1 => (0, 1),
            2 => (-1, 0),
            _ => (0, -1),
        }
    }
}

// ── Direction ─────────────────────────────────────────────────────────────────

/// Rotation (bits 0–1) plus a reversed-traversal bit (bit 2).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Direction(u8);

impl Direction {
    #[inline]
    pub const fn new(rotation: u8, reversed: bool) -> Self {
        Direction((rotation & 3) | ((reversed as u8) << 2))
    }

    /// Rebuild from the low three bits of a packed value.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Direction(bits & 7)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn rotation(self) -> u8 {
        self.0 & 3
    }

    #[inline]
    pub const fn is_reversed(self) -> bool {
        self.0 & 4 != 0
    }

    /// Same piece, traversed the other way.
    #[inline]
    pub const fn reversed(self) -> Self {
        Direction(self.0 ^ 4)
    }
}

// ── PieceKey ──────────────────────────────────────────────────────────────────

/// Arena key of one (piece, direction) sample sequence.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PieceKey {
    pub id:        PieceId,
    pub direction: Direction,
}

impl PieceKey {
    #[inline]
    pub const fn new(id: PieceId, direction: Direction) -> Self {
        Self { id, direction }
    }

    /// Forward traversal of `id` at `rotation`.
    #[inline]
    pub const fn forward(id: u8, rotation: u8) -> Self {
        Self::new(PieceId(id), Direction::new(rotation, false))
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.id.0 as usize * DIRECTIONS + self.direction.0 as usize
    }

    #[inline]
    pub const fn reversed(self) -> Self {
        Self::new(self.id, self.direction.reversed())
    }

    /// 7-bit `(id << 3) | direction`, the part of a routing cell that must
    /// match the connection graph.
    #[inline]
    pub const fn basic_bits(self) -> u16 {
        ((self.id.0 as u16) << 3) | self.direction.0 as u16
    }
}

impl fmt::Display for PieceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "piece {} rot {}{}",
            self.id.0,
            self.direction.rotation(),
            if self.direction.is_reversed() { " rev" } else { "" }
        )
    }
}

// ── Lane / PieceDescriptor ────────────────────────────────────────────────────

/// Which lane geometry a road vehicle follows on a piece.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Lane {
    #[default]
    Own,
    Opposite,
    /// Pulling out into the opposite lane.
    ToOpposite,
    /// Pulling back in from the opposite lane.
    ToOwn,
}

impl Lane {
    pub const ALL: [Lane; 4] = [Lane::Own, Lane::Opposite, Lane::ToOpposite, Lane::ToOwn];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Lane::Own => 0,
            Lane::Opposite => 1,
            Lane::ToOpposite => 2,
            Lane::ToOwn => 3,
        }
    }

    /// Signed lateral offset from the centreline at the start and end of the
    /// piece, positive to the right of travel.
    #[inline]
    pub const fn offsets(self) -> (i32, i32) {
        match self {
            Lane::Own => (8, 8),
            Lane::Opposite => (-8, -8),
            Lane::ToOpposite => (8, -8),
            Lane::ToOwn => (-8, 8),
        }
    }
}

/// A vehicle's current piece: the key plus the road lane bits.
///
/// Rail vehicles always carry both lane bits clear.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PieceDescriptor {
    pub key:           PieceKey,
    pub overtaking:    bool,
    pub changing_lane: bool,
}

impl PieceDescriptor {
    #[inline]
    pub const fn new(key: PieceKey) -> Self {
        Self { key, overtaking: false, changing_lane: false }
    }

    #[inline]
    pub const fn lane(self) -> Lane {
        match (self.changing_lane, self.overtaking) {
            (false, false) => Lane::Own,
            (false, true) => Lane::Opposite,
            (true, false) => Lane::ToOpposite,
            (true, true) => Lane::ToOwn,
        }
    }

    /// The same piece seen from the other lane (overtaking bit flipped).
    #[inline]
    pub const fn other_lane(self) -> Self {
        Self { overtaking: !self.overtaking, ..self }
    }

    /// Already overtaking or changing lane.
    #[inline]
    pub const fn is_lane_manoeuvre(self) -> bool {
        self.overtaking || self.changing_lane
    }
}
