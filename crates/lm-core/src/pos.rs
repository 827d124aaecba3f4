//! World and tile coordinates.
//!
//! World units are 1/32 of a tile horizontally.  Heights use the same unit;
//! a full slope piece climbs 16 of them.  Tiles are addressed by the world
//! coordinate of their minimum corner divided by [`TILE_SIZE`].

use std::ops::{Add, Sub};

/// Edge length of one tile in world units.
pub const TILE_SIZE: i32 = 32;

/// Order in which a 3×3 tile neighbourhood is visited.  Starting at the
/// centre and spiralling outward keeps "first match wins" scans stable.
const MOORE_ORDER: [(i32, i32); 9] = [
    (0, 0),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

// ── Pos3 ──────────────────────────────────────────────────────────────────────

/// A point in world units.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pos3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Pos3 {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The tile this point lies in.
    #[inline]
    pub fn tile(self) -> TilePos {
        TilePos::containing(self.x, self.y)
    }

    /// `|dx| + |dy|`, ignoring height.
    #[inline]
    pub fn manhattan_xy(self, other: Pos3) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Same x/y, different height.
    #[inline]
    pub fn with_z(self, z: i32) -> Self {
        Self { z, ..self }
    }
}

impl Add for Pos3 {
    type Output = Pos3;
    #[inline]
    fn add(self, rhs: Pos3) -> Pos3 {
        Pos3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Pos3 {
    type Output = Pos3;
    #[inline]
    fn sub(self, rhs: Pos3) -> Pos3 {
        Pos3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

// ── TilePos ───────────────────────────────────────────────────────────────────

/// Tile coordinates (world coordinate / 32, rounded toward negative infinity).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn containing(world_x: i32, world_y: i32) -> Self {
        Self::new(world_x.div_euclid(TILE_SIZE), world_y.div_euclid(TILE_SIZE))
    }

    /// World position of this tile's minimum corner at height `z`.
    #[inline]
    pub fn origin(self, z: i32) -> Pos3 {
        Pos3::new(self.x * TILE_SIZE, self.y * TILE_SIZE, z)
    }

    /// The 3×3 neighbourhood around this tile, centre first.
    pub fn neighbourhood(self) -> impl Iterator<Item = TilePos> {
        MOORE_ORDER
            .iter()
            .map(move |&(dx, dy)| TilePos::new(self.x + dx, self.y + dy))
    }
}

// ── TileRect ──────────────────────────────────────────────────────────────────

/// Inclusive rectangle of tiles, used for viewport invalidation.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct TileRect {
    pub min: TilePos,
    pub max: TilePos,
}

impl TileRect {
    /// Smallest rectangle covering the tiles of both points.
    pub fn spanning(a: Pos3, b: Pos3) -> Self {
        let (ta, tb) = (a.tile(), b.tile());
        Self {
            min: TilePos::new(ta.x.min(tb.x), ta.y.min(tb.y)),
            max: TilePos::new(ta.x.max(tb.x), ta.y.max(tb.y)),
        }
    }

    pub fn union(self, other: TileRect) -> Self {
        Self {
            min: TilePos::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: TilePos::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    #[inline]
    pub fn contains(self, tile: TilePos) -> bool {
        (self.min.x..=self.max.x).contains(&tile.x) && (self.min.y..=self.max.y).contains(&tile.y)
    }
}
