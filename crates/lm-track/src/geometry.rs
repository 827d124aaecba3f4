//! Sub-tile interpolation tables.
//!
//! Every (piece, direction) and, on roads, every lane variant owns one
//! immutable sample sequence in a flat arena.  Sequences are generated once
//! from a [`PieceDef`] catalog with integer-only arithmetic, so the tables are
//! identical on every platform, then validated before the tables are handed
//! out.
//!
//! # Local frame
//!
//! Pieces are generated in a local frame where `u` runs forward from the
//! entry edge (0..32) and `v` runs to the right of travel (centreline 16),
//! then rotated into tile coordinates.  Consecutive samples differ by at
//! most one unit per axis; the motion accumulator relies on this when it
//! looks up step distances.

use lm_core::{PieceId, Pos3, TILE_SIZE, TransportMode};

use crate::piece::{DIRECTIONS, Direction, Heading, Lane, MAX_PIECE_ID, PieceDescriptor, PieceKey};
use crate::{TrackError, TrackResult};

/// `round(4096 × sin(k·π/32))` for `k` in `0..=16`.
const QUARTER_SINE: [i32; 17] = [
    0, 401, 799, 1189, 1567, 1931, 2276, 2598, 2896, 3166, 3406, 3612, 3784, 3920, 4017, 4076,
    4096,
];

/// Anchors per generated piece.
const ANCHORS: i32 = 16;

const LANE_VARIANTS: usize = 4;

// ── Curve speed fractions ─────────────────────────────────────────────────────

pub const FRACTION_STRAIGHT:        u16 = 0xFFFF;
pub const FRACTION_VERY_SMALL_CURVE: u16 = 0x0CCD;
pub const FRACTION_SMALL_CURVE:     u16 = 0x199A;
pub const FRACTION_CURVE:           u16 = 0x2666;

/// Ids of the standard catalog, shared by rail and road.
pub mod pieces {
    pub const STRAIGHT:    u8 = 0;
    pub const LEFT_CURVE:  u8 = 1;
    pub const RIGHT_CURVE: u8 = 2;
    pub const SLOPE_UP:    u8 = 3;
    pub const SLOPE_DOWN:  u8 = 4;
}

/// Unit direction vector for a 64-step yaw, scaled by 4096.
pub fn yaw_vector(yaw: u8) -> (i32, i32) {
    let yaw = yaw & 63;
    let k = (yaw & 15) as usize;
    let (mut x, mut y) = (QUARTER_SINE[16 - k], QUARTER_SINE[k]);
    for _ in 0..(yaw >> 4) {
        (x, y) = (-y, x);
    }
    (x, y)
}

// ── Records ───────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pitch {
    #[default]
    Flat,
    Up,
    Down,
}

impl Pitch {
    #[inline]
    pub const fn reversed(self) -> Self {
        match self {
            Pitch::Flat => Pitch::Flat,
            Pitch::Up => Pitch::Down,
            Pitch::Down => Pitch::Up,
        }
    }
}

/// One interpolation sample, relative to the piece origin (tile corner at
/// the piece's entry height).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Sample {
    pub offset: Pos3,
    /// 64 steps per full turn; 0 faces +x, 16 faces +y.
    pub yaw:    u8,
    pub pitch:  Pitch,
}

/// Where the next piece starts, relative to this piece's origin.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PieceExit {
    pub delta:   Pos3,
    pub heading: Heading,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Shape {
    Straight,
    LeftCurve,
    RightCurve,
    SlopeUp,
    SlopeDown,
}

/// Catalog entry from which all directions and lanes of a piece are built.
#[derive(Copy, Clone, Debug)]
pub struct PieceDef {
    pub id:                   PieceId,
    pub shape:                Shape,
    pub curve_speed_fraction: u16,
}

impl PieceDef {
    pub const fn new(id: u8, shape: Shape, curve_speed_fraction: u16) -> Self {
        Self { id: PieceId(id), shape, curve_speed_fraction }
    }
}

pub fn standard_rail_catalog() -> Vec<PieceDef> {
    vec![
        PieceDef::new(pieces::STRAIGHT, Shape::Straight, FRACTION_STRAIGHT),
        PieceDef::new(pieces::LEFT_CURVE, Shape::LeftCurve, FRACTION_VERY_SMALL_CURVE),
        PieceDef::new(pieces::RIGHT_CURVE, Shape::RightCurve, FRACTION_VERY_SMALL_CURVE),
        PieceDef::new(pieces::SLOPE_UP, Shape::SlopeUp, FRACTION_STRAIGHT),
        PieceDef::new(pieces::SLOPE_DOWN, Shape::SlopeDown, FRACTION_STRAIGHT),
    ]
}

pub fn standard_road_catalog() -> Vec<PieceDef> {
    vec![
        PieceDef::new(pieces::STRAIGHT, Shape::Straight, FRACTION_STRAIGHT),
        PieceDef::new(pieces::LEFT_CURVE, Shape::LeftCurve, FRACTION_SMALL_CURVE),
        PieceDef::new(pieces::RIGHT_CURVE, Shape::RightCurve, FRACTION_SMALL_CURVE),
        PieceDef::new(pieces::SLOPE_UP, Shape::SlopeUp, FRACTION_STRAIGHT),
        PieceDef::new(pieces::SLOPE_DOWN, Shape::SlopeDown, FRACTION_STRAIGHT),
    ]
}

// ── Generation ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone)]
struct Anchor {
    u:   i32,
    v:   i32,
    z:   i32,
    yaw: u8,
}

/// A generated piece in tile coordinates, before it is copied into the arena.
struct Generated {
    samples: Vec<Sample>,
    exit:    PieceExit,
    entry:   Heading,
}

#[inline]
fn scale(r: i32, sine: i32) -> i32 {
    (r * sine + 2048) >> 12
}

#[inline]
fn lerp(a: i32, b: i32, k: i32) -> i32 {
    a + (b - a) * k / ANCHORS
}

fn anchors(shape: Shape, (l0, l1): (i32, i32)) -> (Vec<Anchor>, Heading) {
    let mut out = Vec::with_capacity(ANCHORS as usize + 2);
    let exit_heading = match shape {
        Shape::RightCurve => Heading::new(1),
        Shape::LeftCurve => Heading::new(3),
        _ => Heading::new(0),
    };
    for k in 0..=ANCHORS {
        let lateral = lerp(l0, l1, k);
        let ku = k as usize;
        let anchor = match shape {
            Shape::Straight | Shape::SlopeUp | Shape::SlopeDown => {
                let z = match shape {
                    Shape::SlopeUp => k,
                    Shape::SlopeDown => -k,
                    _ => 0,
                };
                Anchor { u: 2 * k, v: 16 + lateral, z, yaw: 0 }
            }
            Shape::RightCurve => {
                let r = 16 - lateral;
                Anchor {
                    u:   scale(r, QUARTER_SINE[ku]),
                    v:   32 - scale(r, QUARTER_SINE[16 - ku]),
                    z:   0,
                    yaw: k as u8,
                }
            }
            Shape::LeftCurve => {
                let r = 16 + lateral;
                Anchor {
                    u:   scale(r, QUARTER_SINE[ku]),
                    v:   scale(r, QUARTER_SINE[16 - ku]),
                    z:   0,
                    yaw: ((64 - k) & 63) as u8,
                }
            }
        };
        out.push(anchor);
    }
    // The final anchor is the exit point and must sit across the tile edge.
    if let Some(&last) = out.last() {
        if (0..TILE_SIZE).contains(&last.u) && (0..TILE_SIZE).contains(&last.v) {
            let (du, dv) = exit_heading.step();
            out.push(Anchor { u: last.u + du, v: last.v + dv, ..last });
        }
    }
    (out, exit_heading)
}

/// Local (u, v) to tile-relative (x, y) for one of four rotations.
#[inline]
fn rotate(u: i32, v: i32, rotation: u8) -> (i32, i32) {
    let max = TILE_SIZE - 1;
    match rotation & 3 {
        0 => (u, v),
        1 => (max - v, u),
        2 => (max - u, max - v),
        _ => (v, max - u),
    }
}

#[inline]
fn tile_delta(x: i32, y: i32, z: i32) -> Pos3 {
    Pos3::new(x.div_euclid(TILE_SIZE) * TILE_SIZE, y.div_euclid(TILE_SIZE) * TILE_SIZE, z)
}

fn pitch_of(shape: Shape) -> Pitch {
    match shape {
        Shape::SlopeUp => Pitch::Up,
        Shape::SlopeDown => Pitch::Down,
        _ => Pitch::Flat,
    }
}

fn generate_forward(shape: Shape, offsets: (i32, i32), rotation: u8) -> Generated {
    let (anchors, local_exit) = anchors(shape, offsets);
    let pitch = pitch_of(shape);
    let yaw_base = rotation * 16;

    let mut samples = Vec::new();
    for pair in anchors.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (du, dv, dz) = (b.u - a.u, b.v - a.v, b.z - a.z);
        let steps = du.abs().max(dv.abs()).max(dz.abs());
        for s in 0..steps {
            let (x, y) = rotate(a.u + du * s / steps, a.v + dv * s / steps, rotation);
            samples.push(Sample {
                offset: Pos3::new(x, y, a.z + dz * s / steps),
                yaw:    (a.yaw + yaw_base) & 63,
                pitch,
            });
        }
    }

    let exit_anchor = anchors[anchors.len() - 1];
    let (ex, ey) = rotate(exit_anchor.u, exit_anchor.v, rotation);
    Generated {
        samples,
        exit: PieceExit {
            delta:   tile_delta(ex, ey, exit_anchor.z),
            heading: local_exit.turned(rotation),
        },
        entry: Heading::new(rotation),
    }
}

/// Reversed traversal of the physical piece generated by `forward`.
fn reverse(forward: Generated, rotation: u8, first: (i32, i32)) -> Generated {
    let rise = forward.exit.delta.z;
    let samples = forward
        .samples
        .iter()
        .rev()
        .map(|s| Sample {
            offset: s.offset.with_z(s.offset.z - rise),
            yaw:    (s.yaw + 32) & 63,
            pitch:  s.pitch.reversed(),
        })
        .collect();
    // Leave through the forward entry edge, one unit behind the first sample.
    let (bx, by) = rotate(first.0 - 1, first.1, rotation);
    Generated {
        samples,
        exit: PieceExit {
            delta:   tile_delta(bx, by, -rise),
            heading: Heading::new(rotation).opposite(),
        },
        entry: forward.exit.heading.opposite(),
    }
}

fn generate(mode: TransportMode, def: &PieceDef, direction: Direction, lane: Lane) -> Generated {
    let rotation = direction.rotation();
    if !direction.is_reversed() {
        let offsets = match mode {
            TransportMode::Rail => (0, 0),
            TransportMode::Road => lane.offsets(),
        };
        return generate_forward(def.shape, offsets, rotation);
    }
    // A reversed traveller's own lane is the forward traveller's opposite one.
    let physical = match lane {
        Lane::Own => Lane::Opposite,
        Lane::Opposite => Lane::Own,
        other => other,
    };
    let offsets = match mode {
        TransportMode::Rail => (0, 0),
        TransportMode::Road => physical.offsets(),
    };
    let (first, _) = anchors(def.shape, offsets);
    let entry = (first[0].u, first[0].v);
    reverse(generate_forward(def.shape, offsets, rotation), rotation, entry)
}

// ── PieceTable ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
struct Record {
    start: u32,
    len:   u32,
}

/// All sequences for one transport mode.
#[derive(Debug)]
pub struct PieceTable {
    mode:      TransportMode,
    samples:   Vec<Sample>,
    records:   Vec<Option<Record>>,
    exits:     Vec<Option<PieceExit>>,
    entries:   Vec<Option<Heading>>,
    fractions: Vec<u16>,
}

impl PieceTable {
    fn build(mode: TransportMode, catalog: &[PieceDef]) -> TrackResult<Self> {
        let slots = (MAX_PIECE_ID as usize + 1) * DIRECTIONS;
        let mut table = PieceTable {
            mode,
            samples:   Vec::new(),
            records:   vec![None; slots * LANE_VARIANTS],
            exits:     vec![None; slots],
            entries:   vec![None; slots],
            fractions: vec![FRACTION_STRAIGHT; MAX_PIECE_ID as usize + 1],
        };
        let lanes: &[Lane] = match mode {
            TransportMode::Rail => &[Lane::Own],
            TransportMode::Road => &Lane::ALL,
        };

        for def in catalog {
            if def.id.0 > MAX_PIECE_ID {
                return Err(TrackError::PieceIdOutOfRange(def.id));
            }
            if table.entries[PieceKey::forward(def.id.0, 0).index()].is_some() {
                return Err(TrackError::DuplicatePiece(def.id));
            }
            table.fractions[def.id.0 as usize] = def.curve_speed_fraction;

            for bits in 0..DIRECTIONS as u8 {
                let key = PieceKey::new(def.id, Direction::from_bits(bits));
                for &lane in lanes {
                    let generated = generate(mode, def, key.direction, lane);
                    validate(key, &generated.samples)?;
                    table.records[key.index() * LANE_VARIANTS + lane.index()] = Some(Record {
                        start: table.samples.len() as u32,
                        len:   generated.samples.len() as u32,
                    });
                    table.samples.extend_from_slice(&generated.samples);
                    // Exits and entries are lane-independent.
                    table.exits[key.index()] = Some(generated.exit);
                    table.entries[key.index()] = Some(generated.entry);
                }
            }
        }
        Ok(table)
    }

    #[inline]
    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    #[inline]
    pub fn contains(&self, key: PieceKey) -> bool {
        self.entries.get(key.index()).is_some_and(Option::is_some)
    }

    /// Sample sequence for the descriptor's key and lane.  Rail tables ignore
    /// the lane bits.
    pub fn samples(&self, descriptor: PieceDescriptor) -> &[Sample] {
        let lane = match self.mode {
            TransportMode::Rail => 0,
            TransportMode::Road => descriptor.lane().index(),
        };
        let record = self
            .records
            .get(descriptor.key.index() * LANE_VARIANTS + lane)
            .copied()
            .flatten();
        debug_assert!(record.is_some(), "no geometry for {}", descriptor.key);
        match record {
            Some(r) => &self.samples[r.start as usize..(r.start + r.len) as usize],
            None => &[],
        }
    }

    pub fn exit(&self, key: PieceKey) -> Option<PieceExit> {
        self.exits.get(key.index()).copied().flatten()
    }

    pub fn entry_heading(&self, key: PieceKey) -> Option<Heading> {
        self.entries.get(key.index()).copied().flatten()
    }

    /// Curve speed fraction of a piece; unknown ids count as straight.
    pub fn curve_speed_fraction(&self, id: PieceId) -> u16 {
        self.fractions.get(id.index()).copied().unwrap_or(FRACTION_STRAIGHT)
    }

    /// Every key with geometry, in arena order.
    pub fn keys(&self) -> impl Iterator<Item = PieceKey> + '_ {
        (0..self.entries.len())
            .filter(|&i| self.entries[i].is_some())
            .map(|i| PieceKey::new(PieceId((i / DIRECTIONS) as u8), Direction::from_bits(i as u8)))
    }
}

fn validate(key: PieceKey, samples: &[Sample]) -> TrackResult<()> {
    if samples.is_empty() {
        return Err(TrackError::Geometry { key, reason: "empty sample sequence".into() });
    }
    for s in samples {
        if !(0..TILE_SIZE).contains(&s.offset.x) || !(0..TILE_SIZE).contains(&s.offset.y) {
            return Err(TrackError::Geometry {
                key,
                reason: format!("sample {:?} leaves the tile", s.offset),
            });
        }
    }
    for pair in samples.windows(2) {
        let d = pair[1].offset - pair[0].offset;
        if d.x.abs() > 1 || d.y.abs() > 1 || d.z.abs() > 1 {
            return Err(TrackError::Geometry {
                key,
                reason: format!("step {d:?} is not a unit step"),
            });
        }
    }
    Ok(())
}

// ── GeometryTables ────────────────────────────────────────────────────────────

/// Rail and road tables together.  Built once, then shared read-only.
#[derive(Debug)]
pub struct GeometryTables {
    rail: PieceTable,
    road: PieceTable,
}

impl GeometryTables {
    /// Tables for the standard rail and road catalogs.
    pub fn standard() -> TrackResult<Self> {
        Self::from_catalog(&standard_rail_catalog(), &standard_road_catalog())
    }

    pub fn from_catalog(rail: &[PieceDef], road: &[PieceDef]) -> TrackResult<Self> {
        Ok(Self {
            rail: PieceTable::build(TransportMode::Rail, rail)?,
            road: PieceTable::build(TransportMode::Road, road)?,
        })
    }

    #[inline]
    pub fn table(&self, mode: TransportMode) -> &PieceTable {
        match mode {
            TransportMode::Rail => &self.rail,
            TransportMode::Road => &self.road,
        }
    }

    #[inline]
    pub fn samples(&self, mode: TransportMode, descriptor: PieceDescriptor) -> &[Sample] {
        self.table(mode).samples(descriptor)
    }
}
