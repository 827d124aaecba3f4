//! `lm-core` — foundational types for the `loco_motion` vehicle engine.
//!
//! Every other `lm-*` crate depends on this one.  It has no `lm-*`
//! dependencies and only `rand` and `thiserror` externally (plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `TrainId`, `ComponentId`, `RingId`, `PieceId`, `BridgeId`, `CompanyId` |
//! | [`pos`]         | `Pos3`, `TilePos`, `TileRect`, tile constants              |
//! | [`speed`]       | `Speed16` (mph), `Speed32` (16.16 mph)                     |
//! | [`flags`]       | `MotionFlags` bitset returned by every advance             |
//! | [`config`]      | `MotionConfig`, `SimConfig`                                |
//! | [`time`]        | `Tick`                                                     |
//! | [`rng`]         | `SimRng` (deterministic, seeded)                           |
//! | [`transport`]   | `TransportMode`, `RoadKind`                                |
//! | [`error`]       | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod flags;
pub mod ids;
pub mod pos;
pub mod rng;
pub mod speed;
pub mod time;
pub mod transport;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{MotionConfig, SimConfig, QUANTUM};
pub use error::{CoreError, CoreResult};
pub use flags::MotionFlags;
pub use ids::{BridgeId, CompanyId, ComponentId, PieceId, RingId, TrainId};
pub use pos::{Pos3, TilePos, TileRect, TILE_SIZE};
pub use rng::SimRng;
pub use speed::{Speed16, Speed32};
pub use time::Tick;
pub use transport::{RoadKind, TransportMode};
