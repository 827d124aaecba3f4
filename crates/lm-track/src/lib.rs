//! `lm-track` — piece geometry and the world-side interfaces of the motion
//! core.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | [`piece`]    | `Heading`, `Direction`, `PieceKey`, `Lane`, `PieceDescriptor`   |
//! | [`geometry`] | `GeometryTables` arena, `Sample`, `PieceExit`, standard catalog |
//! | [`objects`]  | Track, road and bridge objects (speed limits)                   |
//! | [`network`]  | `ConnectionGraph`, `Occupancy`, `Terrain` traits                |
//! | [`layout`]   | `TileLayout`, an in-memory implementation of all three          |
//! | [`error`]    | `TrackError`, `TrackResult<T>`                                  |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                  |
//! |-----------|---------------------------------------------------------|
//! | `fx-hash` | Uses `FxHashMap` for the layout's tile maps.            |
//! | `serde`   | Adds serde derives to keys, descriptors and objects.    |

pub mod error;
pub mod geometry;
pub mod layout;
pub mod network;
pub mod objects;
pub mod piece;


pub use error::{TrackError, TrackResult};
pub use geometry::{GeometryTables, PieceDef, PieceExit, PieceTable, Pitch, Sample, Shape, pieces, yaw_vector};
pub use layout::TileLayout;
pub use network::{ConnectionGraph, Connections, Occupancy, OccupancyResult, Surface, Terrain, TrackNetwork};
pub use objects::{BridgeObject, ObjectCatalog, RoadObject, TrackObject};
pub use piece::{Direction, Heading, Lane, PieceDescriptor, PieceKey};
