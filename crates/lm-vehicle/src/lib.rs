//! `lm-vehicle` — vehicle components, logical trains, and their storage.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`state`]   | `MotionState`, `WreckState`, persisted `MotionRecord`           |
//! | [`train`]   | `Train`, `ComponentKind`, `TrainStatus`, `ControlMode`          |
//! | [`store`]   | `VehicleStore` (SoA component arrays + per-tile index)          |
//! | [`builder`] | `TrainBuilder` (places a train onto a fresh routing ring)       |
//! | [`error`]   | `VehicleError`, `VehicleResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                    |
//! |-----------|-----------------------------------------------------------|
//! | `fx-hash` | Uses `FxHashMap` for the per-tile component index.        |
//! | `serde`   | Derives `Serialize`/`Deserialize` on records and enums.   |

pub mod builder;
pub mod error;
pub mod state;
pub mod store;
pub mod train;


pub use builder::{DEFAULT_SPACING, TrainBuilder};
pub use error::{VehicleError, VehicleResult};
pub use state::{DESTROYED, MotionRecord, MotionState, WreckState};
pub use store::VehicleStore;
pub use train::{ComponentKind, ControlMode, LaneBits, Train, TrainStatus};
