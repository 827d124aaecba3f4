//! `lm-sim` — tick loop orchestrator for the loco_motion engine.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   for train in ascending TrainId order:
//!     ① Crashed   — run the ballistic wreck tick and move on.
//!     ② Feed      — top up the ring when few cells remain ahead, and wake a
//!                   stuck train once cells arrive.
//!     ③ Target    — MotionEngine::update_target_speed.
//!     ④ Traction  — accelerate or brake the 16.16 speed toward the target.
//!     ⑤ Advance   — MotionEngine::advance with speed.distance_per_tick().
//!     ⑥ React     — CRASHED → crash both trains; NO_ROUTE_FOUND → Stuck;
//!                   any stall flag zeroes the speed.
//! ```
//!
//! Ring writes and lane claims made by one train are visible to every train
//! processed after it in the same tick.
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `fx-hash` | `FxHashMap` for [`CycleFeeder`]'s per-train cursors.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use lm_sim::{CycleFeeder, NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(config, geometry, layout)
//!     .train(TrainBuilder::new(TransportMode::Rail).route([straight; 4]), origin)
//!     .feeder(CycleFeeder::new(vec![straight], 8))
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod feeder;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use feeder::{CycleFeeder, MIN_CELLS_AHEAD, NoFeeder, RouteFeeder};
pub use observer::{NoopObserver, SimObserver, TickStats};
pub use sim::Sim;
