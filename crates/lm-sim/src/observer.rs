//! Simulation observer trait for progress reporting and data collection.

use lm_core::{Tick, TrainId};
use lm_vehicle::VehicleStore;

/// Per-tick counts handed to [`SimObserver::on_tick_end`].
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct TickStats {
    /// Trains whose lead covered a positive distance.
    pub moved:   usize,
    /// Trains that advanced but reported a stall flag.
    pub stalled: usize,
    /// Trains in the crashed state at the end of the tick.
    pub crashed: usize,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — crash counter
///
/// ```rust,ignore
/// struct CrashCounter(usize);
///
/// impl SimObserver for CrashCounter {
///     fn on_crash(&mut self, _tick: Tick, _train: TrainId, _other: Option<TrainId>) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any train moves.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once every train has been processed.
    fn on_tick_end(&mut self, _tick: Tick, _stats: &TickStats) {}

    /// `train` ran into a component of `other`.  `other` is `None` when the
    /// hit component belongs to `train` itself.
    fn on_crash(&mut self, _tick: Tick, _train: TrainId, _other: Option<TrainId>) {}

    /// `train` found no route ahead and now waits for the feeder.
    fn on_stuck(&mut self, _tick: Tick, _train: TrainId) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks) with read-only access to every component.
    fn on_snapshot(&mut self, _tick: Tick, _vehicles: &VehicleStore) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
