//! `TraceObserver<W>` — bridges `SimObserver` to a `TraceWriter`.

use lm_core::Tick;
use lm_sim::{SimObserver, TickStats};
use lm_vehicle::VehicleStore;

use crate::row::{ComponentTraceRow, TickSummaryRow};
use crate::writer::TraceWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes component traces and tick summaries to any
/// [`TraceWriter`].
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct TraceObserver<W: TraceWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: TraceWriter> TraceObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

/// Rows for every component in `vehicles`, in component id order.
pub fn trace_rows(tick: Tick, vehicles: &VehicleStore) -> Vec<ComponentTraceRow> {
    (0..vehicles.component_count())
        .map(|i| {
            let motion = &vehicles.motion[i];
            let train = vehicles.train_of[i];
            ComponentTraceRow {
                tick:         tick.0,
                train:        train.0,
                component:    i as u16,
                kind:         vehicles.kind[i],
                x:            motion.position.x,
                y:            motion.position.y,
                z:            motion.position.z,
                sub_position: motion.sub_position,
                flags:        motion.flags.bits(),
                destroyed:    vehicles.wreck[i].is_destroyed(),
                status:       vehicles.train(train).map(|t| t.status).unwrap_or_default(),
            }
        })
        .collect()
}

impl<W: TraceWriter> SimObserver for TraceObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
        let row = TickSummaryRow {
            tick:    tick.0,
            moved:   stats.moved as u64,
            stalled: stats.stalled as u64,
            crashed: stats.crashed as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, vehicles: &VehicleStore) {
        let rows = trace_rows(tick, vehicles);
        if !rows.is_empty() {
            let result = self.writer.write_trace(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
