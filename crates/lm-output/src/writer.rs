//! The `TraceWriter` trait implemented by trace backends.

use crate::{ComponentTraceRow, OutputResult, TickSummaryRow};

/// Sink for trace rows.
///
/// Errors are stored by the observer and retrieved with
/// [`TraceObserver::take_error`][crate::TraceObserver::take_error].
pub trait TraceWriter {
    /// Write every component's row for one snapshot tick.
    fn write_trace(&mut self, rows: &[ComponentTraceRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
