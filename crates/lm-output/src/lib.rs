//! `lm-output` — trace writers for the loco_motion engine.
//!
//! | Backend | Files created                                  |
//! |---------|------------------------------------------------|
//! | CSV     | `component_trace.csv`, `tick_summaries.csv`    |
//!
//! The trace holds one row per component per snapshot tick: position,
//! sub-position, last motion flags and the owning train's status.  Two runs
//! of the same seed and layout produce byte-identical traces, so comparing
//! them is the replay check.
//!
//! Writers implement [`TraceWriter`] and are driven by [`TraceObserver`],
//! which implements `lm_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lm_output::{CsvWriter, TraceObserver};
//!
//! let writer = CsvWriter::new(Path::new("./trace"))?;
//! let mut obs = TraceObserver::new(writer);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("trace error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::{TraceObserver, trace_rows};
pub use row::{ComponentTraceRow, TickSummaryRow};
pub use writer::TraceWriter;
