//! CSV trace backend.
//!
//! Creates two files in the configured output directory:
//! - `component_trace.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;
use lm_vehicle::{ComponentKind, TrainStatus};

use crate::writer::TraceWriter;
use crate::{ComponentTraceRow, OutputResult, TickSummaryRow};

pub const TRACE_HEADER: [&str; 11] = [
    "tick", "train", "component", "kind", "x", "y", "z", "sub_position", "flags", "destroyed", "status",
];

pub const SUMMARY_HEADER: [&str; 4] = ["tick", "moved", "stalled", "crashed"];

/// Writes a trace to two CSV files.
pub struct CsvWriter {
    trace:     Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut trace = Writer::from_path(dir.join("component_trace.csv"))?;
        trace.write_record(TRACE_HEADER)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(SUMMARY_HEADER)?;

        Ok(Self { trace, summaries, finished: false })
    }
}

fn kind_label(kind: ComponentKind) -> &'static str {
    match kind {
        ComponentKind::Lead  => "lead",
        ComponentKind::Bogie => "bogie",
        ComponentKind::Body  => "body",
        ComponentKind::Tail  => "tail",
    }
}

fn status_label(status: TrainStatus) -> &'static str {
    match status {
        TrainStatus::Running => "running",
        TrainStatus::Stuck   => "stuck",
        TrainStatus::Crashed => "crashed",
    }
}

impl TraceWriter for CsvWriter {
    fn write_trace(&mut self, rows: &[ComponentTraceRow]) -> OutputResult<()> {
        for row in rows {
            self.trace.write_record(&[
                row.tick.to_string(),
                row.train.to_string(),
                row.component.to_string(),
                kind_label(row.kind).to_owned(),
                row.x.to_string(),
                row.y.to_string(),
                row.z.to_string(),
                row.sub_position.to_string(),
                row.flags.to_string(),
                (row.destroyed as u8).to_string(),
                status_label(row.status).to_owned(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.moved.to_string(),
            row.stalled.to_string(),
            row.crashed.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.trace.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
