//! CSV export of the ordered timeline, for offline tooling that prefers a
//! structured file over the printed report block.

use std::{fs::File, io::BufWriter, path::Path};

use csv::Writer;
use log::info;
use serde::Serialize;

use crate::harness::trace::{Event, NS_PER_MS};

#[derive(Debug, Serialize)]
struct TimelineRow {
    slot: u64,
    ts_ns: u64,
    ts_ms: u64,
    event: &'static str,
    task: u32,
}

/// Write one row per event, in the order given (callers pass the ordered
/// timeline, so the file matches the printed block line for line).
pub fn export_timeline_csv(events: &[Event], path: &Path) -> Result<(), String> {
    let file = File::create(path)
        .map_err(|e| format!("failed to create csv file {}: {e}", path.display()))?;
    let mut wtr = Writer::from_writer(BufWriter::new(file));

    for event in events {
        wtr.serialize(TimelineRow {
            slot: event.slot,
            ts_ns: event.timestamp,
            ts_ms: event.timestamp / NS_PER_MS,
            event: event.kind.label(),
            task: event.worker_id,
        })
        .map_err(|e| format!("failed to write csv row: {e}"))?;
    }

    wtr.flush()
        .map_err(|e| format!("failed to flush csv file: {e}"))?;
    info!("timeline exported to {}", path.display());
    Ok(())
}
