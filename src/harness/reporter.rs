//! reporter.rs
//! Deterministic ordering and rendering of the recorded timeline.
//!
//! Slot-reservation order and timestamp order can diverge under multi-core
//! concurrency (a worker can read its timestamp, get preempted, and lose the
//! reservation race). The sort/merge pass here is therefore mandatory, not an
//! optimization: skipping it is a latent correctness bug.

use std::{io::Write, sync::Arc};

use log::info;

use crate::harness::{
    barrier::CompletionBitmask,
    trace::{Event, EventTrace, NS_PER_MS},
};

pub const OUTPUT_START: &str = "---OUTPUT START---";
pub const OUTPUT_END: &str = "----OUTPUT END----";

/// Total order over a drained trace: stable sort by timestamp ascending, ties
/// keep drain (reservation) order. Never ordered by worker id.
pub fn order_events(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by_key(|e| e.timestamp);
    events
}

/// k-way merge for the per-worker-queue trace representation: repeatedly take
/// the unconsumed head with the smallest timestamp, ties broken by lowest
/// queue index. Externally identical to `order_events` over the concatenation
/// of the queues.
pub fn merge_queues(queues: &[Vec<Event>]) -> Vec<Event> {
    let total: usize = queues.iter().map(Vec::len).sum();
    let mut cursors = vec![0usize; queues.len()];
    let mut merged = Vec::with_capacity(total);

    loop {
        let mut earliest: Option<(usize, u64)> = None;
        for (idx, queue) in queues.iter().enumerate() {
            if let Some(event) = queue.get(cursors[idx]) {
                let better = match earliest {
                    Some((_, ts)) => event.timestamp < ts,
                    None => true,
                };
                if better {
                    earliest = Some((idx, event.timestamp));
                }
            }
        }
        match earliest {
            Some((idx, _)) => {
                merged.push(queues[idx][cursors[idx]]);
                cursors[idx] += 1;
            }
            None => break,
        }
    }

    merged
}

/// Emit the canonical report block: one `<ms> ms | <ACTION> task<id>` line per
/// event between the literal output markers.
pub fn render_timeline(events: &[Event], out: &mut dyn Write) -> Result<(), String> {
    writeln!(out, "{OUTPUT_START}").map_err(|e| format!("report write failed: {e}"))?;
    for event in events {
        writeln!(
            out,
            "{} ms | {} task{}",
            event.timestamp / NS_PER_MS,
            event.kind.label(),
            event.worker_id
        )
        .map_err(|e| format!("report write failed: {e}"))?;
    }
    writeln!(out, "{OUTPUT_END}").map_err(|e| format!("report write failed: {e}"))?;
    out.flush().map_err(|e| format!("report flush failed: {e}"))
}

/// Observer body: wait for every worker, drain the trace, order it, print it.
/// Runs at the highest effective precedence so it never delays the workers and
/// reports promptly once the barrier opens. Halting the process afterwards is
/// the caller's job.
pub fn run_reporter(
    trace: &Arc<EventTrace>,
    barrier: &Arc<CompletionBitmask>,
    out: &mut dyn Write,
) -> Result<Vec<Event>, String> {
    barrier.await_all();
    info!(
        "all workers signaled; events recorded={} dropped={}",
        trace.occupancy(),
        trace.dropped()
    );

    let events = order_events(trace.read_all());
    render_timeline(&events, out)?;
    Ok(events)
}
