//! Benchmark harness: trace, barrier, workload generation, reporting, and the
//! run orchestration tying them together.

pub mod barrier;
pub mod reporter;
pub mod trace;
pub mod workload;

use std::{io::Write, sync::Arc, thread};

use log::info;
use thread_priority::{ThreadBuilderExt, ThreadPriority};

use crate::{
    config::BenchConfig,
    harness::{
        barrier::CompletionBitmask,
        trace::{Event, EventTrace},
        workload::ThreadSpawner,
    },
    utils::export::export_timeline_csv,
};

/// Run one benchmark: observer first, then the workers, then the report.
///
/// The observer is a dedicated task with the highest effective precedence
/// under every policy, so it never delays worker execution and reports
/// promptly once the barrier opens. Returns the ordered timeline after the
/// report block has been written to `out`; halting the process afterwards is
/// the caller's job. Any setup failure is terminal for the run.
pub fn run_benchmark(
    cfg: &BenchConfig,
    out: Box<dyn Write + Send>,
) -> Result<Vec<Event>, String> {
    let trace = Arc::new(EventTrace::with_capacity(cfg.trace_capacity));
    let barrier = Arc::new(CompletionBitmask::new(cfg.workers)?);

    info!(
        "benchmark start: policy={} workers={} trace_capacity={}",
        cfg.policy.name(),
        cfg.workers,
        cfg.trace_capacity
    );

    let observer = {
        let trace = trace.clone();
        let barrier = barrier.clone();
        let mut out = out;
        thread::Builder::new()
            .name("timeline_reporter".into())
            .spawn_with_priority(ThreadPriority::Max, move |_| {
                reporter::run_reporter(&trace, &barrier, &mut *out)
            })
            .map_err(|e| format!("could not create reporter task: {e}"))?
    };

    let spawner = ThreadSpawner {
        pin_core: cfg.pin_core,
    };
    let workers = workload::spawn_workers(
        cfg.descriptors(),
        cfg.work.clone(),
        &trace,
        &barrier,
        &spawner,
    )?;

    let events = observer
        .join()
        .map_err(|_| "reporter task panicked".to_string())??;
    workers.join_all();

    if let Some(path) = &cfg.csv_path {
        export_timeline_csv(&events, path)?;
    }

    Ok(events)
}
