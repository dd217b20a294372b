//! workload.rs
//! Synthetic workload generation: one preemptible worker per descriptor.
//!
//! Each worker consumes a deterministic amount of simulated execution time
//! (a data-independent busy loop, iteration count derived from the configured
//! runtime) and emits its lifecycle into the shared trace:
//! Arrived (collectively, at setup) -> Started -> busy work -> Finished ->
//! barrier signal -> terminate.
//!
//! The scheduler is an external collaborator behind [`TaskSpawner`]; the
//! harness only populates the policy-specific [`SchedulingAttribute`] and
//! never branches on the policy beyond that.

use std::{
    hint::black_box,
    sync::Arc,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use core_affinity::{get_core_ids, set_for_current};
use log::{debug, warn};
use parking_lot::Mutex;
use thread_priority::{ThreadBuilderExt, ThreadPriority, ThreadPriorityValue};

use crate::harness::{
    barrier::CompletionBitmask,
    trace::{EventKind, EventTrace},
};

/// Busy-loop iterations per millisecond of simulated runtime. Calibrated for
/// the reference target; must be retuned per platform.
pub const CYCLES_PER_MS: u64 = 250_000;

/// Policy-specific attribute handed to the task-creation collaborator.
/// One variant per scheduling policy under measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingAttribute {
    /// Fixed-priority policy: a single shared (or per-worker) priority level.
    Priority(u8),
    /// EDF policy: relative deadline, passed straight through to creation.
    Deadline { relative_ms: u32 },
    /// Least-laxity/window policy: WCET budget inside a recurring window.
    Window { wcet_ms: u32, window_ms: u32 },
}

/// Creation-time state for a window-policy worker: remaining execution starts
/// at the WCET and the first local deadline is window start + window length.
#[derive(Debug, Clone, Copy)]
pub struct WindowState {
    pub remaining_ms: u32,
    pub window_start: Instant,
    pub local_deadline: Instant,
}

impl SchedulingAttribute {
    pub fn initial_window_state(&self, now: Instant) -> Option<WindowState> {
        match *self {
            SchedulingAttribute::Window { wcet_ms, window_ms } => Some(WindowState {
                remaining_ms: wcet_ms,
                window_start: now,
                local_deadline: now + Duration::from_millis(u64::from(window_ms)),
            }),
            _ => None,
        }
    }
}

/// Per-worker creation record. Owned by the generator; the opaque task handle
/// lives in [`WorkerSet`] until the worker terminates.
#[derive(Debug, Clone)]
pub struct WorkerDescriptor {
    pub id: u32,
    pub cycle_budget: u64,
    pub attribute: SchedulingAttribute,
    pub window: Option<WindowState>,
}

/// Injectable work function so tests can substitute a fast deterministic
/// stand-in without recalibrating `CYCLES_PER_MS`.
pub type WorkFn = Arc<dyn Fn(u64) + Send + Sync>;

/// Deterministic, data-independent busy computation. The accumulator goes
/// through `black_box` so the loop cannot be optimized away; there is no
/// other observable side effect.
pub fn busy_spin(cycles: u64) {
    let mut acc: u8 = 0;
    for i in 0..cycles {
        acc = black_box(acc.wrapping_add(i as u8));
    }
    black_box(acc);
}

/// Task-creation seam to the external scheduler collaborator.
pub trait TaskSpawner: Send + Sync {
    fn spawn(
        &self,
        desc: &WorkerDescriptor,
        body: Box<dyn FnOnce() + Send>,
    ) -> Result<JoinHandle<()>, String>;
}

/// Host-build spawner: OS threads via `thread_priority`, optionally pinned to
/// one core to model the constrained single-core target on an SMP host.
pub struct ThreadSpawner {
    pub pin_core: Option<usize>,
}

impl ThreadSpawner {
    fn priority_for(attribute: &SchedulingAttribute) -> Result<ThreadPriority, String> {
        match *attribute {
            SchedulingAttribute::Priority(p) => {
                let value = ThreadPriorityValue::try_from(p)
                    .map_err(|e| format!("invalid priority {p}: {e}"))?;
                Ok(ThreadPriority::Crossplatform(value))
            }
            // Deadline-driven attributes are interpreted by the real
            // scheduler collaborator; the host stand-in runs them at max.
            SchedulingAttribute::Deadline { .. } | SchedulingAttribute::Window { .. } => {
                Ok(ThreadPriority::Max)
            }
        }
    }
}

impl TaskSpawner for ThreadSpawner {
    fn spawn(
        &self,
        desc: &WorkerDescriptor,
        body: Box<dyn FnOnce() + Send>,
    ) -> Result<JoinHandle<()>, String> {
        let priority = Self::priority_for(&desc.attribute)?;
        let id = desc.id;
        let core = self.pin_core.and_then(|idx| {
            let cores = get_core_ids().unwrap_or_default();
            cores.get(idx).cloned().or_else(|| cores.first().cloned())
        });

        thread::Builder::new()
            .name(format!("bench_worker_{id}"))
            .spawn_with_priority(priority, move |prio| {
                if prio.is_err() {
                    debug!("worker {id}: requested priority not applied");
                }
                if let Some(core) = core {
                    if !set_for_current(core) {
                        warn!("worker {id}: failed to pin to core {core:?}");
                    }
                }
                body();
            })
            .map_err(|e| format!("could not create worker task {id}: {e}"))
    }
}

/// Live workers plus their descriptors. Handles are join-only; workers
/// terminate on their own once they have signaled the barrier.
pub struct WorkerSet {
    descriptors: Vec<WorkerDescriptor>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerSet {
    pub fn descriptors(&self) -> &[WorkerDescriptor] {
        &self.descriptors
    }

    pub fn join_all(&self) {
        let handles: Vec<_> = self.handles.lock().drain(..).collect();
        for h in handles {
            let _ = h.join();
        }
    }
}

/// Create all workers for a run.
///
/// Arrival is synchronous: every `Arrived` event is recorded collectively
/// before the first worker is created. Creation failure is fatal for the run;
/// workers already created still signal, so the caller can drain them before
/// aborting.
pub fn spawn_workers(
    descriptors: Vec<WorkerDescriptor>,
    work: WorkFn,
    trace: &Arc<EventTrace>,
    barrier: &Arc<CompletionBitmask>,
    spawner: &dyn TaskSpawner,
) -> Result<WorkerSet, String> {
    for desc in &descriptors {
        trace.record(EventKind::Arrived, desc.id);
    }

    let mut handles = Vec::with_capacity(descriptors.len());
    for desc in &descriptors {
        let trace = trace.clone();
        let barrier = barrier.clone();
        let work = work.clone();
        let id = desc.id;
        let cycles = desc.cycle_budget;

        let body = Box::new(move || {
            trace.record(EventKind::Started, id);
            work(cycles);
            trace.record(EventKind::Finished, id);
            barrier.signal(id);
            debug!("worker {id} done");
        });

        handles.push(spawner.spawn(desc, body)?);
    }

    Ok(WorkerSet {
        descriptors,
        handles: Mutex::new(handles),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::reporter::order_events;

    fn descriptor(id: u32, attribute: SchedulingAttribute) -> WorkerDescriptor {
        WorkerDescriptor {
            id,
            cycle_budget: 10_000,
            attribute,
            window: None,
        }
    }

    #[test]
    fn window_state_initializes_from_wcet_and_window() {
        let attr = SchedulingAttribute::Window {
            wcet_ms: 10,
            window_ms: 40,
        };
        let now = Instant::now();
        let state = attr.initial_window_state(now).unwrap();
        assert_eq!(state.remaining_ms, 10);
        assert_eq!(state.window_start, now);
        assert_eq!(state.local_deadline, now + Duration::from_millis(40));

        assert!(
            SchedulingAttribute::Priority(4)
                .initial_window_state(now)
                .is_none()
        );
    }

    #[test]
    fn workers_emit_full_lifecycle_in_order() {
        let trace = Arc::new(EventTrace::with_capacity(64));
        let barrier = Arc::new(CompletionBitmask::new(4).unwrap());
        let spawner = ThreadSpawner { pin_core: None };
        let descriptors: Vec<_> = (0..4)
            .map(|id| descriptor(id, SchedulingAttribute::Priority(4)))
            .collect();

        let set = spawn_workers(
            descriptors,
            Arc::new(busy_spin),
            &trace,
            &barrier,
            &spawner,
        )
        .unwrap();
        barrier.await_all();
        set.join_all();

        let events = order_events(trace.read_all());
        assert_eq!(events.len(), 12);
        for id in 0..4 {
            let stages: Vec<EventKind> = events
                .iter()
                .filter(|e| e.worker_id == id)
                .map(|e| e.kind)
                .collect();
            assert_eq!(
                stages,
                vec![EventKind::Arrived, EventKind::Started, EventKind::Finished]
            );
        }
    }

    #[test]
    fn injected_work_function_replaces_busy_spin() {
        use std::sync::atomic::{AtomicU64, Ordering};

        let trace = Arc::new(EventTrace::with_capacity(8));
        let barrier = Arc::new(CompletionBitmask::new(1).unwrap());
        let spawner = ThreadSpawner { pin_core: None };
        let seen = Arc::new(AtomicU64::new(0));
        let seen_in_work = seen.clone();
        let work: WorkFn = Arc::new(move |cycles| {
            seen_in_work.store(cycles, Ordering::Relaxed);
        });

        let set = spawn_workers(
            vec![descriptor(0, SchedulingAttribute::Deadline { relative_ms: 20 })],
            work,
            &trace,
            &barrier,
            &spawner,
        )
        .unwrap();
        barrier.await_all();
        set.join_all();

        assert_eq!(seen.load(Ordering::Relaxed), 10_000);
        assert_eq!(set.descriptors().len(), 1);
    }
}
