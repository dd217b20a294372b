//! barrier.rs
//! One-shot completion rendezvous between workers and the observer.
//!
//! Each worker sets its own bit exactly once (a second set is a no-op); the
//! observer blocks in `await_all` until every expected bit is set. This is
//! the single designed suspension point in the harness. The mask is never
//! reset; a fresh bitmask is required for a new run.

use std::{
    sync::atomic::{AtomicU32, Ordering},
    thread,
    time::{Duration, Instant},
};

// Poll interval for the waiting observer. Well below reporting precision.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

pub struct CompletionBitmask {
    bits: AtomicU32,
    expected: u32,
}

impl CompletionBitmask {
    /// One bit per worker. Fails for zero workers or more than 32; worker
    /// creation cannot proceed without a barrier, so callers treat this as
    /// fatal.
    pub fn new(workers: usize) -> Result<Self, String> {
        if workers == 0 || workers > 32 {
            return Err(format!(
                "completion bitmask supports 1..=32 workers, got {workers}"
            ));
        }
        let expected = if workers == 32 {
            u32::MAX
        } else {
            (1u32 << workers) - 1
        };
        Ok(Self {
            bits: AtomicU32::new(0),
            expected,
        })
    }

    /// Set this worker's bit. Setting an already-set bit is a no-op.
    pub fn signal(&self, worker_id: u32) {
        self.bits.fetch_or(1 << worker_id, Ordering::Release);
    }

    pub fn is_complete(&self) -> bool {
        self.bits.load(Ordering::Acquire) & self.expected == self.expected
    }

    /// Bits still expected but not yet signaled.
    pub fn pending(&self) -> u32 {
        self.expected & !self.bits.load(Ordering::Acquire)
    }

    /// Block until every expected bit is set. Unbounded; a run that never
    /// converges is the job of an external watchdog.
    pub fn await_all(&self) {
        while !self.is_complete() {
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Bounded wait, returns whether the mask completed. Defensive/test use
    /// only; the benchmark protocol itself never times out.
    pub fn wait_timeout(&self, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        while !self.is_complete() {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(POLL_INTERVAL);
        }
        true
    }
}
