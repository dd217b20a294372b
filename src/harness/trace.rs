//! trace.rs
//! Bounded, lock-free event trace shared by every benchmark worker.
//!
//! Producers never block and never take a lock: each `record` captures the
//! platform time, reserves a unique slot index with a single atomic fetch-add,
//! and pushes the event into a bounded queue. The trace performs no
//! synchronization on reads; `read_all` is only safe once every producer has
//! provably finished, which the completion bitmask enforces at the protocol
//! level.
//!
//! Overflow is non-fatal by design: a full trace drops the event, counts it,
//! and warns. Losing a late diagnostic event must not abort a long run, so
//! capacity is sized >= 3 x worker count in the shipped configuration.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

use crossbeam_queue::ArrayQueue;
use log::warn;

/// Timestamps are nanoseconds since trace creation; millisecond conversion
/// happens only at report time.
pub const NS_PER_MS: u64 = 1_000_000;

/// Lifecycle stage of a worker, tagged per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Arrived,
    Started,
    Finished,
}

impl EventKind {
    /// Canonical action word used in the printed timeline.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Arrived => "ARRIVE",
            EventKind::Started => "START",
            EventKind::Finished => "END",
        }
    }
}

/// One recorded lifecycle event. Immutable once created.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    pub kind: EventKind,
    /// Monotonic count in nanoseconds since trace creation.
    pub timestamp: u64,
    pub worker_id: u32,
    /// Reserved slot index. Unique per `record` call, but under multi-core
    /// concurrency reservation order may diverge from timestamp order; the
    /// reporter's sort pass recovers timestamp order.
    pub slot: u64,
}

/// Fixed-capacity, multi-writer, eventually-single-reader event record.
pub struct EventTrace {
    slots: ArrayQueue<Event>,
    reserved: AtomicU64,
    dropped: AtomicU64,
    start: Instant,
}

impl EventTrace {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: ArrayQueue::new(capacity),
            reserved: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            start: Instant::now(),
        }
    }

    /// Current platform time in trace ticks (nanoseconds).
    #[inline]
    pub fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    /// Append one event: capture time, reserve the next slot index, write.
    /// Callable from any worker at any point up to its own termination.
    /// On overflow the event is dropped and counted; the run continues.
    pub fn record(&self, kind: EventKind, worker_id: u32) {
        let timestamp = self.now();
        let slot = self.reserved.fetch_add(1, Ordering::Relaxed);
        let event = Event {
            kind,
            timestamp,
            worker_id,
            slot,
        };
        if self.slots.push(event).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            warn!(
                "event trace full ({} slots), dropping {:?} for task{}",
                self.slots.capacity(),
                kind,
                worker_id
            );
        }
    }

    /// Occupied slots. Never exceeds capacity.
    pub fn occupancy(&self) -> usize {
        self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Total reservations issued, including ones whose event was dropped.
    pub fn reserved(&self) -> u64 {
        self.reserved.load(Ordering::Relaxed)
    }

    /// Events lost to overflow.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Drain every occupied slot in reservation order.
    ///
    /// Only safe once all producers have ceased writing; the caller enforces
    /// that through the completion bitmask, not the trace.
    pub fn read_all(&self) -> Vec<Event> {
        let mut events = Vec::with_capacity(self.slots.len());
        while let Some(event) = self.slots.pop() {
            events.push(event);
        }
        events
    }
}
