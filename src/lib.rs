//! # Scheduling-Policy Benchmark Harness
//!
//! Measures and compares real-time scheduling policies (fixed-priority, EDF,
//! least-laxity/window) by running synthetic workloads under each policy and
//! recording a timestamped trace of task lifecycle events for offline analysis.
//!
//! ## Architecture
//! - **EventTrace:** bounded lock-free append-only record of lifecycle events
//!   (slot reservation by atomic fetch-add; overflow drops with a warning).
//! - **CompletionBitmask:** one-shot rendezvous; each worker sets its own bit,
//!   the observer waits for all-ones.
//! - **Workload generator:** spawns one thread per synthetic worker through a
//!   task-spawning seam carrying the policy-specific scheduling attribute.
//! - **Timeline reporter:** after the barrier opens, establishes a total order
//!   over the trace (stable sort by timestamp, ties by reservation order) and
//!   prints the canonical `<ms> ms | <ACTION> task<id>` block.
//!
//! The scheduler itself is an external collaborator: on the host build it is
//! the OS thread scheduler reached through [`harness::workload::TaskSpawner`].

pub mod config;
pub mod harness;
pub mod utils;
