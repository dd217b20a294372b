//! Compile-time benchmark configuration: worker count, per-worker cycle
//! budgets, per-policy attribute tables, trace capacity.
//!
//! These are external inputs to the harness; the harness itself never reads
//! the tables directly, it only consumes the descriptors built here.

use std::{path::PathBuf, sync::Arc, time::Instant};

use crate::harness::workload::{
    CYCLES_PER_MS, SchedulingAttribute, WorkFn, WorkerDescriptor, busy_spin,
};

pub const WORKER_COUNT: usize = 8;
/// Each worker emits up to three events; keep capacity >= 3 x workers.
pub const TRACE_CAPACITY: usize = 64;
/// Simulated runtime per worker, in milliseconds of busy computation.
pub const RUNTIME_MS: [u32; WORKER_COUNT] = [2000; WORKER_COUNT];

/// Fixed-priority policy: one shared level for every worker.
pub const FIXED_PRIORITY: u8 = 4;
/// EDF policy: relative deadline per worker, in ms.
pub const EDF_DEADLINES_MS: [u32; WORKER_COUNT] = [90, 60, 70, 20, 8, 16, 24, 64];
/// Window policy: WCET budget inside a recurring window, per worker.
pub const LLREF_WCET_MS: [u32; WORKER_COUNT] = [10, 10, 10, 10, 4, 8, 8, 10];
pub const LLREF_WINDOW_MS: [u32; WORKER_COUNT] = EDF_DEADLINES_MS;

/// Scheduling policy under measurement. The harness only uses this to pick
/// which attribute variant to populate; the scheduling itself belongs to the
/// external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Default,
    Edf,
    Llref,
}

impl Policy {
    pub fn from_arg(arg: &str) -> Result<Self, String> {
        match arg {
            "default" => Ok(Policy::Default),
            "edf" => Ok(Policy::Edf),
            "llref" => Ok(Policy::Llref),
            other => Err(format!(
                "unknown policy {other:?} (expected default, edf or llref)"
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Policy::Default => "default",
            Policy::Edf => "edf",
            Policy::Llref => "llref",
        }
    }

    /// Attribute for worker `i`, from the per-policy tables.
    pub fn attribute(&self, i: usize) -> SchedulingAttribute {
        let row = i % WORKER_COUNT;
        match self {
            Policy::Default => SchedulingAttribute::Priority(FIXED_PRIORITY),
            Policy::Edf => SchedulingAttribute::Deadline {
                relative_ms: EDF_DEADLINES_MS[row],
            },
            Policy::Llref => SchedulingAttribute::Window {
                wcet_ms: LLREF_WCET_MS[row],
                window_ms: LLREF_WINDOW_MS[row],
            },
        }
    }
}

/// One benchmark run's configuration. Built from the compile-time tables;
/// tests override workers, budgets and the work function directly.
#[derive(Clone)]
pub struct BenchConfig {
    pub policy: Policy,
    pub workers: usize,
    pub trace_capacity: usize,
    pub runtime_ms: Vec<u32>,
    /// Pin workers to this core index to model a single-core target.
    pub pin_core: Option<usize>,
    /// Also export the ordered timeline as CSV.
    pub csv_path: Option<PathBuf>,
    pub work: WorkFn,
}

impl BenchConfig {
    pub fn for_policy(policy: Policy) -> Self {
        Self {
            policy,
            workers: WORKER_COUNT,
            trace_capacity: TRACE_CAPACITY,
            runtime_ms: RUNTIME_MS.to_vec(),
            pin_core: None,
            csv_path: None,
            work: Arc::new(busy_spin),
        }
    }

    /// Cycle budget for worker `i`, derived from its configured runtime.
    pub fn cycle_budget(&self, i: usize) -> u64 {
        let runtime = self.runtime_ms[i % self.runtime_ms.len()];
        u64::from(runtime) * CYCLES_PER_MS
    }

    /// Build one descriptor per worker. Window-policy workers get their
    /// creation-time window state (remaining = WCET, deadline = now + window).
    pub fn descriptors(&self) -> Vec<WorkerDescriptor> {
        let now = Instant::now();
        (0..self.workers)
            .map(|i| {
                let attribute = self.policy.attribute(i);
                WorkerDescriptor {
                    id: i as u32,
                    cycle_budget: self.cycle_budget(i),
                    attribute,
                    window: attribute.initial_window_state(now),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_arg_roundtrip() {
        for policy in [Policy::Default, Policy::Edf, Policy::Llref] {
            assert_eq!(Policy::from_arg(policy.name()).unwrap(), policy);
        }
        assert!(Policy::from_arg("rms").is_err());
    }

    #[test]
    fn edf_descriptors_carry_the_deadline_table() {
        let cfg = BenchConfig::for_policy(Policy::Edf);
        let descriptors = cfg.descriptors();
        assert_eq!(descriptors.len(), WORKER_COUNT);
        for (i, desc) in descriptors.iter().enumerate() {
            assert_eq!(
                desc.attribute,
                SchedulingAttribute::Deadline {
                    relative_ms: EDF_DEADLINES_MS[i]
                }
            );
            assert!(desc.window.is_none());
        }
    }

    #[test]
    fn llref_descriptors_initialize_window_state() {
        let cfg = BenchConfig::for_policy(Policy::Llref);
        for (i, desc) in cfg.descriptors().iter().enumerate() {
            assert_eq!(
                desc.attribute,
                SchedulingAttribute::Window {
                    wcet_ms: LLREF_WCET_MS[i],
                    window_ms: LLREF_WINDOW_MS[i],
                }
            );
            let window = desc.window.expect("window state populated at creation");
            assert_eq!(window.remaining_ms, LLREF_WCET_MS[i]);
        }
    }

    #[test]
    fn default_policy_shares_one_priority_level() {
        let cfg = BenchConfig::for_policy(Policy::Default);
        for desc in cfg.descriptors() {
            assert_eq!(desc.attribute, SchedulingAttribute::Priority(FIXED_PRIORITY));
        }
    }

    #[test]
    fn cycle_budget_scales_with_runtime() {
        let mut cfg = BenchConfig::for_policy(Policy::Default);
        cfg.runtime_ms = vec![10, 20];
        cfg.workers = 4;
        assert_eq!(cfg.cycle_budget(0), 10 * CYCLES_PER_MS);
        assert_eq!(cfg.cycle_budget(1), 20 * CYCLES_PER_MS);
        // Budget table cycles past its length.
        assert_eq!(cfg.cycle_budget(2), 10 * CYCLES_PER_MS);
    }
}
