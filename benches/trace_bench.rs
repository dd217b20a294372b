use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

use sched_bench::harness::{
    barrier::CompletionBitmask,
    trace::{EventKind, EventTrace},
};

// The harness must not perturb the timing it measures; these benches document
// the per-event overhead of the trace append and the barrier signal.

fn trace_record_bench(c: &mut Criterion) {
    c.bench_function("trace_record_64_events", |b| {
        b.iter_batched(
            || EventTrace::with_capacity(256),
            |trace| {
                for i in 0..64u32 {
                    trace.record(EventKind::Started, i % 8);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn barrier_signal_bench(c: &mut Criterion) {
    c.bench_function("barrier_signal_8_workers", |b| {
        b.iter_batched(
            || CompletionBitmask::new(8).unwrap(),
            |mask| {
                for id in 0..8 {
                    mask.signal(id);
                }
                assert!(mask.is_complete());
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, trace_record_bench, barrier_signal_bench);
criterion_main!(benches);
