//! Criterion benchmarks for per-cycle aggregation (`flowgraph-core::route`).
//!
//! Measures the hot path only: routes and voices are set up once outside the
//! timed loop. Two axes:
//!
//! - **Fan-in**: scalar and block inlets fed by a growing number of outlets
//! - **Block size**: block aggregation throughput at varying block sizes
//!
//! Run with: `cargo bench -p flowgraph-core -- route/`
#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use flowgraph_core::{
    Block, Inlet, InstrumentTemplate, Outlet, PortSignal, Router, Voice, VoiceId,
};

const BLOCK_SIZE: usize = 256;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];
const FAN_IN: &[usize] = &[1, 4, 16, 64];

// ---------------------------------------------------------------------------
// Route constructors
// ---------------------------------------------------------------------------

/// Builds `sources` voices of template "Osc" feeding one "Mix" inlet.
fn fan_in<S: PortSignal>(
    sources: usize,
    fill: impl Fn(&Outlet<S>),
) -> (Router, Arc<Inlet<S>>) {
    let router = Router::new();
    router.connect(&"Osc".into(), &"out".into(), &"Mix".into(), &"in".into());
    let template = Arc::new(InstrumentTemplate::named(1, "Osc"));
    for n in 0..sources {
        let voice = Arc::new(Voice::shared(VoiceId(n as u64), Arc::clone(&template)));
        let outlet = router.outlet::<S>(&voice, &"out".into());
        fill(&outlet);
    }
    let mix = Arc::new(Voice::new(VoiceId(u64::MAX), InstrumentTemplate::named(2, "Mix")));
    let inlet = router.inlet::<S>(&mix, &"in".into());
    (router, inlet)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_fan_in(c: &mut Criterion) {
    let mut group = c.benchmark_group("route/fan_in");

    for &sources in FAN_IN {
        let (_router, inlet) = fan_in::<f64>(sources, |o| o.set(0.5));
        group.bench_with_input(BenchmarkId::new("scalar", sources), &sources, |b, _| {
            b.iter(|| black_box(inlet.aggregate()));
        });

        let (_router, inlet) = fan_in::<Block>(sources, |o| o.write_block(&[0.5; BLOCK_SIZE]));
        let mut sink = vec![0.0; BLOCK_SIZE];
        group.bench_with_input(BenchmarkId::new("block", sources), &sources, |b, _| {
            b.iter(|| {
                inlet.aggregate(&mut sink);
                black_box(&sink);
            });
        });
    }

    group.finish();
}

fn bench_block_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("route/block_size");

    for &size in BLOCK_SIZES {
        let samples = vec![0.25; size];
        let (_router, inlet) = fan_in::<Block>(8, |o| o.write_block(&samples));
        let mut sink = vec![0.0; size];
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                inlet.aggregate(&mut sink);
                black_box(&sink);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fan_in, bench_block_size);
criterion_main!(benches);
