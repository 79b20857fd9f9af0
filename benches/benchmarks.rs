//! Benchmark suite for Reprise hot paths.
//!
//! This module provides performance benchmarks for:
//! - Boundary classification (per-sample cost)
//! - Crossing replay over long sample sequences
//! - Controller ticks against a recording player
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Save baseline for comparison
//! cargo bench -- --save-baseline main
//!
//! # Compare against baseline
//! cargo bench -- --baseline main
//! ```
//!
//! Criterion writes JSON estimates and HTML reports to `target/criterion/`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use reprise::{BoundaryDetector, ControllerConfig, MockPlayer, RepeatLoopController, Window};
use std::sync::Arc;

/// A jittery feed: each pass ramps up to just past `end`, lingers, then
/// jumps back to the start.
fn jittery_samples(passes: usize, end: f64) -> Vec<f64> {
    let mut samples = Vec::with_capacity(passes * 24);
    for pass in 0..passes {
        for step in 0..20 {
            samples.push(end * f64::from(step) / 20.0);
        }
        let wobble = (pass % 3) as f64 * 0.05;
        samples.extend([end + 0.1, end + 0.2 + wobble, end + 0.15, end - 0.2]);
    }
    samples
}

// ============================================================================
// Boundary Detection Benchmarks
// ============================================================================

/// Benchmark a single classification.
fn bench_classify(c: &mut Criterion) {
    let detector = BoundaryDetector::default();
    let window = Window::new(12.0, 48.0);

    c.bench_function("classify_single_sample", |b| {
        b.iter(|| detector.classify(black_box(48.3), black_box(window), black_box(false)))
    });
}

/// Benchmark replaying sample sequences of increasing length.
fn bench_count_crossings(c: &mut Criterion) {
    let detector = BoundaryDetector::default();
    let window = Window::new(0.0, 10.0);
    let mut group = c.benchmark_group("count_crossings");

    for passes in [10, 100, 1000] {
        let samples = jittery_samples(passes, window.end);
        group.throughput(Throughput::Elements(samples.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(passes), &samples, |b, samples| {
            b.iter(|| detector.count_crossings(black_box(samples), window))
        });
    }

    group.finish();
}

// ============================================================================
// Controller Benchmarks
// ============================================================================

/// Benchmark push-then-poll against an unbounded session.
///
/// No runtime is entered, so no supervisor task is spawned and every tick
/// comes from `poll_now`.
fn bench_controller_tick(c: &mut Criterion) {
    let samples = jittery_samples(50, 10.0);
    let mut group = c.benchmark_group("controller_tick");
    group.throughput(Throughput::Elements(samples.len() as u64));

    group.bench_function("unbounded_session", |b| {
        b.iter_with_setup(
            || {
                let controller = RepeatLoopController::new(
                    Arc::new(MockPlayer::new()),
                    ControllerConfig::default(),
                )
                .unwrap();
                controller.start(0.0, 10.0, 0).unwrap();
                controller
            },
            |controller| {
                for &position in &samples {
                    controller.on_position_sample(position, 120.0);
                    controller.poll_now();
                }
                controller
            },
        )
    });

    group.finish();
}

criterion_group!(detector_benches, bench_classify, bench_count_crossings);

criterion_group!(controller_benches, bench_controller_tick);

criterion_main!(detector_benches, controller_benches);
