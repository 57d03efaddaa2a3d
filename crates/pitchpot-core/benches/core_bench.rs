//! Criterion benchmarks for pitchpot-core render and control primitives
//!
//! Run with: cargo bench -p pitchpot-core
#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pitchpot_core::{
    ControlMapping, Oscillator, ParameterChannel, ParameterSmoother, SmoothedParameters,
    WaveTable, parameter_channel,
};

const SAMPLE_RATE: f32 = 44100.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("Oscillator");
    let table = Arc::new(WaveTable::new(4096));

    for &block_size in BLOCK_SIZES {
        group.bench_with_input(
            BenchmarkId::new("render", block_size),
            &block_size,
            |b, &size| {
                let (_tx, rx) = parameter_channel(SmoothedParameters::new(440.0, 0.5));
                let mut osc = Oscillator::new(Arc::clone(&table), rx, SAMPLE_RATE);
                let mut buf = vec![0.0f32; size];
                b.iter(|| {
                    black_box(osc.render(black_box(&mut buf)));
                });
            },
        );
    }

    group.bench_function("render_interleaved_stereo_512", |b| {
        let (_tx, rx) = parameter_channel(SmoothedParameters::new(440.0, 0.5));
        let mut osc = Oscillator::new(Arc::clone(&table), rx, SAMPLE_RATE);
        let mut buf = vec![0.0f32; 1024];
        b.iter(|| {
            black_box(osc.render_interleaved(black_box(&mut buf), 2));
        });
    });

    group.finish();
}

fn bench_wavetable(c: &mut Criterion) {
    let mut group = c.benchmark_group("WaveTable");
    for &size in &[256usize, 1024, 4096, 16384] {
        group.bench_with_input(BenchmarkId::new("build", size), &size, |b, &size| {
            b.iter(|| black_box(WaveTable::new(black_box(size))));
        });
    }
    group.finish();
}

fn bench_control_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("ControlTick");
    let mapping = ControlMapping::default();
    let smoother = ParameterSmoother::from_poll_rate(0.02, 100.0);
    let channel = ParameterChannel::new(SmoothedParameters::new(440.0, 0.2));

    group.bench_function("map_smooth_publish", |b| {
        let mut code = 0u16;
        let mut current = channel.read();
        b.iter(|| {
            code = (code + 37) % 1024;
            if let Some(target) = mapping.target(black_box(code), black_box(1023 - code)) {
                current = smoother.step(current, target);
                channel.publish(current);
            }
        });
    });

    group.bench_function("read", |b| {
        b.iter(|| black_box(channel.read()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_oscillator,
    bench_wavetable,
    bench_control_tick
);
criterion_main!(benches);
