// benches/pipeline_benchmarks.rs
//! Throughput of the per-tick path and the rings

use breath_core::acquisition::{BurstSample, DiagnosticBurstRing, Ring};
use breath_core::utils::MockTimeProvider;
use breath_core::{BreathPipeline, BreathSimulator, PipelineConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

const PROCESSING_RATES: &[u32] = &[50, 100, 250, 500];
const TAP_COUNTS: &[u8] = &[1, 3, 8];

fn benchmark_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for &rate in PROCESSING_RATES {
        for &taps in TAP_COUNTS {
            group.throughput(Throughput::Elements(1000));

            group.bench_with_input(
                BenchmarkId::new("simulated_source", format!("{}hz_{}taps", rate, taps)),
                &(rate, taps),
                |b, &(rate, taps)| {
                    let clock = Arc::new(MockTimeProvider::new(0));
                    let config = PipelineConfig {
                        processing_rate_hz: rate,
                        anti_ring_taps: taps,
                        ..Default::default()
                    };
                    let mut pipeline = BreathPipeline::with_clock(config, clock.clone());
                    let _ = pipeline.attach_source(Box::new(BreathSimulator::breathing(40.0, 80.0)));
                    let period_ms = (1000 / rate as u64).max(1);

                    b.iter(|| {
                        for _ in 0..1000 {
                            pipeline.tick();
                            clock.advance_millis(period_ms);
                        }
                        black_box(pipeline.status())
                    });
                },
            );
        }
    }

    group.finish();
}

fn benchmark_ingest(c: &mut Criterion) {
    let sim = BreathSimulator::breathing(40.0, 80.0);
    let frames: Vec<_> = (0..1000u64).map(|i| sim.frame_at(i * 10)).collect();

    let mut group = c.benchmark_group("ingest");
    group.throughput(Throughput::Elements(frames.len() as u64));
    group.bench_function("precomputed_frames", |b| {
        let mut pipeline = BreathPipeline::new(PipelineConfig::default());
        let mut now = 0u64;
        b.iter(|| {
            for frame in &frames {
                pipeline.ingest(black_box(*frame), now);
                now += 10;
            }
        });
    });
    group.finish();
}

fn benchmark_rings(c: &mut Criterion) {
    let mut group = c.benchmark_group("rings");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("ring_push_overwrite", |b| {
        let mut ring = Ring::new(256);
        b.iter(|| {
            for i in 0..1000u32 {
                black_box(ring.push(i));
            }
        });
    });

    group.bench_function("burst_export_600", |b| {
        let mut burst = DiagnosticBurstRing::new(3000, 3000, 100);
        for i in 0..600i16 {
            burst.record(BurstSample { ch1: i, ch2: -i });
        }
        b.iter(|| black_box(burst.export(600)));
    });

    group.finish();
}

criterion_group!(benches, benchmark_tick, benchmark_ingest, benchmark_rings);
criterion_main!(benches);
