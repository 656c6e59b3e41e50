//! Frame log benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seekarc_core::FrameLog;

fn filled_log(frames: usize, checksums: bool) -> FrameLog {
    let mut log = FrameLog::with_capacity(frames, checksums).unwrap();
    for i in 0..frames {
        log.record(1000 + i as u64, 4096, i as u32).unwrap();
    }
    log
}

/// Benchmark recording frames.
fn bench_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_log_record");

    for frames in [1_000usize, 100_000].iter() {
        group.throughput(Throughput::Elements(*frames as u64));
        group.bench_with_input(BenchmarkId::from_parameter(frames), frames, |b, &frames| {
            b.iter(|| black_box(filled_log(frames, true)));
        });
    }

    group.finish();
}

/// Benchmark streaming the seek table through a bounded buffer.
fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_log_serialize");

    for chunk in [64usize, 4096].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(chunk), chunk, |b, &chunk| {
            let mut out = vec![0u8; chunk];
            b.iter(|| {
                let mut log = filled_log(10_000, false);
                let mut total = 0;
                loop {
                    let step = log.serialize(&mut out).unwrap();
                    total += step.produced;
                    if step.remaining == 0 {
                        break;
                    }
                }
                black_box(total);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_record, bench_serialize);
criterion_main!(benches);
