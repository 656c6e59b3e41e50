//! Archive writer benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seekarc_bench::sample_data;
use seekarc_core::{ArchiveWriter, WriterConfig, ZstdEngine};
use seekarc_storage::InMemorySink;
use tempfile::TempDir;

const TOTAL: usize = 4 * 1024 * 1024;

fn memory_writer(config: &WriterConfig) -> ArchiveWriter<ZstdEngine, InMemorySink> {
    ArchiveWriter::open_with(config, ZstdEngine::new, || Ok(InMemorySink::new())).unwrap()
}

/// Benchmark whole-archive throughput by write size.
fn bench_write_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_size");
    group.sample_size(20);
    group.throughput(Throughput::Bytes(TOTAL as u64));

    let data = sample_data(TOTAL);
    for size in [256usize, 4096, 65536].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let config = WriterConfig::new();
            b.iter(|| {
                let writer = memory_writer(&config);
                for chunk in data.chunks(size) {
                    writer.write(black_box(chunk)).unwrap();
                }
                black_box(writer.close().unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark the cost of frame boundaries.
fn bench_min_frame_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("min_frame_size");
    group.sample_size(20);
    group.throughput(Throughput::Bytes(TOTAL as u64));

    let data = sample_data(TOTAL);
    for min in [16 * 1024u64, 256 * 1024, 1024 * 1024].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(min), min, |b, &min| {
            let config = WriterConfig::new().min_frame_size(min);
            b.iter(|| {
                let writer = memory_writer(&config);
                for chunk in data.chunks(4096) {
                    writer.write(chunk).unwrap();
                }
                black_box(writer.close().unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark engine worker threads.
fn bench_workers(c: &mut Criterion) {
    let mut group = c.benchmark_group("workers");
    group.sample_size(10);
    group.throughput(Throughput::Bytes(TOTAL as u64));

    let data = sample_data(TOTAL);
    for workers in [0u32, 2, 4].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(workers), workers, |b, &workers| {
            let config = WriterConfig::new().workers(workers);
            b.iter(|| {
                let writer = memory_writer(&config);
                for chunk in data.chunks(65536) {
                    writer.write(chunk).unwrap();
                }
                black_box(writer.close().unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark writing to a file sink.
fn bench_file_archive(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_archive");
    group.sample_size(10);
    group.throughput(Throughput::Bytes(TOTAL as u64));

    let data = sample_data(TOTAL);
    group.bench_function("4MiB", |b| {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bench.zst");
        b.iter(|| {
            let writer = ArchiveWriter::open(&path, 0, 256 * 1024).unwrap();
            for chunk in data.chunks(65536) {
                writer.write(chunk).unwrap();
            }
            black_box(writer.close().unwrap());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_write_size,
    bench_min_frame_size,
    bench_workers,
    bench_file_archive,
);
criterion_main!(benches);
