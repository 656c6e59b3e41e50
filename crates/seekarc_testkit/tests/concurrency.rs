//! Concurrent writers produce a total order of whole writes.

use seekarc_core::WriterConfig;
use seekarc_testkit::prelude::*;

fn run(config: &WriterConfig, stress: &StressConfig) {
    let archive = MemoryArchive::open(config);
    let result = stress_concurrent_writes(&archive.writer, stress);
    assert_eq!(result.failed_ops, 0);
    assert_eq!(result.successful_ops, stress.threads * stress.writes_per_thread);
    assert_eq!(archive.writer.stats().bytes_in, result.bytes);

    let bytes = archive.close().unwrap();
    let frames = decode_frames(&bytes).unwrap();
    assert!(frames.len() > 1);
    check_records(&frames.concat(), stress).unwrap();
}

#[test]
fn single_threaded_engine_linearizes_writes() {
    run(
        &WriterConfig::new().min_frame_size(4096),
        &StressConfig::default(),
    );
}

#[test]
fn multithreaded_engine_linearizes_writes() {
    run(
        &WriterConfig::new().min_frame_size(8192).workers(2),
        &StressConfig {
            threads: 8,
            writes_per_thread: 100,
            max_body: 1024,
        },
    );
}

#[test]
fn checksummed_frames_survive_contention() {
    run(
        &WriterConfig::new().min_frame_size(1024).checksums(true),
        &StressConfig {
            threads: 3,
            writes_per_thread: 200,
            max_body: 64,
        },
    );
}
