//! Resource tracking harness.
//!
//! [`TrackedEngine`] and [`TrackedSink`] wrap the real engine and an
//! in-memory sink, count live instances and log acquisition and release
//! events in order. After a writer is closed, dropped or fails to open, a
//! test asserts that [`ResourceTracker::live`] is zero and inspects the event
//! order.

use crate::faults::{EngineFaults, SinkFaults};
use parking_lot::Mutex;
use seekarc_core::{
    ArchiveWriter, CompressionEngine, CoreError, CoreResult, EngineSetting, EngineStep, FlushMode,
    WriterConfig, ZstdEngine,
};
use seekarc_storage::{ArchiveSink, InMemorySink, SharedBuffer, StorageError, StorageResult};
use std::io;
use std::sync::Arc;

/// A lifecycle event recorded by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceEvent {
    /// An engine session was created.
    EngineCreated,
    /// An engine parameter was accepted.
    EngineConfigured,
    /// An engine session was released.
    EngineReleased,
    /// A sink was opened.
    SinkOpened,
    /// A sink was closed successfully.
    SinkClosed,
    /// A sink was released.
    SinkReleased,
}

#[derive(Debug, Default)]
struct TrackerInner {
    events: Vec<ResourceEvent>,
    engines_live: usize,
    sinks_live: usize,
    sink_writes: usize,
}

/// Shared counter of live engines and sinks.
#[derive(Debug, Clone, Default)]
pub struct ResourceTracker {
    inner: Arc<Mutex<TrackerInner>>,
}

impl ResourceTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of engines and sinks not yet released.
    pub fn live(&self) -> usize {
        let inner = self.inner.lock();
        inner.engines_live + inner.sinks_live
    }

    /// Returns the number of live engines.
    pub fn engines_live(&self) -> usize {
        self.inner.lock().engines_live
    }

    /// Returns the number of live sinks.
    pub fn sinks_live(&self) -> usize {
        self.inner.lock().sinks_live
    }

    /// Returns the number of non-empty writes any tracked sink received.
    pub fn sink_writes(&self) -> usize {
        self.inner.lock().sink_writes
    }

    /// Returns all events in the order they happened.
    pub fn events(&self) -> Vec<ResourceEvent> {
        self.inner.lock().events.clone()
    }

    /// Returns the events without configuration noise.
    pub fn lifecycle(&self) -> Vec<ResourceEvent> {
        self.events()
            .into_iter()
            .filter(|e| *e != ResourceEvent::EngineConfigured)
            .collect()
    }

    /// Counts occurrences of `event`.
    pub fn count(&self, event: ResourceEvent) -> usize {
        self.inner.lock().events.iter().filter(|e| **e == event).count()
    }

    fn record(&self, event: ResourceEvent) {
        let mut inner = self.inner.lock();
        match event {
            ResourceEvent::EngineCreated => inner.engines_live += 1,
            ResourceEvent::EngineReleased => inner.engines_live -= 1,
            ResourceEvent::SinkOpened => inner.sinks_live += 1,
            ResourceEvent::SinkReleased => inner.sinks_live -= 1,
            ResourceEvent::EngineConfigured | ResourceEvent::SinkClosed => {}
        }
        inner.events.push(event);
    }
}

/// A zstd engine that reports its lifecycle and fails on demand.
pub struct TrackedEngine {
    inner: ZstdEngine,
    tracker: ResourceTracker,
    faults: EngineFaults,
    compress_calls: usize,
}

impl TrackedEngine {
    /// Creates the engine, unless the plan says creation fails.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Allocation`] when `fail_create` is set.
    pub fn create(tracker: &ResourceTracker, faults: EngineFaults) -> CoreResult<Self> {
        if faults.fail_create {
            return Err(CoreError::allocation("injected engine creation failure"));
        }
        let inner = ZstdEngine::new()?;
        tracker.record(ResourceEvent::EngineCreated);
        Ok(Self {
            inner,
            tracker: tracker.clone(),
            faults,
            compress_calls: 0,
        })
    }
}

impl CompressionEngine for TrackedEngine {
    fn configure(&mut self, setting: EngineSetting) -> CoreResult<()> {
        if let Some(kind) = self.faults.reject_setting {
            if kind.matches(&setting) {
                return Err(CoreError::configuration_rejected(
                    setting.name(),
                    "injected rejection",
                ));
            }
        }
        self.inner.configure(setting)?;
        self.tracker.record(ResourceEvent::EngineConfigured);
        Ok(())
    }

    fn output_chunk_size(&self) -> usize {
        self.inner.output_chunk_size()
    }

    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        mode: FlushMode,
    ) -> CoreResult<EngineStep> {
        self.compress_calls += 1;
        if self.faults.fail_compress_call == Some(self.compress_calls) {
            return Err(CoreError::engine("compress", "injected engine failure"));
        }
        if self.faults.fail_end_frame && mode == FlushMode::End {
            return Err(CoreError::engine("end frame", "injected engine failure"));
        }
        if self.faults.stall_compress && !input.is_empty() {
            return Ok(EngineStep::default());
        }
        self.inner.compress(input, output, mode)
    }
}

impl Drop for TrackedEngine {
    fn drop(&mut self) {
        self.tracker.record(ResourceEvent::EngineReleased);
    }
}

/// An in-memory sink that reports its lifecycle and fails on demand.
pub struct TrackedSink {
    inner: InMemorySink,
    tracker: ResourceTracker,
    faults: SinkFaults,
    writes: usize,
}

impl TrackedSink {
    /// Opens the sink, unless the plan says opening fails.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when `fail_open` is set.
    pub fn open(tracker: &ResourceTracker, faults: SinkFaults) -> StorageResult<Self> {
        if faults.fail_open {
            return Err(injected("open"));
        }
        tracker.record(ResourceEvent::SinkOpened);
        Ok(Self {
            inner: InMemorySink::new(),
            tracker: tracker.clone(),
            faults,
            writes: 0,
        })
    }

    /// Returns a handle to the bytes written so far.
    pub fn contents(&self) -> SharedBuffer {
        self.inner.contents()
    }
}

impl ArchiveSink for TrackedSink {
    fn write(&mut self, data: &[u8]) -> StorageResult<usize> {
        if data.is_empty() {
            return self.inner.write(data);
        }
        self.writes += 1;
        self.tracker.inner.lock().sink_writes += 1;
        if self.faults.fail_write == Some(self.writes) {
            return Err(injected("write"));
        }
        if self.faults.short_write == Some(self.writes) {
            let half = data.len() / 2;
            return self.inner.write(&data[..half]);
        }
        self.inner.write(data)
    }

    fn close(&mut self) -> StorageResult<()> {
        if self.faults.fail_close {
            return Err(injected("close"));
        }
        self.inner.close()?;
        self.tracker.record(ResourceEvent::SinkClosed);
        Ok(())
    }
}

impl Drop for TrackedSink {
    fn drop(&mut self) {
        self.tracker.record(ResourceEvent::SinkReleased);
    }
}

fn injected(step: &str) -> StorageError {
    StorageError::Io(io::Error::new(
        io::ErrorKind::Other,
        format!("injected sink {step} failure"),
    ))
}

/// Writer type used with the tracking harness.
pub type TrackedWriter = ArchiveWriter<TrackedEngine, TrackedSink>;

/// Opens a tracked writer, returning the archive handle alongside.
///
/// The handle is only populated when the sink actually opens.
///
/// # Errors
///
/// Returns whatever construction step the fault plans make fail.
pub fn open_tracked(
    config: &WriterConfig,
    tracker: &ResourceTracker,
    engine_faults: EngineFaults,
    sink_faults: SinkFaults,
) -> CoreResult<(TrackedWriter, SharedBuffer)> {
    let contents = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&contents);
    let writer = ArchiveWriter::open_with(
        config,
        || TrackedEngine::create(tracker, engine_faults),
        move || {
            let sink = TrackedSink::open(tracker, sink_faults)?;
            *slot.lock() = Some(sink.contents());
            Ok(sink)
        },
    )?;
    let contents = contents.lock().take().unwrap_or_default();
    Ok((writer, contents))
}
