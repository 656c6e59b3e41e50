//! Streaming compression engine adapter.
//!
//! The archive writer never talks to zstd directly. It drives a
//! [`CompressionEngine`] with three primitives: configure, push bytes in
//! while pulling compressed bytes out, and end the current frame. This keeps
//! frame bookkeeping independent of the codec and lets tests substitute an
//! engine that fails on demand.

use crate::error::{CoreError, CoreResult};
use zstd::zstd_safe::{self, zstd_sys::ZSTD_EndDirective, CCtx, CParameter, InBuffer, OutBuffer};

/// Matching strategy, from fastest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Single hash table lookups.
    Fast,
    /// Double hash table lookups.
    DoubleFast,
    /// Greedy parsing.
    Greedy,
    /// Lazy parsing.
    Lazy,
    /// Lazy parsing with a second lookahead.
    Lazy2,
    /// Binary tree lazy parsing.
    BtLazy2,
    /// Binary tree optimal parsing.
    BtOpt,
    /// Optimal parsing with ultra settings.
    BtUltra,
    /// Strongest optimal parsing.
    BtUltra2,
}

impl Strategy {
    fn to_zstd(self) -> zstd_safe::Strategy {
        match self {
            Self::Fast => zstd_safe::Strategy::ZSTD_fast,
            Self::DoubleFast => zstd_safe::Strategy::ZSTD_dfast,
            Self::Greedy => zstd_safe::Strategy::ZSTD_greedy,
            Self::Lazy => zstd_safe::Strategy::ZSTD_lazy,
            Self::Lazy2 => zstd_safe::Strategy::ZSTD_lazy2,
            Self::BtLazy2 => zstd_safe::Strategy::ZSTD_btlazy2,
            Self::BtOpt => zstd_safe::Strategy::ZSTD_btopt,
            Self::BtUltra => zstd_safe::Strategy::ZSTD_btultra,
            Self::BtUltra2 => zstd_safe::Strategy::ZSTD_btultra2,
        }
    }
}

/// A single engine parameter applied during construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSetting {
    /// Compression level.
    Level(i32),
    /// Matching strategy.
    Strategy(Strategy),
    /// Number of internal worker threads.
    Workers(u32),
}

impl EngineSetting {
    /// Returns the parameter name used in error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Level(_) => "compression level",
            Self::Strategy(_) => "strategy",
            Self::Workers(_) => "workers",
        }
    }
}

/// How a compress call treats the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushMode {
    /// Keep the frame open; output may lag behind input.
    Continue,
    /// Flush everything and close the frame.
    End,
}

/// Outcome of one compress call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStep {
    /// Input bytes consumed by the engine.
    pub consumed: usize,
    /// Output bytes written into the caller's buffer.
    pub produced: usize,
    /// Lower bound on output still pending inside the engine; with
    /// [`FlushMode::End`] zero means the frame is complete.
    pub remaining: usize,
}

/// A stateful streaming compressor session.
///
/// Implementations hold in-flight compression context between calls. The
/// archive writer guarantees calls are never concurrent.
pub trait CompressionEngine: Send {
    /// Applies one parameter. Any error aborts writer construction.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigurationRejected`] if the engine refuses it.
    fn configure(&mut self, setting: EngineSetting) -> CoreResult<()>;

    /// Returns the recommended output buffer size for [`Self::compress`].
    fn output_chunk_size(&self) -> usize;

    /// Compresses from `input` into `output`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Engine`] if the engine reports an internal error.
    fn compress(&mut self, input: &[u8], output: &mut [u8], mode: FlushMode)
        -> CoreResult<EngineStep>;
}

/// [`CompressionEngine`] backed by a zstd compression context.
///
/// Every frame ended through [`FlushMode::End`] is an independent zstd frame,
/// so any frame can be decompressed on its own.
pub struct ZstdEngine {
    cctx: CCtx<'static>,
}

impl ZstdEngine {
    /// Creates a zstd context with library defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Allocation`] if zstd cannot allocate the context.
    pub fn new() -> CoreResult<Self> {
        let cctx = CCtx::try_create()
            .ok_or_else(|| CoreError::allocation("zstd compression context"))?;
        Ok(Self { cctx })
    }
}

impl std::fmt::Debug for ZstdEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZstdEngine").finish_non_exhaustive()
    }
}

impl CompressionEngine for ZstdEngine {
    fn configure(&mut self, setting: EngineSetting) -> CoreResult<()> {
        let param = match setting {
            EngineSetting::Level(level) => CParameter::CompressionLevel(level),
            EngineSetting::Strategy(strategy) => CParameter::Strategy(strategy.to_zstd()),
            EngineSetting::Workers(workers) => CParameter::NbWorkers(workers),
        };
        self.cctx.set_parameter(param).map_err(|code| {
            CoreError::configuration_rejected(setting.name(), zstd_safe::get_error_name(code))
        })?;
        Ok(())
    }

    fn output_chunk_size(&self) -> usize {
        CCtx::out_size()
    }

    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        mode: FlushMode,
    ) -> CoreResult<EngineStep> {
        let (directive, operation) = match mode {
            FlushMode::Continue => (ZSTD_EndDirective::ZSTD_e_continue, "compress"),
            FlushMode::End => (ZSTD_EndDirective::ZSTD_e_end, "end frame"),
        };
        let mut in_buf = InBuffer::around(input);
        let mut out_buf = OutBuffer::around(output);
        let remaining = self
            .cctx
            .compress_stream2(&mut out_buf, &mut in_buf, directive)
            .map_err(|code| CoreError::engine(operation, zstd_safe::get_error_name(code)))?;
        Ok(EngineStep {
            consumed: in_buf.pos(),
            produced: out_buf.pos(),
            remaining,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn drive(engine: &mut ZstdEngine, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = vec![0u8; engine.output_chunk_size()];
        let mut offset = 0;
        while offset < data.len() {
            let step = engine
                .compress(&data[offset..], &mut buf, FlushMode::Continue)
                .unwrap();
            offset += step.consumed;
            out.extend_from_slice(&buf[..step.produced]);
        }
        loop {
            let step = engine.compress(&[], &mut buf, FlushMode::End).unwrap();
            out.extend_from_slice(&buf[..step.produced]);
            if step.remaining == 0 {
                break;
            }
        }
        out
    }

    fn configured() -> ZstdEngine {
        let mut engine = ZstdEngine::new().unwrap();
        engine.configure(EngineSetting::Level(3)).unwrap();
        engine.configure(EngineSetting::Strategy(Strategy::Fast)).unwrap();
        engine.configure(EngineSetting::Workers(0)).unwrap();
        engine
    }

    #[test]
    fn ended_frame_decodes() {
        let mut engine = configured();
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 97) as u8).collect();

        let frame = drive(&mut engine, &data);
        assert_eq!(zstd::decode_all(&frame[..]).unwrap(), data);
    }

    #[test]
    fn consecutive_frames_are_independent() {
        let mut engine = configured();

        let first = drive(&mut engine, b"first frame payload");
        let second = drive(&mut engine, b"second frame payload");

        assert_eq!(zstd::decode_all(&first[..]).unwrap(), b"first frame payload");
        assert_eq!(zstd::decode_all(&second[..]).unwrap(), b"second frame payload");
    }

    #[test]
    fn every_strategy_is_accepted() {
        for strategy in [
            Strategy::Fast,
            Strategy::DoubleFast,
            Strategy::Greedy,
            Strategy::Lazy,
            Strategy::Lazy2,
            Strategy::BtLazy2,
            Strategy::BtOpt,
            Strategy::BtUltra,
            Strategy::BtUltra2,
        ] {
            let mut engine = ZstdEngine::new().unwrap();
            engine.configure(EngineSetting::Strategy(strategy)).unwrap();
        }
    }

    #[test]
    fn workers_rejected_mid_frame() {
        let mut engine = configured();
        let mut buf = vec![0u8; engine.output_chunk_size()];
        engine
            .compress(b"open frame", &mut buf, FlushMode::Continue)
            .unwrap();

        let err = engine.configure(EngineSetting::Workers(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("workers"));
    }

    #[test]
    fn output_chunk_size_is_nonzero() {
        let engine = ZstdEngine::new().unwrap();
        assert!(engine.output_chunk_size() > 0);
    }
}
