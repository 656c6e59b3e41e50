//! Fault plans for engines and sinks.
//!
//! A plan says which step should fail. The tracked engine and sink in
//! [`crate::tracking`] consult it on every call.

use seekarc_core::EngineSetting;

/// Which engine parameter to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    /// [`EngineSetting::Level`].
    Level,
    /// [`EngineSetting::Strategy`].
    Strategy,
    /// [`EngineSetting::Workers`].
    Workers,
}

impl SettingKind {
    /// Returns `true` if `setting` is of this kind.
    pub fn matches(&self, setting: &EngineSetting) -> bool {
        matches!(
            (self, setting),
            (Self::Level, EngineSetting::Level(_))
                | (Self::Strategy, EngineSetting::Strategy(_))
                | (Self::Workers, EngineSetting::Workers(_))
        )
    }
}

/// Failures to inject into a tracked engine.
#[derive(Debug, Clone, Default)]
pub struct EngineFaults {
    /// Fail engine creation.
    pub fail_create: bool,
    /// Reject this parameter during configuration.
    pub reject_setting: Option<SettingKind>,
    /// Fail the n-th `compress` call (1-based, both flush modes counted).
    pub fail_compress_call: Option<usize>,
    /// Fail every frame-ending call.
    pub fail_end_frame: bool,
    /// Make every non-empty `compress` call consume and produce nothing.
    pub stall_compress: bool,
}

impl EngineFaults {
    /// No faults.
    pub fn none() -> Self {
        Self::default()
    }

    /// Rejects one parameter kind.
    pub fn reject(kind: SettingKind) -> Self {
        Self {
            reject_setting: Some(kind),
            ..Self::default()
        }
    }

    /// Fails engine creation.
    pub fn fail_create() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    /// Fails every frame end.
    pub fn fail_end_frame() -> Self {
        Self {
            fail_end_frame: true,
            ..Self::default()
        }
    }

    /// Stalls every compress call that has input.
    pub fn stall_compress() -> Self {
        Self {
            stall_compress: true,
            ..Self::default()
        }
    }
}

/// Failures to inject into a tracked sink.
#[derive(Debug, Clone, Default)]
pub struct SinkFaults {
    /// Fail opening the sink.
    pub fail_open: bool,
    /// Fail the n-th non-empty write (1-based).
    pub fail_write: Option<usize>,
    /// Accept only half the bytes of the n-th non-empty write (1-based).
    pub short_write: Option<usize>,
    /// Fail `close`.
    pub fail_close: bool,
}

impl SinkFaults {
    /// No faults.
    pub fn none() -> Self {
        Self::default()
    }

    /// Fails opening the sink.
    pub fn fail_open() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    /// Fails the n-th non-empty write.
    pub fn fail_write(n: usize) -> Self {
        Self {
            fail_write: Some(n),
            ..Self::default()
        }
    }

    /// Short-writes the n-th non-empty write.
    pub fn short_write(n: usize) -> Self {
        Self {
            short_write: Some(n),
            ..Self::default()
        }
    }

    /// Fails closing the sink.
    pub fn fail_close() -> Self {
        Self {
            fail_close: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seekarc_core::Strategy;

    #[test]
    fn setting_kind_matches_only_its_setting() {
        assert!(SettingKind::Level.matches(&EngineSetting::Level(3)));
        assert!(!SettingKind::Level.matches(&EngineSetting::Workers(0)));
        assert!(SettingKind::Strategy.matches(&EngineSetting::Strategy(Strategy::Fast)));
        assert!(SettingKind::Workers.matches(&EngineSetting::Workers(4)));
    }

    #[test]
    fn constructors_set_one_fault() {
        assert_eq!(SinkFaults::fail_write(2).fail_write, Some(2));
        assert!(SinkFaults::fail_write(2).short_write.is_none());
        assert!(EngineFaults::fail_create().fail_create);
        assert!(EngineFaults::none().reject_setting.is_none());
        assert!(EngineFaults::stall_compress().stall_compress);
        assert!(!EngineFaults::stall_compress().fail_end_frame);
    }
}
