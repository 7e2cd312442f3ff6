//! Preference detection sources.

/// A source of preference hints. `None` means the source cannot answer,
/// which callers must treat as "not reduced" rather than an error.
pub trait SignalSource {
    /// OS-level reduced-motion hint, if detectable.
    fn reduce_motion(&self) -> Option<bool>;
    /// Low-data hint (metered/slow connection), if detectable.
    fn low_data(&self) -> Option<bool>;
}

/// Reads preference hints from environment variables.
///
/// `HALCYON_REDUCE_MOTION` and `HALCYON_LOW_DATA` accept `1` or `true`
/// (case-insensitive). Unset or unparsable values yield `None`, so a missing
/// detection surface silently defaults downstream.
pub struct EnvSignalSource;

impl EnvSignalSource {
    fn read(var: &str) -> Option<bool> {
        let value = std::env::var(var).ok()?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed == "1" || trimmed.eq_ignore_ascii_case("true"))
    }
}

impl SignalSource for EnvSignalSource {
    fn reduce_motion(&self) -> Option<bool> {
        Self::read("HALCYON_REDUCE_MOTION")
    }

    fn low_data(&self) -> Option<bool> {
        Self::read("HALCYON_LOW_DATA")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource {
        reduce_motion: Option<bool>,
        low_data: Option<bool>,
    }

    impl SignalSource for FixedSource {
        fn reduce_motion(&self) -> Option<bool> {
            self.reduce_motion
        }
        fn low_data(&self) -> Option<bool> {
            self.low_data
        }
    }

    #[test]
    fn test_absent_source_defaults_to_not_reduced() {
        use crate::store::PreferenceStore;
        let source = FixedSource {
            reduce_motion: None,
            low_data: None,
        };
        let store = PreferenceStore::from_source(&source);
        let snap = store.snapshot();
        assert!(!snap.reduce_motion);
        assert!(!snap.low_data);
        assert!(!snap.calm());
    }

    #[test]
    fn test_detected_values_applied() {
        use crate::store::PreferenceStore;
        let source = FixedSource {
            reduce_motion: Some(true),
            low_data: Some(true),
        };
        let store = PreferenceStore::from_source(&source);
        assert!(store.snapshot().calm());
    }

    #[test]
    fn test_env_source_parses_truthy_values() {
        // SAFETY: test-only process-env mutation, no concurrent readers of
        // these variables outside this test.
        unsafe {
            std::env::set_var("HALCYON_TEST_FLAG", "true");
        }
        assert_eq!(EnvSignalSource::read("HALCYON_TEST_FLAG"), Some(true));
        unsafe {
            std::env::set_var("HALCYON_TEST_FLAG", "0");
        }
        assert_eq!(EnvSignalSource::read("HALCYON_TEST_FLAG"), Some(false));
        unsafe {
            std::env::remove_var("HALCYON_TEST_FLAG");
        }
        assert_eq!(EnvSignalSource::read("HALCYON_TEST_FLAG"), None);
    }
}
