//! Process-wide mirror of the preference flags.
//!
//! Non-reactive consumers (status output, crash reports) may read the mirror
//! without holding a store reference. The mirror is written exclusively by
//! [`PreferenceStore`](crate::PreferenceStore); ad hoc writers would race the
//! store's notifications and are not part of the public API.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::store::PreferenceSnapshot;

static REDUCE_MOTION: AtomicBool = AtomicBool::new(false);
static LOW_DATA: AtomicBool = AtomicBool::new(false);

/// Read the mirrored flags. May lag a notification in flight by one write;
/// reactive consumers should subscribe to the store instead.
pub fn mirror_snapshot() -> PreferenceSnapshot {
    PreferenceSnapshot {
        reduce_motion: REDUCE_MOTION.load(Ordering::Relaxed),
        low_data: LOW_DATA.load(Ordering::Relaxed),
    }
}

pub(crate) fn write(snapshot: PreferenceSnapshot) {
    REDUCE_MOTION.store(snapshot.reduce_motion, Ordering::Relaxed);
    LOW_DATA.store(snapshot.low_data, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_follows_writes() {
        write(PreferenceSnapshot {
            reduce_motion: true,
            low_data: false,
        });
        let snap = mirror_snapshot();
        assert!(snap.reduce_motion);
        assert!(!snap.low_data);

        write(PreferenceSnapshot::default());
        assert_eq!(mirror_snapshot(), PreferenceSnapshot::default());
    }
}
