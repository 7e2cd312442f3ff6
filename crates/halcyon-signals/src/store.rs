//! The preference store: owned flags, idempotent writes, subscriptions.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::detect::SignalSource;
use crate::mirror;

/// A point-in-time read of the preference flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreferenceSnapshot {
    /// The user prefers reduced motion.
    pub reduce_motion: bool,
    /// The user or network asked for reduced data use.
    pub low_data: bool,
}

impl PreferenceSnapshot {
    /// The calm condition: heavy animation is suppressed only when BOTH
    /// flags are set. An either-or rule proved overly aggressive; this is a
    /// deliberate product decision, not an oversight.
    pub fn calm(&self) -> bool {
        self.reduce_motion && self.low_data
    }
}

type Callback = Box<dyn FnMut(PreferenceSnapshot)>;

struct Inner {
    snapshot: PreferenceSnapshot,
    subscribers: Vec<(u64, Callback)>,
    next_id: u64,
}

/// Owns the preference flags and notifies subscribers on change.
///
/// All access happens on the UI thread; the store is deliberately not `Send`.
/// Writes are idempotent: setting a flag to its current value notifies no one.
pub struct PreferenceStore {
    inner: Rc<RefCell<Inner>>,
}

/// Subscription guard; dropping it unsubscribes.
pub struct Subscription {
    inner: Weak<RefCell<Inner>>,
    id: u64,
}

impl PreferenceStore {
    /// Create a store with both flags off.
    pub fn new() -> Self {
        let store = Self {
            inner: Rc::new(RefCell::new(Inner {
                snapshot: PreferenceSnapshot::default(),
                subscribers: Vec::new(),
                next_id: 0,
            })),
        };
        mirror::write(PreferenceSnapshot::default());
        store
    }

    /// Create a store initialized from a detection source.
    ///
    /// Sources that cannot answer default to "not reduced" — absence of a
    /// detection API is an expected condition, never an error.
    pub fn from_source(source: &dyn SignalSource) -> Self {
        let store = Self::new();
        if let Some(v) = source.reduce_motion() {
            store.set_reduce_motion(v);
        }
        if let Some(v) = source.low_data() {
            store.set_low_data(v);
        }
        store
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> PreferenceSnapshot {
        self.inner.borrow().snapshot
    }

    /// Set the reduced-motion flag. No-op (no notification, no mirror write)
    /// if the value is unchanged.
    pub fn set_reduce_motion(&self, value: bool) {
        self.update(|s| {
            if s.reduce_motion == value {
                return false;
            }
            s.reduce_motion = value;
            true
        });
    }

    /// Set the low-data flag. No-op if the value is unchanged.
    pub fn set_low_data(&self, value: bool) {
        self.update(|s| {
            if s.low_data == value {
                return false;
            }
            s.low_data = value;
            true
        });
    }

    /// Subscribe to change notifications. The callback fires after every
    /// effective change until the returned guard is dropped.
    pub fn subscribe(&self, callback: impl FnMut(PreferenceSnapshot) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Box::new(callback)));
        Subscription {
            inner: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Number of live subscriptions; teardown tests assert this reaches zero.
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn update(&self, apply: impl FnOnce(&mut PreferenceSnapshot) -> bool) {
        let snapshot = {
            let mut inner = self.inner.borrow_mut();
            if !apply(&mut inner.snapshot) {
                return;
            }
            inner.snapshot
        };
        // The store is the only writer of the mirror flags.
        mirror::write(snapshot);
        log::debug!(
            "Preferences changed: reduce_motion={} low_data={}",
            snapshot.reduce_motion,
            snapshot.low_data
        );
        // Notify outside the state borrow so callbacks may read the store.
        let mut callbacks = {
            let mut inner = self.inner.borrow_mut();
            std::mem::take(&mut inner.subscribers)
        };
        for (_, cb) in callbacks.iter_mut() {
            cb(snapshot);
        }
        let mut inner = self.inner.borrow_mut();
        // Callbacks may have subscribed; keep both sets.
        callbacks.extend(inner.subscribers.drain(..));
        inner.subscribers = callbacks;
    }
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .borrow_mut()
                .subscribers
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_calm_requires_both_flags() {
        let cases = [
            (false, false, false),
            (true, false, false),
            (false, true, false),
            (true, true, true),
        ];
        for (reduce_motion, low_data, expected) in cases {
            let snap = PreferenceSnapshot {
                reduce_motion,
                low_data,
            };
            assert_eq!(snap.calm(), expected, "calm({reduce_motion},{low_data})");
        }
    }

    #[test]
    fn test_idempotent_write_notifies_at_most_once() {
        let store = PreferenceStore::new();
        let count = Rc::new(Cell::new(0u32));
        let count_in = count.clone();
        let _sub = store.subscribe(move |_| count_in.set(count_in.get() + 1));

        store.set_reduce_motion(true);
        store.set_reduce_motion(true);
        store.set_reduce_motion(true);
        assert_eq!(count.get(), 1, "same value must notify at most once");
    }

    #[test]
    fn test_change_notifies_with_new_snapshot() {
        let store = PreferenceStore::new();
        let seen = Rc::new(Cell::new(PreferenceSnapshot::default()));
        let seen_in = seen.clone();
        let _sub = store.subscribe(move |s| seen_in.set(s));

        store.set_low_data(true);
        assert!(seen.get().low_data);
        assert!(!seen.get().reduce_motion);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let store = PreferenceStore::new();
        let count = Rc::new(Cell::new(0u32));
        let count_in = count.clone();
        let sub = store.subscribe(move |_| count_in.set(count_in.get() + 1));
        assert_eq!(store.subscriber_count(), 1);

        drop(sub);
        assert_eq!(store.subscriber_count(), 0);

        store.set_low_data(true);
        assert_eq!(count.get(), 0, "dropped subscription must not fire");
    }

    #[test]
    fn test_multiple_subscribers_all_notified() {
        let store = PreferenceStore::new();
        let a = Rc::new(Cell::new(0u32));
        let b = Rc::new(Cell::new(0u32));
        let a_in = a.clone();
        let b_in = b.clone();
        let _sa = store.subscribe(move |_| a_in.set(a_in.get() + 1));
        let _sb = store.subscribe(move |_| b_in.set(b_in.get() + 1));

        store.set_reduce_motion(true);
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 1);
    }

    #[test]
    fn test_snapshot_reflects_writes() {
        let store = PreferenceStore::new();
        store.set_reduce_motion(true);
        store.set_low_data(true);
        let snap = store.snapshot();
        assert!(snap.reduce_motion);
        assert!(snap.low_data);
        assert!(snap.calm());
    }
}
