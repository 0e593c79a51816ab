// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Release notification for provider-owned resources.

This differs from a channel in that subscribers are lately-bound: a barrier
set can subscribe long after the resource was created, and can unsubscribe
(by dropping its [`ReleaseSubscription`]) when its own interest ends.  The
signal fires at most once, when the provider destroys the native object.
*/

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

type Callback = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct SignalShared {
    released: AtomicBool,
    subscribers: Mutex<Vec<(u64, Callback)>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for SignalShared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalShared")
            .field("released", &self.released)
            .finish()
    }
}

/// One-shot "this resource is gone" signal, embedded in a resource provider.
///
/// Fire it with [`notify_released`](Self::notify_released) from the
/// provider's drop path.  Subscribing after the signal has fired invokes the
/// callback immediately, so a subscriber cannot miss the event.
#[derive(Debug, Default)]
pub struct ReleaseSignal {
    shared: Arc<SignalShared>,
}

impl ReleaseSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal.  Subsequent calls are no-ops.
    pub fn notify_released(&self) {
        if self.shared.released.swap(true, Ordering::AcqRel) {
            return;
        }
        let take = self
            .shared
            .subscribers
            .lock()
            .expect("Failed to lock release subscribers")
            .drain(..)
            .collect::<Vec<_>>();
        for (_, callback) in take {
            callback();
        }
    }

    pub fn is_released(&self) -> bool {
        self.shared.released.load(Ordering::Acquire)
    }

    /// Registers a callback, returning a subscription that unregisters it on
    /// drop.  If the signal already fired, the callback runs immediately and
    /// the returned subscription is inert.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> ReleaseSubscription {
        if self.is_released() {
            callback();
            return ReleaseSubscription {
                shared: Weak::new(),
                id: 0,
            };
        }
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        self.shared
            .subscribers
            .lock()
            .expect("Failed to lock release subscribers")
            .push((id, Box::new(callback)));
        ReleaseSubscription {
            shared: Arc::downgrade(&self.shared),
            id,
        }
    }
}

/// Handle for one subscriber's interest in a [`ReleaseSignal`].
#[derive(Debug)]
pub struct ReleaseSubscription {
    shared: Weak<SignalShared>,
    id: u64,
}

impl Drop for ReleaseSubscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            let mut subscribers = shared
                .subscribers
                .lock()
                .expect("Failed to lock release subscribers");
            subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn fires_once() {
        let signal = ReleaseSignal::new();
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();
        let _sub = signal.subscribe(move || {
            c.fetch_add(1, Ordering::Relaxed);
        });
        signal.notify_released();
        signal.notify_released();
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn late_subscription_fires_immediately() {
        let signal = ReleaseSignal::new();
        signal.notify_released();
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();
        let _sub = signal.subscribe(move || {
            c.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn dropped_subscription_does_not_fire() {
        let signal = ReleaseSignal::new();
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();
        let sub = signal.subscribe(move || {
            c.fetch_add(1, Ordering::Relaxed);
        });
        drop(sub);
        signal.notify_released();
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }
}
