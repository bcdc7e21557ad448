// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::demand::{add_cap, validate};
use backflux_core::mutex::Mutex;
use backflux_core::{BackfluxError, Publisher, Result, Subscriber, Subscription};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// A hand-driven source for exactly one subscriber.
///
/// Signals are pushed by the test through [`next`](Self::next),
/// [`error`](Self::error) and [`complete`](Self::complete). Demand is
/// recorded but never enforced, so a test can push more than was requested.
pub struct TestPublisher<T> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    subscriber: Mutex<Option<Arc<dyn Subscriber<T>>>>,
    subscription: Arc<RecordingSubscription>,
}

#[derive(Default)]
struct RecordingSubscription {
    requested: AtomicU64,
    requests: Mutex<Vec<u64>>,
    cancelled: AtomicBool,
}

impl Subscription for RecordingSubscription {
    fn request(&self, n: u64) -> Result<()> {
        validate(n)?;
        add_cap(&self.requested, n);
        self.requests.lock().push(n);
        Ok(())
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

impl<T> Clone for TestPublisher<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for TestPublisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TestPublisher<T> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                subscriber: Mutex::new(None),
                subscription: Arc::new(RecordingSubscription::default()),
            }),
        }
    }

    // Cloned out so no lock is held while the subscriber runs
    fn subscriber(&self) -> Arc<dyn Subscriber<T>> {
        self.shared
            .subscriber
            .lock()
            .clone()
            .expect("TestPublisher has no subscriber")
    }

    pub fn next(&self, item: T) {
        self.subscriber().on_next(item);
    }

    pub fn error(&self, error: BackfluxError) {
        self.subscriber().on_error(error);
    }

    pub fn complete(&self) {
        self.subscriber().on_complete();
    }

    pub fn has_subscriber(&self) -> bool {
        self.shared.subscriber.lock().is_some()
    }

    /// Total demand received, saturated at `UNBOUNDED`.
    pub fn requested(&self) -> u64 {
        self.shared.subscription.requested.load(Ordering::Acquire)
    }

    /// Every individual `request(n)` received, in order.
    pub fn requests(&self) -> Vec<u64> {
        self.shared.subscription.requests.lock().clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.subscription.cancelled.load(Ordering::Acquire)
    }
}

impl<T> Publisher<T> for TestPublisher<T> {
    fn subscribe(self, subscriber: Arc<dyn Subscriber<T>>) {
        {
            let mut slot = self.shared.subscriber.lock();
            assert!(slot.is_none(), "TestPublisher supports a single subscriber");
            *slot = Some(Arc::clone(&subscriber));
        }

        subscriber.on_subscribe(Arc::clone(&self.shared.subscription) as Arc<dyn Subscription>);
    }
}
