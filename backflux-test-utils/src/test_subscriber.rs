// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::mutex::Mutex;
use backflux_core::{BackfluxError, Result, Subscriber, Subscription};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// One recorded protocol signal.
#[derive(Debug, Clone)]
pub enum Signal<T> {
    Next(T),
    Error(BackfluxError),
    Complete,
}

/// A consumer that records every signal it receives.
///
/// It requests `initial_request` items on subscription (nothing if zero);
/// further demand is issued by the test through [`request`](Self::request).
/// Besides the signals it tracks two protocol violations: signals delivered
/// concurrently and signals delivered after a terminal one.
pub struct TestSubscriber<T> {
    initial_request: u64,
    subscription: OnceLock<Arc<dyn Subscription>>,
    subscriptions_received: AtomicUsize,
    signals: Mutex<Vec<Signal<T>>>,
    in_signal: AtomicBool,
    overlapped: AtomicBool,
    after_terminal: AtomicBool,
}

impl<T> TestSubscriber<T> {
    pub fn new(initial_request: u64) -> Arc<Self> {
        Arc::new(Self {
            initial_request,
            subscription: OnceLock::new(),
            subscriptions_received: AtomicUsize::new(0),
            signals: Mutex::new(Vec::new()),
            in_signal: AtomicBool::new(false),
            overlapped: AtomicBool::new(false),
            after_terminal: AtomicBool::new(false),
        })
    }

    /// Request `n` more items from the current subscription.
    ///
    /// # Errors
    /// Returns `BackfluxError::IllegalState` before `on_subscribe`, otherwise
    /// whatever the subscription returns.
    pub fn request(&self, n: u64) -> Result<()> {
        self.subscription
            .get()
            .ok_or_else(|| BackfluxError::illegal_state("TestSubscriber is not subscribed"))?
            .request(n)
    }

    pub fn cancel(&self) {
        if let Some(subscription) = self.subscription.get() {
            subscription.cancel();
        }
    }

    pub fn subscription(&self) -> Option<Arc<dyn Subscription>> {
        self.subscription.get().cloned()
    }

    pub fn subscriptions_received(&self) -> usize {
        self.subscriptions_received.load(Ordering::Acquire)
    }

    pub fn value_count(&self) -> usize {
        self.signals
            .lock()
            .iter()
            .filter(|signal| matches!(signal, Signal::Next(_)))
            .count()
    }

    pub fn error(&self) -> Option<BackfluxError> {
        self.signals.lock().iter().find_map(|signal| match signal {
            Signal::Error(error) => Some(error.clone()),
            _ => None,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.signals
            .lock()
            .iter()
            .any(|signal| matches!(signal, Signal::Complete))
    }

    pub fn is_terminated(&self) -> bool {
        self.signals
            .lock()
            .iter()
            .any(|signal| matches!(signal, Signal::Complete | Signal::Error(_)))
    }

    /// `true` if two signals were ever delivered at the same time.
    pub fn saw_overlap(&self) -> bool {
        self.overlapped.load(Ordering::Acquire)
    }

    /// `true` if any signal arrived after `on_error` or `on_complete`.
    pub fn saw_signal_after_terminal(&self) -> bool {
        self.after_terminal.load(Ordering::Acquire)
    }

    fn record(&self, signal: Signal<T>) {
        if self.in_signal.swap(true, Ordering::AcqRel) {
            self.overlapped.store(true, Ordering::Release);
        }

        {
            let mut signals = self.signals.lock();
            if signals
                .last()
                .is_some_and(|last| matches!(last, Signal::Complete | Signal::Error(_)))
            {
                self.after_terminal.store(true, Ordering::Release);
            }
            signals.push(signal);
        }

        self.in_signal.store(false, Ordering::Release);
    }
}

impl<T: Clone> TestSubscriber<T> {
    pub fn values(&self) -> Vec<T> {
        self.signals
            .lock()
            .iter()
            .filter_map(|signal| match signal {
                Signal::Next(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn signals(&self) -> Vec<Signal<T>> {
        self.signals.lock().clone()
    }
}

impl<T: Send> Subscriber<T> for TestSubscriber<T> {
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        self.subscriptions_received.fetch_add(1, Ordering::AcqRel);
        if self.subscription.set(Arc::clone(&subscription)).is_err() {
            subscription.cancel();
            return;
        }

        if self.initial_request > 0 {
            // Recorded as an error signal so the test sees a rejected request
            if let Err(error) = subscription.request(self.initial_request) {
                self.record(Signal::Error(error));
            }
        }
    }

    fn on_next(&self, item: T) {
        self.record(Signal::Next(item));
    }

    fn on_error(&self, error: BackfluxError) {
        self.record(Signal::Error(error));
    }

    fn on_complete(&self) {
        self.record(Signal::Complete);
    }
}
