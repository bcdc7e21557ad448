// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::config::BufferTimeoutConfig;
use backflux_core::demand::try_consume;
use backflux_core::mutex::Mutex;
use backflux_core::{BackfluxError, EmptySubscription, Subscriber, Subscription};
use backflux_runtime::{Disposable, Worker};
use std::iter::once;
use std::marker::PhantomData;
use std::mem::replace;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};

/// Error message of the terminal error raised when a batch is ready but
/// downstream has not requested it.
pub const LACK_OF_REQUESTS: &str = "Could not emit buffer due to lack of requests";

/// The operator sitting between upstream and the batch consumer.
///
/// Upstream delivery and the timer worker race for the active batch, so every
/// transition that can emit runs under `window`. `index` and `terminated` are
/// atomics only so that diagnostics can read them without the lock; they are
/// written exclusively while `window` is held. `requested` grows lock-free and
/// shrinks only under `window`.
///
/// The consumer holds the operator as its subscription, so `actual` is taken
/// on completion, on error and on cancel. It is never locked across a
/// downstream call.
pub struct BufferTimeoutSubscriber<T, C, F, W>
where
    W: Worker,
{
    actual: Mutex<Option<Arc<dyn Subscriber<C>>>>,
    pub(super) config: BufferTimeoutConfig,
    worker: W,
    batch_factory: F,
    window: Mutex<C>,
    pub(super) index: AtomicUsize,
    pub(super) requested: AtomicU64,
    pub(super) cancelled: AtomicBool,
    pub(super) terminated: AtomicBool,
    pub(super) upstream_requested: AtomicBool,
    pub(super) upstream: OnceLock<Arc<dyn Subscription>>,
    timer: OnceLock<W::Handle>,
    this: Weak<Self>,
    _item: PhantomData<fn(T)>,
}

impl<T, C, F, W> BufferTimeoutSubscriber<T, C, F, W>
where
    W: Worker,
{
    /// The consumer, until a terminal signal or cancel releases it.
    pub(super) fn actual(&self) -> Option<Arc<dyn Subscriber<C>>> {
        self.actual.lock().clone()
    }

    pub(super) fn release_actual(&self) -> Option<Arc<dyn Subscriber<C>>> {
        self.actual.lock().take()
    }
}

impl<T, C, F, W> BufferTimeoutSubscriber<T, C, F, W>
where
    T: Send + 'static,
    C: Extend<T> + Send + 'static,
    F: Fn() -> C + Send + Sync + 'static,
    W: Worker,
{
    /// Create the operator for one downstream subscriber.
    ///
    /// Nothing is scheduled until upstream calls `on_subscribe`.
    pub fn new(
        actual: Arc<dyn Subscriber<C>>,
        config: BufferTimeoutConfig,
        worker: W,
        batch_factory: F,
    ) -> Arc<Self> {
        let batch = batch_factory();

        Arc::new_cyclic(|this| Self {
            actual: Mutex::new(Some(actual)),
            config,
            worker,
            batch_factory,
            window: Mutex::new(batch),
            index: AtomicUsize::new(0),
            requested: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
            upstream_requested: AtomicBool::new(false),
            upstream: OnceLock::new(),
            timer: OnceLock::new(),
            this: this.clone(),
            _item: PhantomData,
        })
    }

    pub(super) fn is_done(&self) -> bool {
        self.terminated.load(Ordering::Acquire) || self.cancelled.load(Ordering::Acquire)
    }

    pub(super) fn stop_timer(&self) {
        if let Some(timer) = self.timer.get() {
            timer.dispose();
        }
    }

    fn on_timer(&self) {
        let mut window = self.window.lock();
        if self.is_done() || self.index.load(Ordering::Acquire) == 0 {
            return;
        }

        trace!(
            "buffer_timeout: timespan elapsed with {} items",
            self.index.load(Ordering::Acquire)
        );
        self.flush(&mut window);
    }

    /// Emit the active batch, consuming one unit of downstream demand.
    ///
    /// Must be called with `window` held and at least one item buffered.
    fn flush(&self, window: &mut C) {
        if !try_consume(&self.requested) {
            warn!(
                "buffer_timeout: batch of {} items ready without downstream demand",
                self.index.load(Ordering::Acquire)
            );
            self.fail(window, BackfluxError::illegal_state(LACK_OF_REQUESTS), true);
            return;
        }

        let batch = replace(window, (self.batch_factory)());
        self.index.store(0, Ordering::Release);
        if let Some(actual) = self.actual() {
            actual.on_next(batch);
        }
    }

    /// Terminal error path. Must be called with `window` held.
    fn fail(&self, window: &mut C, error: BackfluxError, cancel_upstream: bool) {
        self.terminated.store(true, Ordering::Release);
        *window = (self.batch_factory)();
        self.index.store(0, Ordering::Release);
        self.stop_timer();

        if cancel_upstream {
            if let Some(upstream) = self.upstream.get() {
                upstream.cancel();
            }
        }

        if let Some(actual) = self.release_actual() {
            actual.on_error(error);
        }
    }

    fn reject(&self, upstream: &Arc<dyn Subscription>, error: BackfluxError) {
        upstream.cancel();
        {
            let _window = self.window.lock();
            self.terminated.store(true, Ordering::Release);
        }
        if let Some(actual) = self.release_actual() {
            actual.on_subscribe(Arc::new(EmptySubscription));
            actual.on_error(error);
        }
    }
}

impl<T, C, F, W> Subscriber<T> for BufferTimeoutSubscriber<T, C, F, W>
where
    T: Send + 'static,
    C: Extend<T> + Send + 'static,
    F: Fn() -> C + Send + Sync + 'static,
    W: Worker,
{
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        if self.upstream.set(Arc::clone(&subscription)).is_err() {
            warn!("buffer_timeout: duplicate subscription cancelled");
            subscription.cancel();
            return;
        }

        if self.cancelled.load(Ordering::Acquire) {
            subscription.cancel();
            return;
        }

        let this = self.this.clone();
        let timespan = self.config.timespan();
        let scheduled = self.worker.schedule_periodically(timespan, timespan, move || {
            if let Some(this) = this.upgrade() {
                this.on_timer();
            }
        });

        match scheduled {
            Ok(handle) => {
                if let Err(handle) = self.timer.set(handle) {
                    handle.dispose();
                }
                // cancel() may have run before the handle was stored
                if self.is_done() {
                    self.stop_timer();
                }
                debug!("buffer_timeout: timer scheduled every {:?}", timespan);
            }
            Err(error) => {
                warn!("buffer_timeout: timer rejected: {}", error);
                self.reject(&subscription, error);
                return;
            }
        }

        if let (Some(this), Some(actual)) = (self.this.upgrade(), self.actual()) {
            actual.on_subscribe(this);
        }
    }

    fn on_next(&self, item: T) {
        let mut window = self.window.lock();
        if self.is_done() {
            trace!("buffer_timeout: item dropped after termination");
            return;
        }

        window.extend(once(item));
        let index = self.index.load(Ordering::Acquire) + 1;
        self.index.store(index, Ordering::Release);

        if index == self.config.max_size() {
            trace!("buffer_timeout: batch full with {} items", index);
            self.flush(&mut window);
        }
    }

    fn on_error(&self, error: BackfluxError) {
        let mut window = self.window.lock();
        if self.is_done() {
            debug!("buffer_timeout: error dropped after termination: {}", error);
            return;
        }

        self.fail(&mut window, error, false);
    }

    fn on_complete(&self) {
        let mut window = self.window.lock();
        if self.is_done() {
            return;
        }

        if self.index.load(Ordering::Acquire) > 0 {
            self.flush(&mut window);
            if self.terminated.load(Ordering::Acquire) {
                return;
            }
        }

        self.terminated.store(true, Ordering::Release);
        self.stop_timer();
        if let Some(actual) = self.release_actual() {
            actual.on_complete();
        }
    }
}

impl<T, C, F, W> Drop for BufferTimeoutSubscriber<T, C, F, W>
where
    W: Worker,
{
    fn drop(&mut self) {
        if let Some(timer) = self.timer.get() {
            timer.dispose();
        }
    }
}
