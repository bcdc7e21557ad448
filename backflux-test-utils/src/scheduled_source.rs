// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::virtual_time::{VirtualTaskHandle, VirtualTimeScheduler};
use backflux_core::demand::validate;
use backflux_core::mutex::Mutex;
use backflux_core::{BackfluxError, Publisher, Result, Subscriber, Subscription};
use backflux_runtime::{Disposable, Worker};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Emits a fixed list of items on virtual time, one every `interval`.
///
/// The schedule starts at the first request: item `i` is delivered
/// `(i + 1) * interval` later, and completion follows the last item in the
/// same step. Like an interval source it ignores the amount of demand, which
/// makes it suitable for driving demand violations.
pub struct ScheduledSource<T> {
    scheduler: VirtualTimeScheduler,
    items: Vec<T>,
    interval: Duration,
    complete: bool,
}

impl<T> ScheduledSource<T> {
    pub fn new(scheduler: VirtualTimeScheduler, items: Vec<T>, interval: Duration) -> Self {
        Self {
            scheduler,
            items,
            interval,
            complete: true,
        }
    }

    /// Stay open after the last item.
    #[must_use]
    pub fn never_complete(mut self) -> Self {
        self.complete = false;
        self
    }
}

struct ScheduledSubscription<T> {
    scheduler: VirtualTimeScheduler,
    items: Mutex<Option<Vec<T>>>,
    interval: Duration,
    complete: bool,
    subscriber: Weak<dyn Subscriber<T>>,
    cancelled: Arc<AtomicBool>,
    handles: Mutex<Vec<VirtualTaskHandle>>,
}

impl<T: Send + 'static> ScheduledSubscription<T> {
    fn start(&self, items: Vec<T>) -> Result<()> {
        let last = items.len();
        let delays = (1..=last)
            .map(|position| {
                u32::try_from(position)
                    .ok()
                    .and_then(|factor| self.interval.checked_mul(factor))
                    .ok_or_else(|| {
                        BackfluxError::invalid_argument(format!(
                            "item {position} falls past the end of the virtual clock"
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        let mut handles = Vec::with_capacity(last.max(1));

        if last == 0 && self.complete {
            let subscriber = self.subscriber.clone();
            let cancelled = Arc::clone(&self.cancelled);
            handles.push(self.scheduler.schedule(self.interval, move || {
                if let Some(subscriber) = live(&subscriber, &cancelled) {
                    subscriber.on_complete();
                }
            })?);
        }

        for (position, (item, delay)) in items.into_iter().zip(delays).enumerate() {
            let subscriber = self.subscriber.clone();
            let cancelled = Arc::clone(&self.cancelled);
            let complete = self.complete && position + 1 == last;

            handles.push(self.scheduler.schedule(delay, move || {
                let Some(subscriber) = live(&subscriber, &cancelled) else {
                    return;
                };
                subscriber.on_next(item);
                if complete && !cancelled.load(Ordering::Acquire) {
                    subscriber.on_complete();
                }
            })?);
        }

        self.handles.lock().extend(handles);
        Ok(())
    }
}

fn live<T>(
    subscriber: &Weak<dyn Subscriber<T>>,
    cancelled: &AtomicBool,
) -> Option<Arc<dyn Subscriber<T>>> {
    if cancelled.load(Ordering::Acquire) {
        None
    } else {
        subscriber.upgrade()
    }
}

impl<T: Send + 'static> Subscription for ScheduledSubscription<T> {
    fn request(&self, n: u64) -> Result<()> {
        validate(n)?;
        let items = self.items.lock().take();
        match items {
            Some(items) if !self.cancelled.load(Ordering::Acquire) => self.start(items),
            _ => Ok(()),
        }
    }

    fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            for handle in self.handles.lock().drain(..) {
                handle.dispose();
            }
        }
    }
}

impl<T: Send + 'static> Publisher<T> for ScheduledSource<T> {
    fn subscribe(self, subscriber: Arc<dyn Subscriber<T>>) {
        let subscription = Arc::new(ScheduledSubscription {
            scheduler: self.scheduler,
            items: Mutex::new(Some(self.items)),
            interval: self.interval,
            complete: self.complete,
            subscriber: Arc::downgrade(&subscriber),
            cancelled: Arc::new(AtomicBool::new(false)),
            handles: Mutex::new(Vec::new()),
        });

        subscriber.on_subscribe(subscription);
    }
}
