// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A [`Worker`] driven by a manually advanced clock.
//!
//! Nothing runs until the test calls [`VirtualTimeScheduler::advance_time_by`];
//! due tasks then run on the calling thread in order of their due instant,
//! ties broken by scheduling order.

use backflux_core::mutex::Mutex;
use backflux_core::{BackfluxError, Result};
use backflux_runtime::{Disposable, Worker};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

enum Action {
    Once(Box<dyn FnOnce() + Send>),
    Every {
        period: Duration,
        task: Box<dyn FnMut() + Send>,
    },
}

struct Entry {
    action: Action,
    disposed: Arc<AtomicBool>,
}

#[derive(Default)]
struct SchedulerState {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Entry>,
    shut_down: bool,
}

impl SchedulerState {
    fn insert(&mut self, at: Duration, entry: Entry) {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.insert((at, id), entry);
    }

    fn pop_due(&mut self, target: Duration) -> Option<(Duration, Entry)> {
        let due = self
            .queue
            .first_key_value()
            .is_some_and(|(&(at, _), _)| at <= target);

        if !due {
            self.now = self.now.max(target);
            return None;
        }

        let ((at, _), entry) = self.queue.pop_first()?;
        self.now = self.now.max(at);
        Some((at, entry))
    }
}

/// Cloneable handle to one virtual clock and its task queue.
///
/// Time starts at zero and is reported as the elapsed [`Duration`].
#[derive(Clone, Default)]
pub struct VirtualTimeScheduler {
    state: Arc<Mutex<SchedulerState>>,
}

/// Handle to a task on a [`VirtualTimeScheduler`].
#[derive(Clone, Debug)]
pub struct VirtualTaskHandle {
    disposed: Arc<AtomicBool>,
}

impl Disposable for VirtualTaskHandle {
    fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl VirtualTimeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Move the clock forward by `delta`, running every task that falls due.
    pub fn advance_time_by(&self, delta: Duration) {
        let target = self.now() + delta;
        self.advance_time_to(target);
    }

    /// Move the clock to `target`, running every task due at or before it.
    ///
    /// Tasks scheduled by running tasks are honoured if they fall due before
    /// `target`. Moving backwards is a no-op.
    pub fn advance_time_to(&self, target: Duration) {
        loop {
            // The lock is released before the task runs: tasks may schedule or dispose
            let Some((at, entry)) = self.state.lock().pop_due(target) else {
                break;
            };

            if entry.disposed.load(Ordering::Acquire) {
                continue;
            }

            match entry.action {
                Action::Once(task) => task(),
                Action::Every { period, mut task } => {
                    task();
                    if !entry.disposed.load(Ordering::Acquire) {
                        let mut state = self.state.lock();
                        if let (false, Some(next)) = (state.shut_down, at.checked_add(period)) {
                            state.insert(
                                next,
                                Entry {
                                    action: Action::Every { period, task },
                                    disposed: entry.disposed,
                                },
                            );
                        }
                    }
                }
            }
        }
    }

    /// Number of scheduled tasks that have not been disposed.
    pub fn pending_tasks(&self) -> usize {
        self.state
            .lock()
            .queue
            .values()
            .filter(|entry| !entry.disposed.load(Ordering::Acquire))
            .count()
    }

    /// Drop every pending task and reject all future ones.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        state.shut_down = true;
        state.queue.clear();
    }

    fn enqueue(&self, delay: Duration, action: Action) -> Result<VirtualTaskHandle> {
        let mut state = self.state.lock();
        if state.shut_down {
            return Err(BackfluxError::scheduler_rejected(
                "virtual time scheduler is shut down",
            ));
        }

        let Some(at) = state.now.checked_add(delay) else {
            return Err(BackfluxError::scheduler_rejected(format!(
                "delay of {delay:?} overflows the virtual clock"
            )));
        };

        let disposed = Arc::new(AtomicBool::new(false));
        state.insert(
            at,
            Entry {
                action,
                disposed: Arc::clone(&disposed),
            },
        );

        Ok(VirtualTaskHandle { disposed })
    }
}

impl Worker for VirtualTimeScheduler {
    type Handle = VirtualTaskHandle;

    fn schedule<F>(&self, delay: Duration, task: F) -> Result<Self::Handle>
    where
        F: FnOnce() + Send + 'static,
    {
        self.enqueue(delay, Action::Once(Box::new(task)))
    }

    fn schedule_periodically<F>(
        &self,
        initial_delay: Duration,
        period: Duration,
        task: F,
    ) -> Result<Self::Handle>
    where
        F: FnMut() + Send + 'static,
    {
        if period.is_zero() {
            return Err(BackfluxError::scheduler_rejected(
                "periodic task needs a non-zero period",
            ));
        }

        self.enqueue(
            initial_delay,
            Action::Every {
                period,
                task: Box::new(task),
            },
        )
    }
}
