// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::worker::{Disposable, Worker};
use ::tokio::runtime::Handle;
use ::tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use backflux_core::{BackfluxError, CancellationToken, Result};
use std::time::Duration;

/// Worker spawning one Tokio task per scheduled action.
///
/// Missed periodic ticks are delayed rather than replayed in a burst, so a
/// stalled runtime produces one late tick instead of many.
#[derive(Clone, Debug)]
pub struct TokioWorker {
    handle: Handle,
}

impl TokioWorker {
    /// Bind to the runtime the caller is running on.
    ///
    /// # Errors
    /// Returns `BackfluxError::SchedulerRejected` outside a Tokio runtime.
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::from_handle)
            .map_err(|e| {
                warn!("TokioWorker: no runtime available: {}", e);
                BackfluxError::scheduler_rejected(e.to_string())
            })
    }

    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

/// Disposes a task spawned by [`TokioWorker`].
#[derive(Clone, Debug)]
pub struct TokioTaskHandle {
    token: CancellationToken,
}

impl Disposable for TokioTaskHandle {
    fn dispose(&self) {
        if self.token.cancel() {
            trace!("TokioWorker: task disposed");
        }
    }

    fn is_disposed(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Worker for TokioWorker {
    type Handle = TokioTaskHandle;

    fn schedule<F>(&self, delay: Duration, task: F) -> Result<Self::Handle>
    where
        F: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        let stop = token.clone();
        let deadline = Instant::now() + delay;

        self.handle.spawn(async move {
            ::tokio::select! {
                biased;
                () = stop.cancelled() => {}
                () = sleep_until(deadline) => {
                    if !stop.is_cancelled() {
                        task();
                    }
                }
            }
        });

        Ok(TokioTaskHandle { token })
    }

    fn schedule_periodically<F>(
        &self,
        initial_delay: Duration,
        period: Duration,
        mut task: F,
    ) -> Result<Self::Handle>
    where
        F: FnMut() + Send + 'static,
    {
        if period.is_zero() {
            return Err(BackfluxError::scheduler_rejected(
                "periodic task needs a non-zero period",
            ));
        }

        let token = CancellationToken::new();
        let stop = token.clone();
        let start = Instant::now() + initial_delay;

        self.handle.spawn(async move {
            let mut ticker = interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            trace!("TokioWorker: periodic task started, period {:?}", period);
            loop {
                ::tokio::select! {
                    biased;
                    () = stop.cancelled() => break,
                    _ = ticker.tick() => {
                        if stop.is_cancelled() {
                            break;
                        }
                        task();
                    }
                }
            }
        });

        Ok(TokioTaskHandle { token })
    }
}
