// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::Result;
use std::time::Duration;

/// Handle to a scheduled task.
pub trait Disposable: Send + Sync {
    /// Stop the task. Idempotent; never waits for a running execution.
    fn dispose(&self);

    fn is_disposed(&self) -> bool;
}

/// Runs closures after a delay or at a fixed rate.
///
/// Tasks run on whatever execution context the worker owns, concurrently with
/// the caller. Implementations must not hold internal locks while a task runs:
/// the task may dispose its own handle or schedule more work.
pub trait Worker: Send + Sync + 'static {
    type Handle: Disposable + 'static;

    /// Run `task` once, `delay` from now.
    ///
    /// # Errors
    /// Returns `BackfluxError::SchedulerRejected` if the worker cannot accept work.
    fn schedule<F>(&self, delay: Duration, task: F) -> Result<Self::Handle>
    where
        F: FnOnce() + Send + 'static;

    /// Run `task` first after `initial_delay`, then every `period`.
    ///
    /// The period is measured between scheduled instants, not between the end
    /// of one run and the start of the next.
    ///
    /// # Errors
    /// Returns `BackfluxError::SchedulerRejected` if the worker cannot accept work.
    fn schedule_periodically<F>(
        &self,
        initial_delay: Duration,
        period: Duration,
        task: F,
    ) -> Result<Self::Handle>
    where
        F: FnMut() + Send + 'static;
}
