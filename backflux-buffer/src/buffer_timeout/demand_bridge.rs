// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The subscription handed to downstream.
//!
//! Downstream demand is counted in batches and only ever grows here; it is
//! consumed by the flush path. Element demand towards upstream is a separate
//! channel: the first valid request asks upstream for everything, because a
//! batch can only fill up if items keep flowing while batch credit is short.

use super::subscriber::BufferTimeoutSubscriber;
use backflux_core::demand::{add_cap, validate, UNBOUNDED};
use backflux_core::{Result, Subscription};
use backflux_runtime::Worker;
use std::sync::atomic::Ordering;

impl<T, C, F, W> Subscription for BufferTimeoutSubscriber<T, C, F, W>
where
    T: Send + 'static,
    C: Extend<T> + Send + 'static,
    F: Fn() -> C + Send + Sync + 'static,
    W: Worker,
{
    fn request(&self, n: u64) -> Result<()> {
        validate(n)?;
        add_cap(&self.requested, n);

        if self.is_done() {
            return Ok(());
        }

        if let Some(upstream) = self.upstream.get() {
            if !self.upstream_requested.swap(true, Ordering::AcqRel) {
                upstream.request(UNBOUNDED)?;
            }
        }

        Ok(())
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }

        debug!("buffer_timeout: cancelled by downstream");
        self.release_actual();
        if self.terminated.load(Ordering::Acquire) {
            return;
        }

        self.stop_timer();
        if let Some(upstream) = self.upstream.get() {
            upstream.cancel();
        }
    }
}
