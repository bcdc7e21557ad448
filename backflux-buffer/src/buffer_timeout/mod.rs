// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Extension trait providing the `buffer_timeout` operator for publishers.
//!
//! - When a batch reaches `max_size` items it is emitted immediately.
//! - Every `timespan` (counted from subscription) a non-empty batch is emitted;
//!   an empty one is skipped and consumes no demand.
//! - On completion a trailing partial batch is emitted, then completion.
//! - On error the partial batch is discarded and the error passed through.
//! - A ready batch without outstanding downstream demand fails the stream with
//!   [`LACK_OF_REQUESTS`] and cancels upstream.

mod demand_bridge;
mod inspect;
mod subscriber;

pub use subscriber::{BufferTimeoutSubscriber, LACK_OF_REQUESTS};

use crate::config::BufferTimeoutConfig;
use backflux_core::{Publisher, Result, Subscriber};
use backflux_runtime::Worker;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Extension trait providing the [`buffer_timeout`](BufferTimeoutExt::buffer_timeout) operator.
pub trait BufferTimeoutExt<T>: Publisher<T> + Sized {
    /// Groups items into `Vec` batches closed by size or by time.
    ///
    /// # Arguments
    ///
    /// * `max_size` - Items that close a batch. Must be at least 1.
    /// * `timespan` - Period of the flush timer. Must be non-zero.
    /// * `worker` - Runs the flush timer.
    ///
    /// # Errors
    /// Returns `BackfluxError::InvalidArgument` for a zero `max_size` or `timespan`.
    fn buffer_timeout<W>(
        self,
        max_size: usize,
        timespan: Duration,
        worker: W,
    ) -> Result<BufferTimeout<Self, T, W, fn() -> Vec<T>>>
    where
        W: Worker;

    /// Like [`buffer_timeout`](BufferTimeoutExt::buffer_timeout), with batches
    /// built by `batch_factory`.
    fn buffer_timeout_with<W, C, F>(
        self,
        config: BufferTimeoutConfig,
        worker: W,
        batch_factory: F,
    ) -> BufferTimeout<Self, T, W, F>
    where
        W: Worker,
        F: Fn() -> C;
}

impl<P, T> BufferTimeoutExt<T> for P
where
    P: Publisher<T>,
{
    fn buffer_timeout<W>(
        self,
        max_size: usize,
        timespan: Duration,
        worker: W,
    ) -> Result<BufferTimeout<Self, T, W, fn() -> Vec<T>>>
    where
        W: Worker,
    {
        let config = BufferTimeoutConfig::new(max_size, timespan)?;
        Ok(self.buffer_timeout_with(config, worker, Vec::new as fn() -> Vec<T>))
    }

    fn buffer_timeout_with<W, C, F>(
        self,
        config: BufferTimeoutConfig,
        worker: W,
        batch_factory: F,
    ) -> BufferTimeout<Self, T, W, F>
    where
        W: Worker,
        F: Fn() -> C,
    {
        BufferTimeout {
            source: self,
            config,
            worker,
            batch_factory,
            _item: PhantomData,
        }
    }
}

/// A publisher of batches built from a source publisher.
///
/// Each `subscribe` creates one [`BufferTimeoutSubscriber`] and subscribes it
/// to the source.
pub struct BufferTimeout<P, T, W, F> {
    source: P,
    config: BufferTimeoutConfig,
    worker: W,
    batch_factory: F,
    _item: PhantomData<fn(T)>,
}

impl<P, T, W, F> BufferTimeout<P, T, W, F> {
    pub const fn config(&self) -> &BufferTimeoutConfig {
        &self.config
    }
}

impl<P, T, C, W, F> Publisher<C> for BufferTimeout<P, T, W, F>
where
    P: Publisher<T>,
    T: Send + 'static,
    C: Extend<T> + Send + 'static,
    F: Fn() -> C + Send + Sync + 'static,
    W: Worker,
{
    fn subscribe(self, subscriber: Arc<dyn Subscriber<C>>) {
        let operator =
            BufferTimeoutSubscriber::new(subscriber, self.config, self.worker, self.batch_factory);
        self.source.subscribe(operator);
    }
}
