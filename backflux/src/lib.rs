// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Backflux
//!
//! Demand-driven reactive streams and a size-or-time batching operator.
//!
//! ## Overview
//!
//! A [`Publisher`] pushes items to a [`Subscriber`] only as fast as the
//! subscriber requests them through its [`Subscription`]. On top of that
//! protocol, [`BufferTimeoutExt::buffer_timeout`] groups items into batches
//! that close when they reach a maximum size or when a recurring timer fires,
//! whichever comes first. One unit of downstream demand pays for one batch;
//! a batch that is ready without demand fails the stream.
//!
//! Timers run on a [`Worker`]. [`TokioWorker`] is available with the
//! `runtime-tokio` feature (on by default); tests can drive the operator on
//! virtual time with `backflux-test-utils`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use backflux::prelude::*;
//! use std::time::Duration;
//!
//! # async fn run<P: Publisher<u32>>(source: P) -> Result<()> {
//! let worker = TokioWorker::current()?;
//! let _batches: SubscriberStream<Vec<u32>> = source
//!     .buffer_timeout(100, Duration::from_millis(250), worker)?
//!     .into_stream(8);
//! # Ok(())
//! # }
//! ```

pub use backflux_buffer::{
    BufferTimeout, BufferTimeoutConfig, BufferTimeoutExt, BufferTimeoutSubscriber,
    LACK_OF_REQUESTS,
};
pub use backflux_core::{
    Attr, AttrValue, BackfluxError, EmptySubscription, Inspectable, IntoSubscriberStream,
    Publisher, Result, StreamItem, Subscriber, SubscriberStream, Subscription, UNBOUNDED,
};
pub use backflux_runtime::{Disposable, Worker};

#[cfg(feature = "runtime-tokio")]
pub use backflux_runtime::{TokioTaskHandle, TokioWorker};

/// Prelude module for convenient imports
pub mod prelude {
    pub use backflux_buffer::BufferTimeoutExt;
    pub use backflux_core::{
        BackfluxError, IntoSubscriberStream, Publisher, Result, StreamItem, Subscriber,
        SubscriberStream, Subscription,
    };
    pub use backflux_runtime::Worker;

    #[cfg(feature = "runtime-tokio")]
    pub use backflux_runtime::TokioWorker;
}
