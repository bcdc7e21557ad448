// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Size-or-time batching for demand-driven streams.
//!
//! [`BufferTimeoutExt::buffer_timeout`] groups the items of a publisher into
//! batches of at most `max_size` items. A batch is emitted as soon as it is
//! full, or when the recurring `timespan` timer fires and the batch is not
//! empty, whichever comes first.
//!
//! Downstream demand counts batches, not items: every emitted batch consumes
//! exactly one unit of demand whatever its length. Upstream is asked for an
//! unbounded number of items once downstream first requests, so a full batch
//! can always form. A batch that becomes ready while downstream has no
//! outstanding demand terminates the stream with
//! `"Could not emit buffer due to lack of requests"`.
//!
//! # Example
//!
//! ```rust
//! use backflux_buffer::BufferTimeoutExt;
//! use backflux_core::{Publisher, Subscriber};
//! use backflux_test_utils::{TestPublisher, TestSubscriber, VirtualTimeScheduler};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let scheduler = VirtualTimeScheduler::new();
//! let source = TestPublisher::<u32>::new();
//! let consumer = TestSubscriber::<Vec<u32>>::new(10);
//!
//! source
//!     .clone()
//!     .buffer_timeout(3, Duration::from_millis(100), scheduler.clone())
//!     .expect("valid configuration")
//!     .subscribe(consumer.clone() as Arc<dyn Subscriber<Vec<u32>>>);
//!
//! source.next(1);
//! source.next(2);
//! source.next(3);
//! source.next(4);
//! scheduler.advance_time_by(Duration::from_millis(100));
//!
//! assert_eq!(consumer.values(), vec![vec![1, 2, 3], vec![4]]);
//! ```

#[macro_use]
mod logging;

pub mod buffer_timeout;
pub mod config;

pub use buffer_timeout::{
    BufferTimeout, BufferTimeoutExt, BufferTimeoutSubscriber, LACK_OF_REQUESTS,
};
pub use config::BufferTimeoutConfig;
