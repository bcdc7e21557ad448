// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the backflux reactive streaming library.
//!
//! This crate is for development and testing only.
//!
//! # Key Types
//!
//! - [`VirtualTimeScheduler`] - a [`Worker`](backflux_runtime::Worker) whose clock only moves
//!   when the test advances it, so time-driven operators run deterministically.
//! - [`TestPublisher`] - a manually driven source recording the demand it receives.
//! - [`TestSubscriber`] - a consumer recording every signal, with manual requests.
//! - [`ScheduledSource`] - emits a fixed list of items at a fixed interval on virtual time.
//!
//! # Example
//!
//! ```rust
//! use backflux_core::{Publisher, Subscriber};
//! use backflux_test_utils::{ScheduledSource, TestSubscriber, VirtualTimeScheduler};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let scheduler = VirtualTimeScheduler::new();
//! let consumer = TestSubscriber::new(10);
//!
//! ScheduledSource::new(scheduler.clone(), vec![1, 2], Duration::from_millis(300))
//!     .subscribe(consumer.clone() as Arc<dyn Subscriber<i32>>);
//!
//! scheduler.advance_time_by(Duration::from_millis(300));
//! assert_eq!(consumer.values(), vec![1]);
//!
//! scheduler.advance_time_by(Duration::from_millis(300));
//! assert_eq!(consumer.values(), vec![1, 2]);
//! assert!(consumer.is_completed());
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod helpers;
pub mod scheduled_source;
pub mod test_publisher;
pub mod test_subscriber;
pub mod virtual_time;

pub use helpers::{assert_no_element_emitted, settle};
pub use scheduled_source::ScheduledSource;
pub use test_publisher::TestPublisher;
pub use test_subscriber::{Signal, TestSubscriber};
pub use virtual_time::{VirtualTaskHandle, VirtualTimeScheduler};
