// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Core traits and types shared by every backflux crate.
//!
//! - [`Publisher`], [`Subscriber`] and [`Subscription`] form the pull-demand
//!   protocol: a subscriber only receives as many items as it requested.
//! - [`demand`] holds the saturating arithmetic used to account for requests.
//! - [`Inspectable`] exposes read-only diagnostics of an operator.
//! - [`SubscriberStream`] bridges a [`Publisher`] into a `futures::Stream`.

#[macro_use]
mod logging;

pub mod cancellation_token;
pub mod demand;
pub mod error;
pub mod inspect;
pub mod mutex;
pub mod protocol;
pub mod stream_item;
pub mod subscriber_stream;

pub use self::cancellation_token::CancellationToken;
pub use self::demand::UNBOUNDED;
pub use self::error::{BackfluxError, Result};
pub use self::inspect::{Attr, AttrValue, Inspectable};
pub use self::protocol::{EmptySubscription, Publisher, Subscriber, Subscription};
pub use self::stream_item::StreamItem;
pub use self::subscriber_stream::{IntoSubscriberStream, SubscriberStream};
