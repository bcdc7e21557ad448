// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The pull-demand protocol between producers and consumers.
//!
//! A [`Publisher`] hands every [`Subscriber`] exactly one [`Subscription`]
//! through `on_subscribe`. The subscriber then pulls items with
//! [`Subscription::request`] and receives at most that many `on_next` calls,
//! followed by at most one terminal signal (`on_error` or `on_complete`).
//! Signals to one subscriber are never delivered concurrently.

use crate::error::{BackfluxError, Result};
use std::sync::Arc;

/// The link between one publisher and one subscriber.
pub trait Subscription: Send + Sync {
    /// Ask for `n` more items.
    ///
    /// Demand accumulates; `n == UNBOUNDED` switches the subscription to
    /// unbounded mode.
    ///
    /// # Errors
    /// Returns `BackfluxError::InvalidRequest` when `n` is zero.
    fn request(&self, n: u64) -> Result<()>;

    /// Stop the flow of items. Idempotent.
    fn cancel(&self);
}

/// Receiver of the protocol signals.
///
/// Methods take `&self`: a subscriber is shared between the producer's
/// delivery context and whatever else drives it, so implementations keep
/// their state behind interior mutability.
pub trait Subscriber<T>: Send + Sync {
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>);

    fn on_next(&self, item: T);

    fn on_error(&self, error: BackfluxError);

    fn on_complete(&self);
}

/// A source of items for exactly one subscriber per call.
pub trait Publisher<T> {
    fn subscribe(self, subscriber: Arc<dyn Subscriber<T>>);
}

/// A subscription that ignores every request.
///
/// Handed to a subscriber that must be failed before any real upstream exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySubscription;

impl Subscription for EmptySubscription {
    fn request(&self, n: u64) -> Result<()> {
        crate::demand::validate(n)
    }

    fn cancel(&self) {}
}
