// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Consume a [`Publisher`] as a `futures::Stream`.
//!
//! The bridge requests `prefetch` items on subscription and one more for every
//! value the stream hands out, so the publisher never runs further ahead than
//! `prefetch` unconsumed values. Dropping the stream cancels the subscription.
//!
//! # Example
//!
//! ```rust
//! use backflux_core::{IntoSubscriberStream, Publisher, StreamItem, Subscriber, Subscription};
//! use futures::{executor::block_on, StreamExt};
//! use std::sync::Arc;
//!
//! struct Just(u32);
//!
//! struct Noop;
//! impl Subscription for Noop {
//!     fn request(&self, _n: u64) -> backflux_core::Result<()> { Ok(()) }
//!     fn cancel(&self) {}
//! }
//!
//! impl Publisher<u32> for Just {
//!     fn subscribe(self, subscriber: Arc<dyn Subscriber<u32>>) {
//!         subscriber.on_subscribe(Arc::new(Noop));
//!         subscriber.on_next(self.0);
//!         subscriber.on_complete();
//!     }
//! }
//!
//! let items: Vec<_> = block_on(Just(7).into_stream(1).collect());
//! assert_eq!(items, vec![StreamItem::Value(7)]);
//! ```

use crate::demand::UNBOUNDED;
use crate::error::BackfluxError;
use crate::protocol::{Publisher, Subscriber, Subscription};
use crate::stream_item::StreamItem;
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::Stream;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};

/// Extension trait turning any publisher into a [`SubscriberStream`].
pub trait IntoSubscriberStream<T>: Publisher<T> + Sized {
    /// Subscribe and expose the signals as a stream.
    ///
    /// A `prefetch` of zero is rejected by the protocol and surfaces as a
    /// single error item.
    fn into_stream(self, prefetch: u64) -> SubscriberStream<T>;
}

impl<P, T> IntoSubscriberStream<T> for P
where
    P: Publisher<T>,
    T: Send + 'static,
{
    fn into_stream(self, prefetch: u64) -> SubscriberStream<T> {
        let (subscriber, stream) = SubscriberStream::new(prefetch);
        self.subscribe(subscriber);
        stream
    }
}

struct StreamSubscriber<T> {
    sender: UnboundedSender<StreamItem<T>>,
    subscription: OnceLock<Arc<dyn Subscription>>,
    prefetch: u64,
}

impl<T> StreamSubscriber<T> {
    fn fail(&self, error: BackfluxError) {
        let _ = self.sender.unbounded_send(StreamItem::Error(error));
        self.sender.close_channel();
    }
}

impl<T: Send> Subscriber<T> for StreamSubscriber<T> {
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        if self.subscription.set(Arc::clone(&subscription)).is_err() {
            warn!("SubscriberStream: duplicate subscription cancelled");
            subscription.cancel();
            return;
        }

        if let Err(error) = subscription.request(self.prefetch) {
            subscription.cancel();
            self.fail(error);
        }
    }

    fn on_next(&self, item: T) {
        // The receiver may already be gone; cancellation is on its way
        let _ = self.sender.unbounded_send(StreamItem::Value(item));
    }

    fn on_error(&self, error: BackfluxError) {
        self.fail(error);
    }

    fn on_complete(&self) {
        self.sender.close_channel();
    }
}

/// A `Stream` fed by a publisher through the pull-demand protocol.
pub struct SubscriberStream<T> {
    receiver: UnboundedReceiver<StreamItem<T>>,
    subscriber: Arc<StreamSubscriber<T>>,
}

impl<T: Send + 'static> SubscriberStream<T> {
    /// Create an unattached stream and the subscriber that feeds it.
    ///
    /// Hand the subscriber to a publisher; `into_stream` does both steps.
    pub fn new(prefetch: u64) -> (Arc<dyn Subscriber<T>>, Self) {
        let (sender, receiver) = unbounded();
        let subscriber = Arc::new(StreamSubscriber {
            sender,
            subscription: OnceLock::new(),
            prefetch,
        });
        let stream = Self {
            receiver,
            subscriber: Arc::clone(&subscriber),
        };
        (subscriber, stream)
    }
}

impl<T> SubscriberStream<T> {
    /// Cancel the upstream subscription without dropping the stream.
    ///
    /// Items already delivered stay readable.
    pub fn cancel(&self) {
        if let Some(subscription) = self.subscriber.subscription.get() {
            subscription.cancel();
        }
    }
}

impl<T> Stream for SubscriberStream<T> {
    type Item = StreamItem<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = Pin::new(&mut self.receiver).poll_next(cx);

        if let Poll::Ready(Some(StreamItem::Value(_))) = &polled {
            if self.subscriber.prefetch != UNBOUNDED {
                if let Some(subscription) = self.subscriber.subscription.get() {
                    let _ = subscription.request(1);
                }
            }
        }

        polled
    }
}

impl<T> Drop for SubscriberStream<T> {
    fn drop(&mut self) {
        debug!("SubscriberStream dropped, cancelling upstream");
        self.cancel();
    }
}
