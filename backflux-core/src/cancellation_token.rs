// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Runtime-agnostic cancellation token.
//!
//! Workers use it to stop scheduled tasks: the task awaits [`CancellationToken::cancelled`]
//! next to its timer, and disposing the task handle calls [`CancellationToken::cancel`].

use event_listener::{Event, EventListener};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Cloneable handle to a shared, one-way cancellation flag.
///
/// ```
/// use backflux_core::CancellationToken;
///
/// let token = CancellationToken::new();
/// let observer = token.clone();
///
/// assert!(token.cancel());
/// assert!(!token.cancel());
/// assert!(observer.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    shared: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    cancelled: AtomicBool,
    event: Event,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the flag and wake every waiter.
    ///
    /// Returns `true` only for the call that performed the cancellation.
    pub fn cancel(&self) -> bool {
        let first = !self.shared.cancelled.swap(true, Ordering::AcqRel);
        if first {
            self.shared.event.notify(usize::MAX);
        }
        first
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::Acquire)
    }

    /// Resolves once the token is cancelled, immediately if it already is.
    pub fn cancelled(&self) -> Cancelled<'_> {
        Cancelled {
            token: self,
            listener: None,
        }
    }
}

/// Future returned by [`CancellationToken::cancelled`].
pub struct Cancelled<'a> {
    token: &'a CancellationToken,
    listener: Option<EventListener>,
}

impl Future for Cancelled<'_> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        loop {
            if self.token.is_cancelled() {
                return Poll::Ready(());
            }

            // Register first, then re-check the flag: cancel() may run in between
            let Some(listener) = self.listener.as_mut() else {
                self.listener = Some(self.token.shared.event.listen());
                continue;
            };

            if Pin::new(listener).poll(cx).is_pending() {
                return Poll::Pending;
            }
            self.listener = None;
        }
    }
}
