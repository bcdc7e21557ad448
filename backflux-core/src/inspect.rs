// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Read-only diagnostics of running operators.

use crate::protocol::{Subscriber, Subscription};
use std::fmt;
use std::sync::Arc;

/// Attributes an operator may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    /// The upstream subscription
    Parent,
    /// The downstream subscriber, until a terminal signal or cancel releases it
    Consumer,
    /// Outstanding demand received from downstream
    Requested,
    /// How many items the operator can hold
    Capacity,
    /// How many items the operator currently holds
    Buffered,
    /// Whether downstream cancelled
    Cancelled,
    /// Whether a terminal signal was processed
    Terminated,
}

/// The value of an inspected [`Attr`].
///
/// `T` is the item type the operator emits downstream.
pub enum AttrValue<T> {
    Parent(Arc<dyn Subscription>),
    Consumer(Arc<dyn Subscriber<T>>),
    Count(u64),
    Flag(bool),
}

impl<T> fmt::Debug for AttrValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parent(_) => f.write_str("Parent(..)"),
            Self::Consumer(_) => f.write_str("Consumer(..)"),
            Self::Count(n) => f.debug_tuple("Count").field(n).finish(),
            Self::Flag(b) => f.debug_tuple("Flag").field(b).finish(),
        }
    }
}

/// Introspection hook implemented by operators.
///
/// Implementations must not take the operator's protected region: inspecting
/// from inside a downstream callback is allowed.
pub trait Inspectable<T> {
    /// Returns `None` when the attribute is unknown or not yet available.
    fn inspect(&self, attr: Attr) -> Option<AttrValue<T>>;

    fn inspect_count(&self, attr: Attr) -> Option<u64> {
        match self.inspect(attr)? {
            AttrValue::Count(n) => Some(n),
            _ => None,
        }
    }

    fn inspect_flag(&self, attr: Attr) -> Option<bool> {
        match self.inspect(attr)? {
            AttrValue::Flag(b) => Some(b),
            _ => None,
        }
    }
}
