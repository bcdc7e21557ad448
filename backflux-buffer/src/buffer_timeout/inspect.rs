// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::subscriber::BufferTimeoutSubscriber;
use backflux_core::{Attr, AttrValue, Inspectable};
use backflux_runtime::Worker;
use std::sync::atomic::Ordering;
use std::sync::Arc;

impl<T, C, F, W> Inspectable<C> for BufferTimeoutSubscriber<T, C, F, W>
where
    W: Worker,
{
    fn inspect(&self, attr: Attr) -> Option<AttrValue<C>> {
        let value = match attr {
            Attr::Parent => AttrValue::Parent(Arc::clone(self.upstream.get()?)),
            Attr::Consumer => AttrValue::Consumer(self.actual()?),
            Attr::Requested => AttrValue::Count(self.requested.load(Ordering::Acquire)),
            Attr::Capacity => AttrValue::Count(self.config.max_size() as u64),
            Attr::Buffered => AttrValue::Count(self.index.load(Ordering::Acquire) as u64),
            Attr::Cancelled => AttrValue::Flag(self.cancelled.load(Ordering::Acquire)),
            Attr::Terminated => AttrValue::Flag(self.terminated.load(Ordering::Acquire)),
        };
        Some(value)
    }
}
