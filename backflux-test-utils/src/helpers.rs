// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::stream::StreamExt;
use futures::{FutureExt, Stream};
use std::fmt::Debug;

/// Yield to the runtime enough times for spawned tasks to catch up.
///
/// Does not advance the clock, so it is safe under `start_paused = true`.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Panics if `stream` has an element ready once pending work has settled.
///
/// A stream that has ended does not count as an emission.
pub async fn assert_no_element_emitted<S, T>(stream: &mut S)
where
    S: Stream<Item = T> + Unpin,
    T: Debug,
{
    settle().await;
    if let Some(Some(item)) = stream.next().now_or_never() {
        panic!("Unexpected element emitted, expected no output: {item:?}");
    }
}
