// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_buffer::{BufferTimeoutExt, LACK_OF_REQUESTS};
use backflux_core::{BackfluxError, Publisher, Subscriber, UNBOUNDED};
use backflux_test_utils::{TestPublisher, TestSubscriber, VirtualTimeScheduler};
use std::sync::Arc;
use std::time::Duration;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn subscribe(
    source: &TestPublisher<u32>,
    consumer: &Arc<TestSubscriber<Vec<u32>>>,
    max_size: usize,
    timespan: Duration,
    scheduler: &VirtualTimeScheduler,
) -> anyhow::Result<()> {
    source
        .clone()
        .buffer_timeout(max_size, timespan, scheduler.clone())?
        .subscribe(consumer.clone() as Arc<dyn Subscriber<Vec<u32>>>);
    Ok(())
}

fn assert_lack_of_requests(consumer: &TestSubscriber<Vec<u32>>) {
    let error = consumer.error().expect("expected a terminal error");
    assert!(error.is_demand_violation());
    assert_eq!(error.to_string(), LACK_OF_REQUESTS);
    assert!(!consumer.is_completed());
}

#[test]
fn test_one_request_covers_one_batch_of_any_size() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let source = TestPublisher::new();
    let consumer = TestSubscriber::new(2);
    subscribe(&source, &consumer, 3, ms(1000), &scheduler)?;

    // Act
    for item in 1..=6 {
        source.next(item);
    }

    // Assert
    assert_eq!(consumer.values(), vec![vec![1, 2, 3], vec![4, 5, 6]]);
    assert!(consumer.error().is_none());

    Ok(())
}

#[test]
fn test_full_batch_without_credit_fails_the_stream() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let source = TestPublisher::new();
    let consumer = TestSubscriber::new(1);
    subscribe(&source, &consumer, 3, ms(1000), &scheduler)?;

    // Act
    for item in 1..=6 {
        source.next(item);
    }

    // Assert
    assert_eq!(consumer.values(), vec![vec![1, 2, 3]]);
    assert_lack_of_requests(&consumer);
    assert!(source.is_cancelled());
    assert_eq!(scheduler.pending_tasks(), 0);

    Ok(())
}

#[test]
fn test_timed_batch_without_credit_fails_the_stream() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let source = TestPublisher::new();
    let consumer = TestSubscriber::new(0);
    subscribe(&source, &consumer, 5, ms(100), &scheduler)?;
    consumer.request(1)?;

    source.next(1);
    scheduler.advance_time_by(ms(100));

    // Act
    source.next(2);
    scheduler.advance_time_by(ms(100));

    // Assert
    assert_eq!(consumer.values(), vec![vec![1]]);
    assert_lack_of_requests(&consumer);
    assert!(source.is_cancelled());

    Ok(())
}

#[test]
fn test_signals_after_a_demand_violation_are_dropped() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let source = TestPublisher::new();
    let consumer = TestSubscriber::new(0);
    subscribe(&source, &consumer, 1, ms(100), &scheduler)?;
    consumer.request(1)?;
    source.next(1);
    source.next(2);

    // Act
    source.next(3);
    source.error(BackfluxError::stream_error("late"));
    source.complete();
    scheduler.advance_time_by(ms(300));

    // Assert
    assert_eq!(consumer.values(), vec![vec![1]]);
    assert_lack_of_requests(&consumer);
    assert!(!consumer.saw_signal_after_terminal());

    Ok(())
}

#[test]
fn test_trailing_batch_at_completion_needs_credit() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let source = TestPublisher::new();
    let consumer = TestSubscriber::new(1);
    subscribe(&source, &consumer, 3, ms(1000), &scheduler)?;
    for item in 1..=4 {
        source.next(item);
    }

    // Act
    source.complete();

    // Assert
    assert_eq!(consumer.values(), vec![vec![1, 2, 3]]);
    assert_lack_of_requests(&consumer);

    Ok(())
}

#[test]
fn test_upstream_is_asked_for_everything_exactly_once() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let source = TestPublisher::new();
    let consumer = TestSubscriber::new(0);
    subscribe(&source, &consumer, 3, ms(100), &scheduler)?;

    // Assert
    assert!(source.requests().is_empty());

    // Act
    consumer.request(1)?;
    consumer.request(5)?;
    consumer.request(UNBOUNDED)?;

    // Assert
    assert_eq!(source.requests(), vec![UNBOUNDED]);

    Ok(())
}

#[test]
fn test_zero_request_is_rejected_without_terminating() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let source = TestPublisher::new();
    let consumer = TestSubscriber::new(0);
    subscribe(&source, &consumer, 2, ms(100), &scheduler)?;

    // Act
    let result = consumer.request(0);

    // Assert
    assert!(matches!(
        result,
        Err(BackfluxError::InvalidRequest { requested: 0 })
    ));
    assert!(!consumer.is_terminated());
    assert!(source.requests().is_empty());

    consumer.request(1)?;
    source.next(1);
    source.next(2);
    assert_eq!(consumer.values(), vec![vec![1, 2]]);

    Ok(())
}

#[test]
fn test_unbounded_demand_never_runs_out() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let source = TestPublisher::new();
    let consumer = TestSubscriber::new(UNBOUNDED);
    subscribe(&source, &consumer, 1, ms(100), &scheduler)?;

    // Act
    for item in 0..1_000 {
        source.next(item);
    }
    source.complete();

    // Assert
    assert_eq!(consumer.value_count(), 1_000);
    assert!(consumer.is_completed());

    Ok(())
}

#[test]
fn test_demand_accumulates_across_requests() -> anyhow::Result<()> {
    // Arrange
    let scheduler = VirtualTimeScheduler::new();
    let source = TestPublisher::new();
    let consumer = TestSubscriber::new(1);
    subscribe(&source, &consumer, 1, ms(100), &scheduler)?;

    // Act
    consumer.request(2)?;
    for item in 1..=3 {
        source.next(item);
    }

    // Assert
    assert_eq!(consumer.values(), vec![vec![1], vec![2], vec![3]]);
    assert!(consumer.error().is_none());

    source.next(4);
    assert_lack_of_requests(&consumer);

    Ok(())
}
