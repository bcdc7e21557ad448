// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::demand::{add_cap, try_consume, validate, UNBOUNDED};
use backflux_core::{BackfluxError, EmptySubscription, Subscription};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_validate_rejects_zero() {
    assert!(matches!(
        validate(0),
        Err(BackfluxError::InvalidRequest { requested: 0 })
    ));
    assert!(validate(1).is_ok());
    assert!(validate(UNBOUNDED).is_ok());
}

#[test]
fn test_add_cap_accumulates_and_returns_previous() {
    let requested = AtomicU64::new(0);

    assert_eq!(add_cap(&requested, 10), 0);
    assert_eq!(add_cap(&requested, 5), 10);
    assert_eq!(requested.load(Ordering::Acquire), 15);
}

#[test]
fn test_add_cap_saturates_at_unbounded() {
    let requested = AtomicU64::new(UNBOUNDED - 1);

    add_cap(&requested, 10);
    assert_eq!(requested.load(Ordering::Acquire), UNBOUNDED);

    add_cap(&requested, 1);
    assert_eq!(requested.load(Ordering::Acquire), UNBOUNDED);
}

#[test]
fn test_try_consume_stops_at_zero() {
    let requested = AtomicU64::new(2);

    assert!(try_consume(&requested));
    assert!(try_consume(&requested));
    assert!(!try_consume(&requested));
    assert_eq!(requested.load(Ordering::Acquire), 0);
}

#[test]
fn test_try_consume_leaves_unbounded_untouched() {
    let requested = AtomicU64::new(UNBOUNDED);

    for _ in 0..100 {
        assert!(try_consume(&requested));
    }
    assert_eq!(requested.load(Ordering::Acquire), UNBOUNDED);
}

#[test]
fn test_concurrent_add_and_consume_never_overdraw() {
    // Arrange
    let requested = Arc::new(AtomicU64::new(0));
    let consumed = Arc::new(AtomicU64::new(0));

    // Act
    thread::scope(|scope| {
        for _ in 0..4 {
            let requested = Arc::clone(&requested);
            scope.spawn(move || {
                for _ in 0..1_000 {
                    add_cap(&requested, 1);
                }
            });
        }
        for _ in 0..4 {
            let requested = Arc::clone(&requested);
            let consumed = Arc::clone(&consumed);
            scope.spawn(move || {
                for _ in 0..2_000 {
                    if try_consume(&requested) {
                        consumed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    // Assert
    let left = requested.load(Ordering::Acquire);
    assert_eq!(consumed.load(Ordering::Acquire) + left, 4_000);
}

#[test]
fn test_empty_subscription_validates_requests() {
    let subscription = EmptySubscription;

    assert!(subscription.request(3).is_ok());
    assert!(subscription.request(0).is_err());
    subscription.cancel();
}
