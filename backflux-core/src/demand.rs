// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Demand accounting shared by publishers and operators.
//!
//! Outstanding demand is an `AtomicU64`. Increments are lock-free and
//! saturate at [`UNBOUNDED`]; once a counter is unbounded it stays unbounded.
//!
//! ```
//! use backflux_core::demand::{add_cap, try_consume, UNBOUNDED};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! let requested = AtomicU64::new(0);
//! add_cap(&requested, 2);
//! assert!(try_consume(&requested));
//! assert!(try_consume(&requested));
//! assert!(!try_consume(&requested));
//!
//! add_cap(&requested, UNBOUNDED);
//! assert!(try_consume(&requested));
//! assert_eq!(requested.load(Ordering::Acquire), UNBOUNDED);
//! ```

use crate::error::{BackfluxError, Result};
use std::sync::atomic::{AtomicU64, Ordering};

/// Sentinel for "as many as you can produce".
pub const UNBOUNDED: u64 = u64::MAX;

/// Reject zero-sized requests.
///
/// # Errors
/// Returns `BackfluxError::InvalidRequest` when `n` is zero.
pub fn validate(n: u64) -> Result<()> {
    if n == 0 {
        Err(BackfluxError::invalid_request(n))
    } else {
        Ok(())
    }
}

/// Add `n` to `requested`, saturating at [`UNBOUNDED`].
///
/// Returns the value before the addition.
pub fn add_cap(requested: &AtomicU64, n: u64) -> u64 {
    match requested.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
        if current == UNBOUNDED {
            None
        } else {
            Some(current.saturating_add(n))
        }
    }) {
        Ok(previous) | Err(previous) => previous,
    }
}

/// Take one unit of demand.
///
/// Returns `false`, leaving the counter untouched, when no demand is
/// outstanding. An unbounded counter is never decremented.
pub fn try_consume(requested: &AtomicU64) -> bool {
    requested
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| match current {
            0 => None,
            UNBOUNDED => Some(UNBOUNDED),
            n => Some(n - 1),
        })
        .is_ok()
}
