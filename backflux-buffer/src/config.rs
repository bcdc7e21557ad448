// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{BackfluxError, Result};
use std::num::NonZeroUsize;
use std::time::Duration;

/// Validated parameters of a `buffer_timeout` operator.
///
/// ```
/// use backflux_buffer::BufferTimeoutConfig;
/// use std::time::Duration;
///
/// let config = BufferTimeoutConfig::new(5, Duration::from_secs(2)).unwrap();
/// assert_eq!(config.max_size(), 5);
///
/// assert!(BufferTimeoutConfig::new(0, Duration::from_secs(2)).is_err());
/// assert!(BufferTimeoutConfig::new(5, Duration::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferTimeoutConfig {
    max_size: NonZeroUsize,
    timespan: Duration,
}

impl BufferTimeoutConfig {
    /// # Errors
    /// Returns `BackfluxError::InvalidArgument` if `max_size` or `timespan` is zero.
    pub fn new(max_size: usize, timespan: Duration) -> Result<Self> {
        let max_size = NonZeroUsize::new(max_size)
            .ok_or_else(|| BackfluxError::invalid_argument("max_size must be positive"))?;

        if timespan.is_zero() {
            return Err(BackfluxError::invalid_argument("timespan must be positive"));
        }

        Ok(Self { max_size, timespan })
    }

    /// Number of items that closes a batch.
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size.get()
    }

    /// Period of the flush timer.
    #[must_use]
    pub const fn timespan(&self) -> Duration {
        self.timespan
    }
}
