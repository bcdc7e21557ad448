// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the backflux reactive streaming library
//!
//! Every terminal failure that travels through `Subscriber::on_error`, and every
//! protocol violation reported back to a caller, is a [`BackfluxError`].
//!
//! # Examples
//!
//! ```
//! use backflux_core::{BackfluxError, Result};
//!
//! fn request(n: u64) -> Result<()> {
//!     if n == 0 {
//!         return Err(BackfluxError::invalid_request(n));
//!     }
//!     Ok(())
//! }
//!
//! assert!(request(0).is_err());
//! ```

/// Root error type for all backflux operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackfluxError {
    /// A producer failed while generating items
    ///
    /// Operators forward it downstream unchanged.
    #[error("Stream processing error: {context}")]
    StreamProcessingError {
        /// Description of what went wrong during stream processing
        context: String,
    },

    /// An operator reached a state the protocol forbids
    ///
    /// Raised, for instance, when a batch is ready but the consumer has not
    /// authorized its emission. The message is reported verbatim.
    #[error("{message}")]
    IllegalState {
        /// Exact, user visible description of the violation
        message: String,
    },

    /// A subscriber asked for zero items
    #[error("Cannot request a non strictly positive number: {requested}")]
    InvalidRequest {
        /// The rejected amount
        requested: u64,
    },

    /// An operator was configured with an unusable parameter
    #[error("Invalid argument: {context}")]
    InvalidArgument {
        /// Which argument was rejected and why
        context: String,
    },

    /// A worker refused to schedule a task
    #[error("Scheduler rejected task: {context}")]
    SchedulerRejected {
        /// Why the worker refused
        context: String,
    },
}

impl BackfluxError {
    /// Create a stream processing error with the given context
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::StreamProcessingError {
            context: context.into(),
        }
    }

    /// Create an illegal state error whose display is exactly `message`
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    /// Reject a request for `requested` items
    #[must_use]
    pub const fn invalid_request(requested: u64) -> Self {
        Self::InvalidRequest { requested }
    }

    /// Reject a configuration parameter
    pub fn invalid_argument(context: impl Into<String>) -> Self {
        Self::InvalidArgument {
            context: context.into(),
        }
    }

    /// Report that a worker refused a task
    pub fn scheduler_rejected(context: impl Into<String>) -> Self {
        Self::SchedulerRejected {
            context: context.into(),
        }
    }

    /// Check if this error reports a protocol violation by the subscriber
    ///
    /// Both under-requesting (a ready batch without credit) and requesting
    /// zero items count as such.
    #[must_use]
    pub const fn is_demand_violation(&self) -> bool {
        matches!(
            self,
            Self::IllegalState { .. } | Self::InvalidRequest { .. }
        )
    }

    /// Check if this error indicates a permanent failure
    ///
    /// Only a rejected schedule may succeed on another worker; everything else
    /// is permanent. Nothing in backflux retries on its own.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        !matches!(self, Self::SchedulerRejected { .. })
    }
}

/// Specialized Result type for backflux operations
pub type Result<T> = std::result::Result<T, BackfluxError>;
