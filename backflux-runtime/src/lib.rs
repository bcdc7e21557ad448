// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Scheduling abstraction for time-driven operators.
//!
//! Operators never spawn threads or sleep themselves: they ask a [`Worker`]
//! to run a closure later or periodically, and keep the returned
//! [`Disposable`] to stop it. Swapping the worker swaps the clock, which is
//! how tests drive operators on virtual time.
//!
//! # Runtime Support
//!
//! - `runtime-tokio` (default) - [`TokioWorker`](impls::tokio::TokioWorker)

#[macro_use]
mod logging;

pub mod impls;
pub mod worker;

pub use worker::{Disposable, Worker};

#[cfg(feature = "runtime-tokio")]
pub use impls::tokio::{TokioTaskHandle, TokioWorker};
