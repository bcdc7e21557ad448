// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The lock every backflux operator uses for its protected region.
//!
//! `parking_lot` never poisons, so a panicking downstream callback cannot
//! wedge the operator for the other execution context.

pub use parking_lot::{Mutex, MutexGuard};
