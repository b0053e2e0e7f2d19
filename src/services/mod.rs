// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod ranking;
pub mod references;

pub use ranking::rank_members;
pub use references::{ReferenceService, Selector};
