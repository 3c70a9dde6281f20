// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod dispatch;
pub mod signature;
pub mod upsert;

pub use dispatch::{DeliveryReport, DeliveryResult, DispatchService};
