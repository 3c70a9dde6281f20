// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! WodSync: webhook ingestion and fan-out for external workout programming.
//!
//! This crate receives signed programming updates from third-party
//! providers and delivers them to every gym subscribed to the sending
//! provider, with idempotent per-tenant upserts and partial-failure
//! isolation.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::DispatchService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub dispatch: DispatchService,
}
