// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod connection;
pub mod event;
pub mod workout;

pub use connection::{
    ConnectionRecord, ConnectionStatus, GymProviderConnection, ProviderCredential,
};
pub use event::{
    ComponentType, EventKind, ProviderEvent, ProviderRef, ScoringType, WorkoutComponent,
    WorkoutPayload,
};
pub use workout::{ExternalWorkout, StoredComponent, StoredWorkout};
