// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout upsert engine.
//!
//! Pure planning step of the per-connection delivery: given one event,
//! one connection, and whatever record already exists for the
//! `(externalId, gymId)` key, decide the storage write. Applying the
//! plan is the dispatcher's job, which keeps this logic synchronous and
//! directly testable.

use crate::error::AppError;
use crate::models::{
    ConnectionRecord, EventKind, ExternalWorkout, ProviderEvent, StoredComponent, StoredWorkout,
};
use crate::time_utils::{format_utc_rfc3339, parse_flexible_date};

/// The storage write decided for one connection.
#[derive(Debug)]
pub enum WritePlan {
    Create(ExternalWorkout),
    Update {
        workout_id: String,
        record: ExternalWorkout,
    },
    Delete {
        workout_id: String,
    },
    /// Delete of a record that was never stored: succeed without a write.
    Noop,
}

/// Decide the write for one connection.
///
/// `now` becomes `updated_at` (and `received_at` on first creation);
/// updates carry the existing record's `received_at` forward untouched.
/// Publish flags are read from the connection's current autoPublish
/// configuration, not from anything on the event.
pub fn plan(
    event: &ProviderEvent,
    connection: &ConnectionRecord,
    existing: Option<&StoredWorkout>,
    now: &str,
) -> Result<WritePlan, AppError> {
    if event.event == EventKind::Deleted {
        return Ok(match existing {
            Some(stored) => WritePlan::Delete {
                workout_id: stored.id.clone(),
            },
            None => WritePlan::Noop,
        });
    }

    let conn = &connection.connection;
    let scheduled_date = parse_flexible_date(&event.workout.scheduled_date).ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid scheduledDate: {}",
            event.workout.scheduled_date
        ))
    })?;

    let components = event
        .workout
        .components
        .iter()
        .enumerate()
        .map(|(idx, c)| StoredComponent {
            id: format!("comp-{}", idx),
            component_type: c.component_type,
            title: c.title.clone(),
            description: c.description.clone(),
            scoring_type: c.scoring_type,
        })
        .collect();

    let record = ExternalWorkout {
        external_id: event.workout.external_id.clone(),
        provider_id: event.provider.id.clone(),
        provider_name: event.provider.name.clone(),
        connection_id: connection.id.clone(),
        gym_id: conn.gym_id.clone(),
        title: event.workout.title.clone(),
        description: event.workout.description.clone(),
        scheduled_date: format_utc_rfc3339(scheduled_date),
        components,
        program_name: event.workout.program_name.clone(),
        track_name: event.workout.track_name.clone(),
        difficulty: event.workout.difficulty.clone(),
        estimated_duration: event.workout.estimated_duration,
        coach_notes: event.workout.coach_notes.clone(),
        is_published: conn.auto_publish,
        published_to_group_ids: if conn.auto_publish {
            conn.target_group_ids.clone()
        } else {
            vec![]
        },
        received_at: match existing {
            Some(stored) => stored.record.received_at.clone(),
            None => now.to_string(),
        },
        updated_at: now.to_string(),
    };

    Ok(match existing {
        Some(stored) => WritePlan::Update {
            workout_id: stored.id.clone(),
            record,
        },
        None => WritePlan::Create(record),
    })
}
