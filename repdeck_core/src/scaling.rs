//! Adaptive difficulty scaling.
//!
//! Converts a static exercise definition into a player-specific target:
//! - Level 5 is the unscaled baseline (multiplier = level / 5)
//! - Rep targets never drop below 3
//! - Duration targets never drop below 10 seconds

use crate::{Error, ExerciseDefinition, ExerciseTarget, Result};

/// Difficulty level at which base values are used unchanged
pub const BASELINE_LEVEL: i32 = 5;

/// Floor for scaled rep targets
pub const MIN_REPS: u32 = 3;

/// Floor for scaled duration targets, in seconds
pub const MIN_DURATION_SECONDS: u32 = 10;

/// Nominal duration used when a definition has no base values at all
pub const DEFAULT_BASE_DURATION_SECONDS: u32 = 30;

/// Scale an exercise to a concrete target for the given difficulty level
///
/// Reps take priority whenever `base_reps` is present. Otherwise the
/// duration branch is used, defaulting to a 30 second exercise.
///
/// Never fails. Out-of-range levels are the caller's business; the floors
/// still hold for any level.
pub fn scale(exercise: &ExerciseDefinition, difficulty_level: i32) -> ExerciseTarget {
    let multiplier = difficulty_level as f64 / BASELINE_LEVEL as f64;

    if let Some(base_reps) = exercise.base_reps {
        ExerciseTarget::Reps(scaled(base_reps, multiplier, MIN_REPS))
    } else {
        let base = exercise
            .base_duration
            .unwrap_or(DEFAULT_BASE_DURATION_SECONDS);
        ExerciseTarget::Duration(scaled(base, multiplier, MIN_DURATION_SECONDS))
    }
}

/// Scale with authoring checks applied first
///
/// Zero base values are rejected. Dual-defined and undefined exercises keep
/// the fallback behavior of [`scale`] but are logged as authoring problems.
pub fn scale_checked(exercise: &ExerciseDefinition, difficulty_level: i32) -> Result<ExerciseTarget> {
    if exercise.base_reps == Some(0) || exercise.base_duration == Some(0) {
        return Err(Error::InvalidExerciseDefinition {
            exercise_id: exercise.id.clone(),
            reason: "base values must be positive".into(),
        });
    }

    match (exercise.base_reps, exercise.base_duration) {
        (Some(_), Some(_)) => tracing::warn!(
            "Exercise '{}' defines both base reps and base duration; using reps",
            exercise.id
        ),
        (None, None) => tracing::warn!(
            "Exercise '{}' defines neither base reps nor base duration; assuming {}s",
            exercise.id,
            DEFAULT_BASE_DURATION_SECONDS
        ),
        _ => {}
    }

    let target = scale(exercise, difficulty_level);
    tracing::debug!(
        "Scaled '{}' at level {} to {}",
        exercise.id,
        difficulty_level,
        target
    );
    Ok(target)
}

fn scaled(base: u32, multiplier: f64, floor: u32) -> u32 {
    let value = (base as f64 * multiplier).round();
    if value < floor as f64 {
        floor
    } else if value >= u32::MAX as f64 {
        u32::MAX
    } else {
        value as u32
    }
}

impl ExerciseDefinition {
    /// Strict authoring check: exactly one positive base value
    pub fn validate(&self) -> Result<()> {
        let reason = match (self.base_reps, self.base_duration) {
            (Some(_), Some(_)) => "both base reps and base duration are set",
            (None, None) => "neither base reps nor base duration is set",
            (Some(0), None) => "base reps must be positive",
            (None, Some(0)) => "base duration must be positive",
            _ => return Ok(()),
        };

        Err(Error::InvalidExerciseDefinition {
            exercise_id: self.id.clone(),
            reason: reason.into(),
        })
    }
}
