//! Progression logic for next week's prescriptions.
//!
//! This module decides how an exercise progresses from one microcycle to the
//! next:
//! - Two failing weeks in a row: lower the weight
//! - Last week assessed as hard and too heavy: lower the weight
//! - Any failure in the history: hold
//! - Otherwise: add a rep, up to a ceiling
//!
//! Poor diet or sleep turns a weight reduction into a hold.

use crate::load_math::round_prescribed_weight;
use crate::{Assessment, Difficulty, LifestyleFeedback, LoadFeel, ProgressionType, SetState, WorkingSet};
use serde::{Deserialize, Serialize};

/// Rep target of the first training week
pub const BASE_CYCLE_REPS: u32 = 8;
/// Rep ceiling for rep progression
pub const MAX_PROGRESSED_REPS: u32 = 12;
/// Multiplier applied when the weight is lowered
pub const LOWERED_WEIGHT_FACTOR: f64 = 0.9;

/// A finished week of one exercise, with the workout's lifestyle feedback
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseResult {
    pub sets: Vec<WorkingSet>,
    pub assessment: Assessment,
    pub feedback: Option<LifestyleFeedback>,
}

impl ExerciseResult {
    pub fn has_failed_set(&self) -> bool {
        self.sets.iter().any(|s| s.state == SetState::Failed)
    }
}

/// Weight and reps for every set of the next prescription
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prescription {
    pub weight: f64,
    pub reps: u32,
}

/// Rep target for a first-time prescription in a given week
pub fn get_reps_for_cycle(cycle_index: u32) -> u32 {
    (BASE_CYCLE_REPS + cycle_index).min(MAX_PROGRESSED_REPS)
}

/// Pick a progression strategy from past results (most recent last)
pub fn progression_type_for(past: &[ExerciseResult]) -> ProgressionType {
    let Some(latest) = past.last() else {
        return ProgressionType::ProgressedReps;
    };

    let lifestyle_downgrade = |lowered: ProgressionType| {
        if latest.feedback.is_some_and(|f| f.is_suboptimal()) {
            tracing::debug!("Suboptimal lifestyle feedback, keeping weight instead of lowering");
            ProgressionType::KeepProgressSuboptimalLifestyle
        } else {
            lowered
        }
    };

    let recent_failures = past.len() >= 2 && past[past.len() - 2..].iter().all(|r| r.has_failed_set());
    if recent_failures {
        return lifestyle_downgrade(ProgressionType::LoweredWeightTooManyFailures);
    }

    if latest.assessment.difficulty == Difficulty::Hard && latest.assessment.load == LoadFeel::TooHeavy {
        return lifestyle_downgrade(ProgressionType::LoweredWeightTooHeavy);
    }

    if past.iter().any(|r| r.has_failed_set()) {
        return ProgressionType::NoProgressFailure;
    }

    ProgressionType::ProgressedReps
}

/// Apply a progression strategy to the last performed set
pub fn apply_progression(kind: ProgressionType, last_reps: u32, last_set: &WorkingSet) -> Prescription {
    let prescription = match kind {
        ProgressionType::LoweredWeightTooManyFailures
        | ProgressionType::LoweredWeightTooHeavy
        | ProgressionType::RegressTooMuchVolume => Prescription {
            weight: round_prescribed_weight(last_set.weight * LOWERED_WEIGHT_FACTOR),
            reps: last_set.reps,
        },
        ProgressionType::Initial
        | ProgressionType::NoProgressFailure
        | ProgressionType::KeepProgressSuboptimalLifestyle => Prescription {
            weight: last_set.weight,
            reps: last_set.reps,
        },
        ProgressionType::ProgressedReps => Prescription {
            weight: last_set.weight,
            reps: (last_reps + 1).min(MAX_PROGRESSED_REPS),
        },
    };

    tracing::debug!(
        "{:?}: {} x {} -> {} x {}",
        kind,
        last_set.weight,
        last_set.reps,
        prescription.weight,
        prescription.reps
    );
    prescription
}

/// Swap a non-lowering decision for a volume regression
pub fn regress_for_volume(kind: ProgressionType) -> ProgressionType {
    if kind.is_lowered() {
        kind
    } else {
        ProgressionType::RegressTooMuchVolume
    }
}
