//! Domain events and the reducer that applies them.
//!
//! Every event carries everything needed to replay its state change on its
//! own: ids and calibration sets are generated before the event is built, so
//! `apply` is a pure function of the snapshot and the event.

use crate::{
    Assessment, ExerciseState, LifestyleFeedback, LoadingSet, Mesocycle, Microcycle, SetState,
    WorkingExercise, WorkingSet, WorkoutState,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Event {
    MesocycleCreated {
        mesocycle: Mesocycle,
    },
    MesocycleConfirmed {
        mesocycle_id: Uuid,
    },
    WorkoutStarted {
        workout_id: Uuid,
    },
    ExerciseLoaded {
        exercise_id: Uuid,
        loading_set: LoadingSet,
        reached_failure: bool,
        sets: Vec<WorkingSet>,
    },
    ExerciseTested {
        exercise_id: Uuid,
        loading_set: LoadingSet,
        sets: Vec<WorkingSet>,
    },
    SetStateHasChanged {
        exercise_id: Uuid,
        set_id: Uuid,
        state: SetState,
    },
    ExerciseFinished {
        exercise_id: Uuid,
        assessment: Assessment,
    },
    WorkoutFinished {
        workout_id: Uuid,
        feedback: Option<LifestyleFeedback>,
    },
    MicrocycleFinished {
        microcycle_id: Uuid,
        finished_at: DateTime<Utc>,
    },
    MicrocycleCreated {
        microcycle: Microcycle,
    },
    MesocycleFinished {
        mesocycle_id: Uuid,
        finished_at: DateTime<Utc>,
        #[serde(default)]
        terminated: bool,
    },
    /// Successor block built when a block finishes; persisted by the caller
    NextMesocyclePlanned {
        mesocycle: Mesocycle,
    },
    ExerciseReplaced {
        workout_id: Uuid,
        exercise_id: Uuid,
        replacement: WorkingExercise,
    },
    ExerciseRepsChanged {
        exercise_id: Uuid,
        reps: u32,
    },
    ExerciseWeightChanged {
        exercise_id: Uuid,
        weight: f64,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::MesocycleCreated { .. } => "MesocycleCreated",
            Event::MesocycleConfirmed { .. } => "MesocycleConfirmed",
            Event::WorkoutStarted { .. } => "WorkoutStarted",
            Event::ExerciseLoaded { .. } => "ExerciseLoaded",
            Event::ExerciseTested { .. } => "ExerciseTested",
            Event::SetStateHasChanged { .. } => "SetStateHasChanged",
            Event::ExerciseFinished { .. } => "ExerciseFinished",
            Event::WorkoutFinished { .. } => "WorkoutFinished",
            Event::MicrocycleFinished { .. } => "MicrocycleFinished",
            Event::MicrocycleCreated { .. } => "MicrocycleCreated",
            Event::MesocycleFinished { .. } => "MesocycleFinished",
            Event::NextMesocyclePlanned { .. } => "NextMesocyclePlanned",
            Event::ExerciseReplaced { .. } => "ExerciseReplaced",
            Event::ExerciseRepsChanged { .. } => "ExerciseRepsChanged",
            Event::ExerciseWeightChanged { .. } => "ExerciseWeightChanged",
        }
    }
}

/// Apply one event to a snapshot, returning the next snapshot
///
/// Events that reference entities missing from the snapshot leave it
/// unchanged.
pub fn apply(mut block: Mesocycle, event: &Event) -> Mesocycle {
    match event {
        Event::MesocycleCreated { mesocycle } => return mesocycle.clone(),
        Event::MesocycleConfirmed { mesocycle_id } => {
            if block.id == *mesocycle_id {
                block.confirmed = true;
            }
        }
        Event::WorkoutStarted { workout_id } => {
            if let Some(workout) = block.workout_mut(*workout_id) {
                workout.active = true;
            }
        }
        Event::ExerciseLoaded {
            exercise_id,
            loading_set,
            reached_failure,
            sets,
        } => {
            if let Some(exercise) = block.exercise_mut(*exercise_id) {
                set_calibration_target(exercise, sets);
                exercise.state = ExerciseState::Loaded {
                    loading_set: *loading_set,
                    reached_failure: *reached_failure,
                    sets: sets.clone(),
                };
            }
        }
        Event::ExerciseTested {
            exercise_id,
            loading_set,
            sets,
        } => {
            if let Some(exercise) = block.exercise_mut(*exercise_id) {
                set_calibration_target(exercise, sets);
                exercise.state = ExerciseState::Tested {
                    loading_set: *loading_set,
                    sets: sets.clone(),
                };
            }
        }
        Event::SetStateHasChanged {
            exercise_id,
            set_id,
            state,
        } => {
            if let Some(set) = block
                .exercise_mut(*exercise_id)
                .and_then(|e| e.state.sets_mut())
                .and_then(|sets| sets.iter_mut().find(|s| s.id == *set_id))
            {
                set.state = *state;
            }
        }
        Event::ExerciseFinished {
            exercise_id,
            assessment,
        } => {
            if let Some(exercise) = block.exercise_mut(*exercise_id) {
                let sets = exercise.state.sets().to_vec();
                exercise.state = ExerciseState::Finished {
                    sets,
                    assessment: *assessment,
                };
            }
        }
        Event::WorkoutFinished {
            workout_id,
            feedback,
        } => {
            if let Some(workout) = block.workout_mut(*workout_id) {
                workout.state = WorkoutState::Completed;
                workout.active = false;
                if feedback.is_some() {
                    workout.feedback = *feedback;
                }
            }
        }
        Event::MicrocycleFinished {
            microcycle_id,
            finished_at,
        } => {
            if let Some(micro) = block
                .microcycles
                .iter_mut()
                .find(|m| m.id == *microcycle_id)
            {
                micro.finished_at = Some(*finished_at);
                for workout in &mut micro.workouts {
                    workout.active = false;
                }
            }
        }
        Event::MicrocycleCreated { microcycle } => {
            if microcycle.mesocycle_id == block.id {
                block.microcycles.push(microcycle.clone());
            }
        }
        Event::MesocycleFinished {
            mesocycle_id,
            finished_at,
            terminated,
        } => {
            if block.id == *mesocycle_id {
                block.finished_at = Some(*finished_at);
                block.terminated = *terminated;
            }
        }
        Event::NextMesocyclePlanned { .. } => {}
        Event::ExerciseReplaced {
            workout_id,
            exercise_id,
            replacement,
        } => {
            if let Some(slot) = block
                .workout_mut(*workout_id)
                .and_then(|w| w.exercises.iter_mut().find(|e| e.id == *exercise_id))
            {
                *slot = replacement.clone();
            }
        }
        Event::ExerciseRepsChanged { exercise_id, reps } => {
            if let Some(exercise) = block.exercise_mut(*exercise_id) {
                exercise.target_reps = *reps;
                if let Some(sets) = exercise.state.sets_mut() {
                    for set in sets.iter_mut().filter(|s| s.state == SetState::Pending) {
                        set.reps = *reps;
                    }
                }
            }
        }
        Event::ExerciseWeightChanged {
            exercise_id,
            weight,
        } => {
            if let Some(exercise) = block.exercise_mut(*exercise_id) {
                match &mut exercise.state {
                    ExerciseState::Testing { testing_weight } => *testing_weight = *weight,
                    ExerciseState::Pending { sets, .. } => {
                        for set in sets.iter_mut().filter(|s| s.state == SetState::Pending) {
                            set.weight = *weight;
                        }
                    }
                    ExerciseState::Loading
                    | ExerciseState::Tested { .. }
                    | ExerciseState::Loaded { .. }
                    | ExerciseState::Finished { .. } => {}
                }
            }
        }
    }
    block
}

fn set_calibration_target(exercise: &mut WorkingExercise, sets: &[WorkingSet]) {
    if let Some(first) = sets.first() {
        exercise.target_reps = first.reps;
    }
}

/// Rebuild a block from its full event history
///
/// A successor block's journal starts with the `NextMesocyclePlanned` event
/// of its predecessor. Returns `None` until a creating event is seen.
pub fn replay<'a>(events: impl IntoIterator<Item = &'a Event>) -> Option<Mesocycle> {
    events.into_iter().fold(None, |block, event| match (block, event) {
        (_, Event::MesocycleCreated { mesocycle }) => Some(mesocycle.clone()),
        (None, Event::NextMesocyclePlanned { mesocycle }) => Some(mesocycle.clone()),
        (Some(block), event) => Some(apply(block, event)),
        (None, event) => {
            tracing::warn!("Skipping {} before MesocycleCreated", event.name());
            None
        }
    })
}
