//! Training-block aggregate.
//!
//! The aggregate owns one `Mesocycle` snapshot and the events recorded
//! against it. Every operation validates its preconditions first, builds the
//! complete list of events, and only then runs each event through the
//! reducer in `events`. A failed operation leaves both the snapshot and the
//! event list untouched.

use crate::config::Config;
use crate::events::{apply, Event};
use crate::ids::{Clock, IdGenerator};
use crate::insights::{exercise_history, get_rolling_average_volume};
use crate::load_math::{reps_for_target, round_prescribed_weight, weight_for_target};
use crate::progression::{
    apply_progression, get_reps_for_cycle, progression_type_for, regress_for_volume,
};
use crate::{
    Assessment, Error, ExerciseState, ExerciseTemplate, LifestyleFeedback, LoadingSet, Mesocycle,
    Microcycle, ProgressionType, ProvidedExercise, Result, SetState, WorkingExercise, WorkingSet,
    Workout, WorkoutState,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// Rep target of calibration sets and testing weeks
pub const CALIBRATION_REPS: u32 = 10;
/// Calibration RPE after a loading set taken to failure
pub const LOADED_RPE_AT_FAILURE: u8 = 7;
/// Calibration RPE after a loading set stopped short of failure
pub const LOADED_RPE: u8 = 8;
/// Calibration RPE after a testing set
pub const TESTED_RPE: u8 = 8;
/// RPE of working prescriptions during training weeks
pub const TRAINING_RPE: u8 = 8;

/// Per-block knobs supplied by the caller
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockSettings {
    /// Training weeks after the testing week
    pub training_weeks: u32,
    /// Multiplier applied to every computed weight
    pub load_coefficient: f64,
    pub max_rolling_sets_per_day: Option<f64>,
}

impl Default for BlockSettings {
    fn default() -> Self {
        Self {
            training_weeks: 5,
            load_coefficient: 1.0,
            max_rolling_sets_per_day: None,
        }
    }
}

impl From<&Config> for BlockSettings {
    fn from(config: &Config) -> Self {
        Self {
            training_weeks: config.progression.training_weeks,
            load_coefficient: config.athlete.load_coefficient,
            max_rolling_sets_per_day: config.progression.max_rolling_sets_per_day,
        }
    }
}

/// Lifecycle coordinator for one training block
pub struct TrainingBlockAggregate<'a> {
    block: Mesocycle,
    settings: BlockSettings,
    ids: &'a dyn IdGenerator,
    clock: &'a dyn Clock,
    events: Vec<Event>,
}

impl<'a> TrainingBlockAggregate<'a> {
    /// Wrap an existing snapshot
    pub fn load(
        block: Mesocycle,
        settings: BlockSettings,
        ids: &'a dyn IdGenerator,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            block,
            settings,
            ids,
            clock,
            events: Vec::new(),
        }
    }

    /// Instantiate a new block from an exercise template
    ///
    /// The block starts with its testing week. Exercises with a known
    /// testing weight start in `testing`, all others in `loading`.
    pub fn create_mesocycle(
        template: &ExerciseTemplate,
        known_testing_weights: &HashMap<String, f64>,
        settings: BlockSettings,
        ids: &'a dyn IdGenerator,
        clock: &'a dyn Clock,
    ) -> Result<Self> {
        if template.days.is_empty() {
            return Err(Error::NoExercisesForDay(0));
        }
        if let Some(day) = template.days.iter().position(|d| d.is_empty()) {
            return Err(Error::NoExercisesForDay(day));
        }

        let now = clock.now();
        let mesocycle_id = ids.next_id();
        let microcycle_id = ids.next_id();

        let workouts = template
            .days
            .iter()
            .enumerate()
            .map(|(day_index, day)| {
                let exercises = day
                    .iter()
                    .enumerate()
                    .map(|(order, entry)| {
                        let state = match known_testing_weights.get(entry.exercise.id()) {
                            Some(weight) => ExerciseState::Testing {
                                testing_weight: *weight,
                            },
                            None => ExerciseState::Loading,
                        };
                        WorkingExercise {
                            id: ids.next_id(),
                            created_at: now,
                            exercise: entry.exercise.to_ref(),
                            order: order as u32,
                            target_sets: entry.sets,
                            target_reps: CALIBRATION_REPS,
                            state,
                        }
                    })
                    .collect();
                Workout {
                    id: ids.next_id(),
                    microcycle_id,
                    day_index: day_index as u32,
                    state: WorkoutState::Pending,
                    active: false,
                    feedback: None,
                    exercises,
                }
            })
            .collect();

        let mesocycle = Mesocycle {
            id: mesocycle_id,
            created_at: now,
            confirmed: false,
            finished_at: None,
            terminated: false,
            microcycles: vec![Microcycle {
                id: microcycle_id,
                mesocycle_id,
                index: 0,
                created_at: now,
                finished_at: None,
                workouts,
            }],
        };

        tracing::info!(
            "Created mesocycle {} with {} workouts ({} sets) in its testing week",
            mesocycle_id,
            template.days.len(),
            template.total_sets()
        );

        let mut aggregate = Self::load(Mesocycle::default(), settings, ids, clock);
        aggregate.record(vec![Event::MesocycleCreated { mesocycle }]);
        Ok(aggregate)
    }

    pub fn block(&self) -> &Mesocycle {
        &self.block
    }

    pub fn settings(&self) -> &BlockSettings {
        &self.settings
    }

    /// Events recorded since the aggregate was loaded
    pub fn pending_events(&self) -> &[Event] {
        &self.events
    }

    /// Drain the recorded events, keeping the snapshot
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn into_parts(self) -> (Mesocycle, Vec<Event>) {
        (self.block, self.events)
    }

    pub fn confirm_mesocycle(&mut self) -> Result<()> {
        self.ensure_not_finished()?;
        if !self.block.confirmed {
            self.record(vec![Event::MesocycleConfirmed {
                mesocycle_id: self.block.id,
            }]);
        }
        Ok(())
    }

    /// Activate the lowest-index pending workout of the open week
    pub fn start_workout(&mut self) -> Result<Uuid> {
        self.ensure_not_finished()?;
        if let Some(active) = self.block.workouts().find(|w| w.active) {
            return Err(Error::WorkoutAlreadyActive(active.id));
        }
        let microcycle = self
            .block
            .open_microcycle()
            .ok_or(Error::NoOpenMicrocycle)?;
        let workout_id = microcycle
            .workouts
            .iter()
            .filter(|w| w.state == WorkoutState::Pending && !w.active)
            .min_by_key(|w| w.day_index)
            .map(|w| w.id)
            .ok_or(Error::NoPendingWorkout)?;

        self.record(vec![Event::WorkoutStarted { workout_id }]);
        tracing::info!("Started workout {}", workout_id);
        Ok(workout_id)
    }

    /// Record the weight an athlete worked up to for a `loading` exercise
    pub fn exercise_loaded(
        &mut self,
        exercise_id: Uuid,
        loading_set: LoadingSet,
        reached_failure: bool,
    ) -> Result<()> {
        self.ensure_not_finished()?;
        validate_loading_set(&loading_set)?;
        let (workout, exercise) = self.find_exercise(exercise_id)?;
        ensure_workout_pending(workout)?;
        if !matches!(exercise.state, ExerciseState::Loading) {
            return Err(invalid_state(exercise, "loading"));
        }

        let rpe = if reached_failure {
            LOADED_RPE_AT_FAILURE
        } else {
            LOADED_RPE
        };
        let sets = self.calibration_sets(&loading_set, rpe, exercise.target_sets)?;

        self.record(vec![Event::ExerciseLoaded {
            exercise_id,
            loading_set,
            reached_failure,
            sets,
        }]);
        Ok(())
    }

    /// Record the result of testing the suggested weight of a `testing` exercise
    pub fn exercise_tested(&mut self, exercise_id: Uuid, loading_set: LoadingSet) -> Result<()> {
        self.ensure_not_finished()?;
        validate_loading_set(&loading_set)?;
        let (workout, exercise) = self.find_exercise(exercise_id)?;
        ensure_workout_pending(workout)?;
        if !matches!(exercise.state, ExerciseState::Testing { .. }) {
            return Err(invalid_state(exercise, "testing"));
        }

        let sets = self.calibration_sets(&loading_set, TESTED_RPE, exercise.target_sets)?;

        self.record(vec![Event::ExerciseTested {
            exercise_id,
            loading_set,
            sets,
        }]);
        Ok(())
    }

    /// Mark one set done, failed or pending again
    pub fn set_state_has_changed(
        &mut self,
        exercise_id: Uuid,
        set_id: Uuid,
        state: SetState,
    ) -> Result<()> {
        self.ensure_not_finished()?;
        let (workout, exercise) = self.find_exercise(exercise_id)?;
        ensure_workout_pending(workout)?;
        match &exercise.state {
            ExerciseState::Pending { sets, .. }
            | ExerciseState::Loaded { sets, .. }
            | ExerciseState::Tested { sets, .. } => {
                if !sets.iter().any(|s| s.id == set_id) {
                    return Err(Error::SetNotFound {
                        exercise_id,
                        set_id,
                    });
                }
            }
            ExerciseState::Loading
            | ExerciseState::Testing { .. }
            | ExerciseState::Finished { .. } => {
                return Err(invalid_state(exercise, "pending/loaded/tested"));
            }
        }

        self.record(vec![Event::SetStateHasChanged {
            exercise_id,
            set_id,
            state,
        }]);
        Ok(())
    }

    /// Close a `pending` exercise; sets still pending count as failed
    pub fn finish_exercise(&mut self, exercise_id: Uuid, assessment: Assessment) -> Result<()> {
        self.ensure_not_finished()?;
        let (workout, exercise) = self.find_exercise(exercise_id)?;
        ensure_workout_pending(workout)?;
        let sets = match &exercise.state {
            ExerciseState::Pending { sets, .. } => sets,
            ExerciseState::Loading
            | ExerciseState::Testing { .. }
            | ExerciseState::Tested { .. }
            | ExerciseState::Loaded { .. }
            | ExerciseState::Finished { .. } => return Err(invalid_state(exercise, "pending")),
        };

        let mut events = fail_pending_sets(exercise_id, sets);
        events.push(Event::ExerciseFinished {
            exercise_id,
            assessment,
        });
        self.record(events);
        Ok(())
    }

    /// Complete a workout, optionally recording lifestyle feedback
    pub fn finish_workout(
        &mut self,
        workout_id: Uuid,
        feedback: Option<LifestyleFeedback>,
    ) -> Result<()> {
        self.ensure_not_finished()?;
        let workout = self
            .block
            .find_workout(workout_id)
            .ok_or(Error::WorkoutNotFound(workout_id))?;
        if workout.state == WorkoutState::Completed {
            return Err(Error::WorkoutAlreadyCompleted(workout_id));
        }

        let mut events = Vec::new();
        for exercise in &workout.exercises {
            match &exercise.state {
                ExerciseState::Loaded { sets, .. } | ExerciseState::Tested { sets, .. } => {
                    events.extend(fail_pending_sets(exercise.id, sets));
                }
                ExerciseState::Loading
                | ExerciseState::Testing { .. }
                | ExerciseState::Pending { .. }
                | ExerciseState::Finished { .. } => {}
            }
        }

        if let Some(open) = workout
            .exercises
            .iter()
            .find(|e| !e.state.is_terminal_for_week())
        {
            return Err(Error::WorkoutNotFinishable {
                workout_id,
                exercise_id: open.id,
            });
        }

        events.push(Event::WorkoutFinished {
            workout_id,
            feedback,
        });
        self.record(events);
        tracing::info!("Finished workout {}", workout_id);
        Ok(())
    }

    /// Close the open week and open the next one with progressed prescriptions
    pub fn extend_microcycle(&mut self) -> Result<Uuid> {
        self.ensure_not_finished()?;
        let current = self
            .block
            .open_microcycle()
            .ok_or(Error::NoOpenMicrocycle)?;
        if current.index >= self.settings.training_weeks {
            return Err(Error::MesocycleComplete {
                index: current.index,
            });
        }

        let now = self.clock.now();
        let next_index = current.index + 1;
        let regress = match (
            self.settings.max_rolling_sets_per_day,
            get_rolling_average_volume(&self.block, now),
        ) {
            (Some(max), Some(average)) if average > max => {
                tracing::info!(
                    "Rolling volume {:.1} sets/day exceeds {:.1}, regressing",
                    average,
                    max
                );
                true
            }
            _ => false,
        };

        let microcycle_id = self.ids.next_id();
        let mut workouts = Vec::with_capacity(current.workouts.len());
        for workout in &current.workouts {
            let exercises = workout
                .exercises
                .iter()
                .map(|e| self.successor(e, next_index, regress, now))
                .collect::<Result<Vec<_>>>()?;
            workouts.push(Workout {
                id: self.ids.next_id(),
                microcycle_id,
                day_index: workout.day_index,
                state: WorkoutState::Pending,
                active: false,
                feedback: None,
                exercises,
            });
        }

        let events = vec![
            Event::MicrocycleFinished {
                microcycle_id: current.id,
                finished_at: now,
            },
            Event::MicrocycleCreated {
                microcycle: Microcycle {
                    id: microcycle_id,
                    mesocycle_id: self.block.id,
                    index: next_index,
                    created_at: now,
                    finished_at: None,
                    workouts,
                },
            },
        ];
        self.record(events);
        tracing::info!("Opened microcycle {} ({})", next_index, microcycle_id);
        Ok(microcycle_id)
    }

    /// Close the block and plan its successor's testing week
    ///
    /// `last_testing_weights` maps catalog exercise ids to the weight each
    /// exercise should be tested with in the next block.
    pub fn finish_mesocycle(
        &mut self,
        last_testing_weights: &HashMap<String, f64>,
    ) -> Result<Mesocycle> {
        self.ensure_not_finished()?;
        let last = self
            .block
            .microcycles
            .last()
            .ok_or(Error::NoOpenMicrocycle)?;

        if let Some(missing) = last
            .workouts
            .iter()
            .flat_map(|w| w.exercises.iter())
            .find(|e| !last_testing_weights.contains_key(&e.exercise.id))
        {
            return Err(Error::MissingTestingWeight(missing.exercise.id.clone()));
        }

        let now = self.clock.now();
        let successor_id = self.ids.next_id();
        let microcycle_id = self.ids.next_id();
        let workouts = last
            .workouts
            .iter()
            .map(|workout| Workout {
                id: self.ids.next_id(),
                microcycle_id,
                day_index: workout.day_index,
                state: WorkoutState::Pending,
                active: false,
                feedback: None,
                exercises: workout
                    .exercises
                    .iter()
                    .map(|e| WorkingExercise {
                        id: self.ids.next_id(),
                        created_at: now,
                        exercise: e.exercise.clone(),
                        order: e.order,
                        target_sets: e.target_sets,
                        target_reps: CALIBRATION_REPS,
                        state: ExerciseState::Testing {
                            testing_weight: last_testing_weights
                                .get(&e.exercise.id)
                                .copied()
                                .unwrap_or_default(),
                        },
                    })
                    .collect(),
            })
            .collect();

        let successor = Mesocycle {
            id: successor_id,
            created_at: now,
            confirmed: false,
            finished_at: None,
            terminated: false,
            microcycles: vec![Microcycle {
                id: microcycle_id,
                mesocycle_id: successor_id,
                index: 0,
                created_at: now,
                finished_at: None,
                workouts,
            }],
        };

        let mut events = Vec::new();
        if let Some(open) = self.block.open_microcycle() {
            events.push(Event::MicrocycleFinished {
                microcycle_id: open.id,
                finished_at: now,
            });
        }
        events.push(Event::MesocycleFinished {
            mesocycle_id: self.block.id,
            finished_at: now,
            terminated: false,
        });
        events.push(Event::NextMesocyclePlanned {
            mesocycle: successor.clone(),
        });
        self.record(events);

        tracing::info!(
            "Finished mesocycle {}, planned {}",
            self.block.id,
            successor_id
        );
        Ok(successor)
    }

    /// Abort the block: fail pending sets, complete pending workouts, close everything
    pub fn terminate_mesocycle(&mut self) -> Result<()> {
        self.ensure_not_finished()?;
        let now = self.clock.now();

        let mut events = Vec::new();
        for microcycle in self.block.microcycles.iter().filter(|m| m.is_open()) {
            for workout in microcycle
                .workouts
                .iter()
                .filter(|w| w.state == WorkoutState::Pending)
            {
                for exercise in &workout.exercises {
                    events.extend(fail_pending_sets(exercise.id, exercise.state.sets()));
                }
                events.push(Event::WorkoutFinished {
                    workout_id: workout.id,
                    feedback: None,
                });
            }
            events.push(Event::MicrocycleFinished {
                microcycle_id: microcycle.id,
                finished_at: now,
            });
        }
        events.push(Event::MesocycleFinished {
            mesocycle_id: self.block.id,
            finished_at: now,
            terminated: true,
        });

        self.record(events);
        tracing::warn!("Terminated mesocycle {}", self.block.id);
        Ok(())
    }

    /// Swap an exercise for a catalog candidate
    ///
    /// `history` is the candidate's most recent loading set, if any.
    pub fn replace_exercise(
        &mut self,
        exercise_id: Uuid,
        candidate: &ProvidedExercise,
        workout_id: Uuid,
        history: Option<LoadingSet>,
    ) -> Result<Uuid> {
        self.ensure_not_finished()?;
        let workout = self
            .block
            .find_workout(workout_id)
            .ok_or(Error::WorkoutNotFound(workout_id))?;
        ensure_workout_pending(workout)?;
        let exercise = workout
            .exercises
            .iter()
            .find(|e| e.id == exercise_id)
            .ok_or(Error::ExerciseNotInWorkout {
                exercise_id,
                workout_id,
            })?;

        let coefficient = self.settings.load_coefficient;
        let (target_reps, state) = match &exercise.state {
            ExerciseState::Finished { .. } => {
                return Err(Error::ExerciseAlreadyFinished(exercise_id))
            }
            ExerciseState::Pending { progression, sets } => match history {
                Some(history) => {
                    let reps = uniform_reps(exercise_id, sets, exercise.target_reps)?;
                    let weight = round_prescribed_weight(weight_for_target(
                        &history,
                        reps,
                        TRAINING_RPE,
                        coefficient,
                    )?);
                    (
                        reps,
                        ExerciseState::Pending {
                            progression: *progression,
                            sets: self.fresh_sets(sets.len() as u32, reps, weight),
                        },
                    )
                }
                None => (CALIBRATION_REPS, ExerciseState::Loading),
            },
            ExerciseState::Loading
            | ExerciseState::Testing { .. }
            | ExerciseState::Tested { .. }
            | ExerciseState::Loaded { .. } => match history {
                Some(history) => (
                    CALIBRATION_REPS,
                    ExerciseState::Testing {
                        testing_weight: round_prescribed_weight(weight_for_target(
                            &history,
                            CALIBRATION_REPS,
                            TESTED_RPE,
                            coefficient,
                        )?),
                    },
                ),
                None => (CALIBRATION_REPS, ExerciseState::Loading),
            },
        };

        let replacement = WorkingExercise {
            id: self.ids.next_id(),
            created_at: self.clock.now(),
            exercise: candidate.to_ref(),
            order: exercise.order,
            target_sets: exercise.target_sets,
            target_reps,
            state,
        };
        let replacement_id = replacement.id;

        tracing::info!(
            "Replacing {} with {} ({})",
            exercise.exercise.id,
            candidate.id(),
            replacement.state.name()
        );
        self.record(vec![Event::ExerciseReplaced {
            workout_id,
            exercise_id,
            replacement,
        }]);
        Ok(replacement_id)
    }

    /// Change the prescribed weight of a `pending` or `testing` exercise
    ///
    /// Pending exercises get a new rep target from the inverse RPE lookup,
    /// which needs the exercise's loading `history`.
    pub fn exercise_weight_changed(
        &mut self,
        exercise_id: Uuid,
        weight: f64,
        history: Option<LoadingSet>,
    ) -> Result<()> {
        self.ensure_not_finished()?;
        validate_weight(weight)?;
        let (_, exercise) = self.find_exercise(exercise_id)?;

        let mut events = Vec::new();
        match &exercise.state {
            ExerciseState::Pending { .. } => {
                let history = history.ok_or(Error::MissingHistory(exercise_id))?;
                let reps = reps_for_target(&history, weight, TRAINING_RPE)?;
                if reps != exercise.target_reps {
                    events.push(Event::ExerciseRepsChanged { exercise_id, reps });
                }
            }
            ExerciseState::Testing { .. } => {}
            ExerciseState::Loading
            | ExerciseState::Tested { .. }
            | ExerciseState::Loaded { .. }
            | ExerciseState::Finished { .. } => {
                return Err(invalid_state(exercise, "pending/testing"));
            }
        }
        events.push(Event::ExerciseWeightChanged {
            exercise_id,
            weight,
        });

        self.record(events);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn record(&mut self, events: Vec<Event>) {
        for event in events {
            tracing::debug!("Recording {}", event.name());
            let block = std::mem::take(&mut self.block);
            self.block = apply(block, &event);
            self.events.push(event);
        }
    }

    fn ensure_not_finished(&self) -> Result<()> {
        if self.block.is_finished() {
            return Err(Error::MesocycleAlreadyFinished(self.block.id));
        }
        Ok(())
    }

    fn find_exercise(&self, exercise_id: Uuid) -> Result<(&Workout, &WorkingExercise)> {
        self.block
            .find_exercise(exercise_id)
            .ok_or(Error::ExerciseNotFound(exercise_id))
    }

    fn fresh_sets(&self, count: u32, reps: u32, weight: f64) -> Vec<WorkingSet> {
        (0..count)
            .map(|order| WorkingSet {
                id: self.ids.next_id(),
                state: SetState::Pending,
                order,
                reps,
                weight,
            })
            .collect()
    }

    fn calibration_sets(
        &self,
        loading_set: &LoadingSet,
        rpe: u8,
        count: u32,
    ) -> Result<Vec<WorkingSet>> {
        let weight = round_prescribed_weight(weight_for_target(
            loading_set,
            CALIBRATION_REPS,
            rpe,
            self.settings.load_coefficient,
        )?);
        Ok(self.fresh_sets(count, CALIBRATION_REPS, weight))
    }

    /// Next week's version of an exercise
    fn successor(
        &self,
        exercise: &WorkingExercise,
        next_index: u32,
        regress: bool,
        now: DateTime<Utc>,
    ) -> Result<WorkingExercise> {
        let (target_reps, state) = match &exercise.state {
            ExerciseState::Loading => (exercise.target_reps, ExerciseState::Loading),
            ExerciseState::Testing { testing_weight } => (
                exercise.target_reps,
                ExerciseState::Testing {
                    testing_weight: *testing_weight,
                },
            ),
            ExerciseState::Loaded { loading_set, .. } | ExerciseState::Tested { loading_set, .. } => {
                let reps = get_reps_for_cycle(next_index);
                let weight = round_prescribed_weight(weight_for_target(
                    loading_set,
                    reps,
                    TRAINING_RPE,
                    self.settings.load_coefficient,
                )?);
                (
                    reps,
                    ExerciseState::Pending {
                        progression: ProgressionType::Initial,
                        sets: self.fresh_sets(exercise.target_sets, reps, weight),
                    },
                )
            }
            ExerciseState::Pending { progression, sets } => (
                exercise.target_reps,
                ExerciseState::Pending {
                    progression: *progression,
                    sets: sets
                        .iter()
                        .map(|s| WorkingSet {
                            id: self.ids.next_id(),
                            state: SetState::Pending,
                            ..s.clone()
                        })
                        .collect(),
                },
            ),
            ExerciseState::Finished { sets, .. } => {
                let last_set = sets
                    .iter()
                    .max_by_key(|s| s.order)
                    .ok_or(Error::MissingHistory(exercise.id))?;
                let history = exercise_history(&self.block, &exercise.exercise.id);
                let mut kind = progression_type_for(&history);
                if regress {
                    kind = regress_for_volume(kind);
                }
                let next = apply_progression(kind, exercise.target_reps, last_set);
                (
                    next.reps,
                    ExerciseState::Pending {
                        progression: kind,
                        sets: self.fresh_sets(exercise.target_sets, next.reps, next.weight),
                    },
                )
            }
        };

        Ok(WorkingExercise {
            id: self.ids.next_id(),
            created_at: now,
            exercise: exercise.exercise.clone(),
            order: exercise.order,
            target_sets: exercise.target_sets,
            target_reps,
            state,
        })
    }
}

fn invalid_state(exercise: &WorkingExercise, expected: &'static str) -> Error {
    Error::InvalidExerciseState {
        exercise_id: exercise.id,
        expected,
        actual: exercise.state.name(),
    }
}

fn validate_weight(weight: f64) -> Result<()> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidWeight(weight))
    }
}

fn validate_loading_set(loading_set: &LoadingSet) -> Result<()> {
    if loading_set.reps == 0 {
        return Err(Error::InvalidReps(0));
    }
    validate_weight(loading_set.weight)
}

fn ensure_workout_pending(workout: &Workout) -> Result<()> {
    match workout.state {
        WorkoutState::Pending => Ok(()),
        WorkoutState::Completed => Err(Error::WorkoutNotPending(workout.id)),
    }
}

fn fail_pending_sets(exercise_id: Uuid, sets: &[WorkingSet]) -> Vec<Event> {
    sets.iter()
        .filter(|s| s.state == SetState::Pending)
        .map(|s| Event::SetStateHasChanged {
            exercise_id,
            set_id: s.id,
            state: SetState::Failed,
        })
        .collect()
}

/// The single rep count shared by every set
fn uniform_reps(exercise_id: Uuid, sets: &[WorkingSet], fallback: u32) -> Result<u32> {
    let Some(first) = sets.first() else {
        return Ok(fallback);
    };
    if sets.iter().any(|s| s.reps != first.reps) {
        return Err(Error::MixedRepCounts(exercise_id));
    }
    Ok(first.reps)
}
