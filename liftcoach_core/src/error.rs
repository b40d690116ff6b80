//! Error types for the liftcoach_core library.

use std::io;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for liftcoach_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    // ------------------------------------------------------------------
    // Configuration / programmer errors
    // ------------------------------------------------------------------
    /// RPE outside the supported 6..=10 range
    #[error("Invalid RPE {0}: must be between 6 and 10")]
    InvalidRpe(u8),

    /// Rep target outside the RPE table rows
    #[error("Invalid rep target {0}: must be between 1 and 19")]
    InvalidReps(u32),

    /// Weight that is not a positive finite number
    #[error("Invalid weight {0}: must be a positive number")]
    InvalidWeight(f64),

    /// Priority value with no entry in the volume table
    #[error("Unknown muscle group priority {0}")]
    UnknownPriority(u8),

    /// A computation needed prior loading data that was not supplied
    #[error("Exercise {0} requires loading history for this operation")]
    MissingHistory(Uuid),

    // ------------------------------------------------------------------
    // Planning failures
    // ------------------------------------------------------------------
    /// No split strategy supports the requested day count
    #[error("No suitable split found for {0} training days")]
    NoSuitableSplit(u32),

    /// Exercise picking left a day without exercises
    #[error("No exercises could be picked for day {0}")]
    NoExercisesForDay(usize),

    /// Sets of a muscle group that no picked exercise can absorb
    #[error("No exercise could be picked for {group}, {sets} sets unassigned")]
    NoExercisesForMuscleGroup {
        group: crate::MuscleGroup,
        sets: u32,
    },

    // ------------------------------------------------------------------
    // Lifecycle validation failures
    // ------------------------------------------------------------------
    /// Exercise is not in the state the operation requires
    #[error("Exercise {exercise_id} is {actual}, expected {expected}")]
    InvalidExerciseState {
        exercise_id: Uuid,
        expected: &'static str,
        actual: &'static str,
    },

    /// Another workout is already in progress
    #[error("Workout {0} is already active")]
    WorkoutAlreadyActive(Uuid),

    /// No workout left to start in the open microcycle
    #[error("No pending workout left in the open microcycle")]
    NoPendingWorkout,

    /// Workout was completed before
    #[error("Workout {0} is already completed")]
    WorkoutAlreadyCompleted(Uuid),

    /// Workout holds an exercise that is not terminal for the week
    #[error("Workout {workout_id} cannot be completed: exercise {exercise_id} is not finished")]
    WorkoutNotFinishable { workout_id: Uuid, exercise_id: Uuid },

    /// Set changes are only allowed on pending workouts
    #[error("Workout {0} is not pending")]
    WorkoutNotPending(Uuid),

    #[error("Exercise {0} not found")]
    ExerciseNotFound(Uuid),

    #[error("Workout {0} not found")]
    WorkoutNotFound(Uuid),

    #[error("Set {set_id} not found on exercise {exercise_id}")]
    SetNotFound { exercise_id: Uuid, set_id: Uuid },

    #[error("Exercise {exercise_id} does not belong to workout {workout_id}")]
    ExerciseNotInWorkout { exercise_id: Uuid, workout_id: Uuid },

    /// Exercise was already finished for the week
    #[error("Exercise {0} is already finished")]
    ExerciseAlreadyFinished(Uuid),

    /// Pending sets disagree on their rep target
    #[error("Exercise {0} has sets with different rep targets")]
    MixedRepCounts(Uuid),

    #[error("Mesocycle has no open microcycle")]
    NoOpenMicrocycle,

    #[error("Mesocycle {0} is already finished")]
    MesocycleAlreadyFinished(Uuid),

    /// The open microcycle is the final training week
    #[error("Microcycle {index} is the last training week; finish the mesocycle instead")]
    MesocycleComplete { index: u32 },

    /// Nothing has been planned in this data directory yet
    #[error("No training block stored in {0}")]
    NoBlock(std::path::PathBuf),

    /// finish_mesocycle was not given a testing weight for an exercise
    #[error("No testing weight supplied for exercise '{0}'")]
    MissingTestingWeight(String),

    /// A new block was requested while the current one is still running
    #[error("Mesocycle {0} is still in progress")]
    BlockInProgress(Uuid),

    /// No catalog exercise is left to swap in
    #[error("No replacement available for exercise '{0}'")]
    NoReplacement(String),

    /// 1-based set number past the exercise's set count
    #[error("Exercise '{exercise}' has no set {number}")]
    NoSuchSet { exercise: String, number: u32 },

    /// Catalog id that matches nothing in the addressed scope
    #[error("Unknown exercise '{0}'")]
    UnknownExercise(String),
}
