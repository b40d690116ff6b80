//! Core domain types for the liftcoach system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Muscle groups, experience levels and movement patterns
//! - Catalog entries and planning artifacts (volume map, split, template)
//! - The training block tree: mesocycle → microcycle → workout → exercise → set

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Muscle Groups and Experience
// ============================================================================

/// Muscle group trained by an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    SideDelts,
    RearDelts,
    Biceps,
    Triceps,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
}

/// Anatomical region used to widen replacement candidates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyPart {
    Chest,
    Back,
    Shoulders,
    Arms,
    Legs,
    Calves,
}

impl MuscleGroup {
    /// All muscle groups for iteration
    pub fn all() -> &'static [MuscleGroup] {
        &[
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::SideDelts,
            MuscleGroup::RearDelts,
            MuscleGroup::Biceps,
            MuscleGroup::Triceps,
            MuscleGroup::Quads,
            MuscleGroup::Hamstrings,
            MuscleGroup::Glutes,
            MuscleGroup::Calves,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::SideDelts => "side_delts",
            MuscleGroup::RearDelts => "rear_delts",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Quads => "quads",
            MuscleGroup::Hamstrings => "hamstrings",
            MuscleGroup::Glutes => "glutes",
            MuscleGroup::Calves => "calves",
        }
    }

    pub fn body_part(&self) -> BodyPart {
        match self {
            MuscleGroup::Chest => BodyPart::Chest,
            MuscleGroup::Back => BodyPart::Back,
            MuscleGroup::SideDelts | MuscleGroup::RearDelts => BodyPart::Shoulders,
            MuscleGroup::Biceps | MuscleGroup::Triceps => BodyPart::Arms,
            MuscleGroup::Quads | MuscleGroup::Hamstrings | MuscleGroup::Glutes => BodyPart::Legs,
            MuscleGroup::Calves => BodyPart::Calves,
        }
    }

    /// Other muscle groups sharing this group's body part
    pub fn related(&self) -> Vec<MuscleGroup> {
        let part = self.body_part();
        MuscleGroup::all()
            .iter()
            .copied()
            .filter(|g| g != self && g.body_part() == part)
            .collect()
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MuscleGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MuscleGroup::all()
            .iter()
            .copied()
            .find(|g| g.as_str() == s.to_lowercase().replace('-', "_"))
            .ok_or_else(|| format!("Unknown muscle group: {}", s))
    }
}

/// Training experience of the athlete, ordered from least to most
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    None,
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl std::str::FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(ExperienceLevel::None),
            "beginner" => Ok(ExperienceLevel::Beginner),
            "intermediate" => Ok(ExperienceLevel::Intermediate),
            "advanced" => Ok(ExperienceLevel::Advanced),
            "expert" => Ok(ExperienceLevel::Expert),
            other => Err(format!("Unknown experience level: {}", other)),
        }
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Sub-classification of exercises within a muscle group
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MovementPattern {
    HorizontalPress,
    InclinePress,
    ChestFly,
    VerticalPull,
    HorizontalRow,
    Pullover,
    LateralRaise,
    UprightRow,
    ReverseFly,
    FacePull,
    Curl,
    HammerCurl,
    TricepsPushdown,
    OverheadExtension,
    CloseGripPress,
    Squat,
    LegPress,
    KneeExtension,
    HipHinge,
    LegCurl,
    HipThrust,
    Lunge,
    StandingCalfRaise,
    SeatedCalfRaise,
}

/// An exercise the catalog can provide for a muscle group slot
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProvidedExercise {
    /// Built-in exercise with pattern metadata and an experience gate
    Curated {
        id: String,
        name: String,
        muscle_group: MuscleGroup,
        movement_pattern: MovementPattern,
        /// Lower values are preferred within a pattern
        priority: u32,
        min_experience: ExperienceLevel,
    },
    /// User-added exercise; always preferred and never gated
    Custom {
        id: String,
        name: String,
        muscle_group: MuscleGroup,
    },
}

impl ProvidedExercise {
    pub fn id(&self) -> &str {
        match self {
            ProvidedExercise::Curated { id, .. } | ProvidedExercise::Custom { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ProvidedExercise::Curated { name, .. } | ProvidedExercise::Custom { name, .. } => name,
        }
    }

    pub fn muscle_group(&self) -> MuscleGroup {
        match self {
            ProvidedExercise::Curated { muscle_group, .. }
            | ProvidedExercise::Custom { muscle_group, .. } => *muscle_group,
        }
    }

    pub fn movement_pattern(&self) -> Option<MovementPattern> {
        match self {
            ProvidedExercise::Curated {
                movement_pattern, ..
            } => Some(*movement_pattern),
            ProvidedExercise::Custom { .. } => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ProvidedExercise::Custom { .. })
    }

    /// Reference stored on working exercises built from this entry
    pub fn to_ref(&self) -> ExerciseRef {
        ExerciseRef {
            id: self.id().to_string(),
            name: self.name().to_string(),
            muscle_group: self.muscle_group(),
        }
    }
}

/// Flat list of exercises available to the picker
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub exercises: Vec<ProvidedExercise>,
}

// ============================================================================
// Planning Types
// ============================================================================

/// Onboarding priority for one muscle group (0 = not trained)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MusclePriority {
    pub muscle_group: MuscleGroup,
    pub priority: u8,
}

/// Onboarding profile supplied by the caller
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AthleteProfile {
    pub experience: ExperienceLevel,
    pub priorities: Vec<MusclePriority>,
    pub training_days: u32,
}

/// Weekly set count per muscle group
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumePerMuscleGroup(pub BTreeMap<MuscleGroup, u32>);

impl VolumePerMuscleGroup {
    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn get(&self, group: MuscleGroup) -> u32 {
        self.0.get(&group).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MuscleGroup, u32)> + '_ {
        self.0.iter().map(|(g, s)| (*g, *s))
    }
}

/// Day-to-muscle-group allocation strategy
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    PushPullLegs,
    UpperLower,
    PushPull,
    FullBody,
}

/// One exercise slot of a split day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SplitSlot {
    pub muscle_group: MuscleGroup,
    pub sets: u32,
}

/// Ordered list of day-slots produced by the split selector
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SplitTemplate {
    pub split_type: SplitType,
    pub days: Vec<Vec<SplitSlot>>,
}

impl SplitTemplate {
    pub fn total_sets(&self) -> u32 {
        self.days.iter().flatten().map(|s| s.sets).sum()
    }
}

/// A split slot enriched with a concrete exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TemplateExercise {
    pub exercise: ProvidedExercise,
    pub sets: u32,
}

/// Exercise template consumed by the aggregate to create a block
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseTemplate {
    pub split_type: SplitType,
    pub days: Vec<Vec<TemplateExercise>>,
}

impl ExerciseTemplate {
    pub fn total_sets(&self) -> u32 {
        self.days.iter().flatten().map(|e| e.sets).sum()
    }
}

// ============================================================================
// Training Block Types
// ============================================================================

/// A set performed to estimate load: weight lifted for a number of reps
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoadingSet {
    pub weight: f64,
    pub reps: u32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SetState {
    Pending,
    Done,
    Failed,
}

impl std::str::FromStr for SetState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(SetState::Pending),
            "done" => Ok(SetState::Done),
            "failed" => Ok(SetState::Failed),
            other => Err(format!("Unknown set state: {}", other)),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkingSet {
    pub id: Uuid,
    pub state: SetState,
    pub order: u32,
    pub reps: u32,
    pub weight: f64,
}

/// How hard the exercise felt overall
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Moderate,
    Hard,
}

/// How the prescribed weight felt
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoadFeel {
    TooLight,
    #[default]
    JustRight,
    TooHeavy,
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "moderate" => Ok(Difficulty::Moderate),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("Unknown difficulty: {}", other)),
        }
    }
}

impl std::str::FromStr for LoadFeel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "too_light" => Ok(LoadFeel::TooLight),
            "just_right" => Ok(LoadFeel::JustRight),
            "too_heavy" => Ok(LoadFeel::TooHeavy),
            other => Err(format!("Unknown load feel: {}", other)),
        }
    }
}

/// Athlete assessment recorded when an exercise is finished
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assessment {
    pub difficulty: Difficulty,
    pub load: LoadFeel,
}

/// Lifestyle feedback attached to a workout (1..=10)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LifestyleFeedback {
    pub diet_quality: u8,
    pub sleep_quality: u8,
}

impl LifestyleFeedback {
    /// Either quality below 5 counts as suboptimal
    pub fn is_suboptimal(&self) -> bool {
        self.diet_quality < 5 || self.sleep_quality < 5
    }
}

/// Strategy used to generate the next week's prescription
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionType {
    /// First prescription after loading or testing
    Initial,
    ProgressedReps,
    NoProgressFailure,
    KeepProgressSuboptimalLifestyle,
    LoweredWeightTooManyFailures,
    LoweredWeightTooHeavy,
    RegressTooMuchVolume,
}

impl ProgressionType {
    pub fn is_lowered(&self) -> bool {
        matches!(
            self,
            ProgressionType::LoweredWeightTooManyFailures | ProgressionType::LoweredWeightTooHeavy
        )
    }
}

/// Reference to the catalog exercise a working exercise trains
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseRef {
    pub id: String,
    pub name: String,
    pub muscle_group: MuscleGroup,
}

/// State-specific data of a working exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExerciseState {
    /// Waiting for the athlete to find a working weight
    Loading,
    /// Waiting for the athlete to test a suggested weight
    Testing { testing_weight: f64 },
    Tested {
        loading_set: LoadingSet,
        sets: Vec<WorkingSet>,
    },
    Loaded {
        loading_set: LoadingSet,
        reached_failure: bool,
        sets: Vec<WorkingSet>,
    },
    Pending {
        progression: ProgressionType,
        sets: Vec<WorkingSet>,
    },
    Finished {
        sets: Vec<WorkingSet>,
        assessment: Assessment,
    },
}

impl ExerciseState {
    pub fn name(&self) -> &'static str {
        match self {
            ExerciseState::Loading => "loading",
            ExerciseState::Testing { .. } => "testing",
            ExerciseState::Tested { .. } => "tested",
            ExerciseState::Loaded { .. } => "loaded",
            ExerciseState::Pending { .. } => "pending",
            ExerciseState::Finished { .. } => "finished",
        }
    }

    pub fn sets(&self) -> &[WorkingSet] {
        match self {
            ExerciseState::Loading | ExerciseState::Testing { .. } => &[],
            ExerciseState::Tested { sets, .. }
            | ExerciseState::Loaded { sets, .. }
            | ExerciseState::Pending { sets, .. }
            | ExerciseState::Finished { sets, .. } => sets,
        }
    }

    pub fn sets_mut(&mut self) -> Option<&mut Vec<WorkingSet>> {
        match self {
            ExerciseState::Loading | ExerciseState::Testing { .. } => None,
            ExerciseState::Tested { sets, .. }
            | ExerciseState::Loaded { sets, .. }
            | ExerciseState::Pending { sets, .. }
            | ExerciseState::Finished { sets, .. } => Some(sets),
        }
    }

    /// Whether the exercise needs nothing more this week
    pub fn is_terminal_for_week(&self) -> bool {
        match self {
            ExerciseState::Loading | ExerciseState::Testing { .. } | ExerciseState::Pending { .. } => {
                false
            }
            ExerciseState::Tested { .. }
            | ExerciseState::Loaded { .. }
            | ExerciseState::Finished { .. } => true,
        }
    }
}

/// An exercise instance inside a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkingExercise {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub exercise: ExerciseRef,
    pub order: u32,
    pub target_sets: u32,
    pub target_reps: u32,
    #[serde(flatten)]
    pub state: ExerciseState,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutState {
    Pending,
    Completed,
}

/// One training day within a microcycle
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: Uuid,
    pub microcycle_id: Uuid,
    pub day_index: u32,
    pub state: WorkoutState,
    pub active: bool,
    pub feedback: Option<LifestyleFeedback>,
    pub exercises: Vec<WorkingExercise>,
}

/// One week within a mesocycle; index 0 is the testing week
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Microcycle {
    pub id: Uuid,
    pub mesocycle_id: Uuid,
    pub index: u32,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub workouts: Vec<Workout>,
}

impl Microcycle {
    pub fn is_open(&self) -> bool {
        self.finished_at.is_none()
    }
}

/// One program cycle for one athlete
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Mesocycle {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub confirmed: bool,
    pub finished_at: Option<DateTime<Utc>>,
    /// Finished by an early abort rather than by planning a successor
    #[serde(default)]
    pub terminated: bool,
    pub microcycles: Vec<Microcycle>,
}

impl Mesocycle {
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn open_microcycle(&self) -> Option<&Microcycle> {
        self.microcycles.iter().find(|m| m.is_open())
    }

    pub fn workouts(&self) -> impl Iterator<Item = &Workout> {
        self.microcycles.iter().flat_map(|m| m.workouts.iter())
    }

    pub fn find_workout(&self, workout_id: Uuid) -> Option<&Workout> {
        self.workouts().find(|w| w.id == workout_id)
    }

    /// Find an exercise together with its owning workout
    pub fn find_exercise(&self, exercise_id: Uuid) -> Option<(&Workout, &WorkingExercise)> {
        self.workouts().find_map(|w| {
            w.exercises
                .iter()
                .find(|e| e.id == exercise_id)
                .map(|e| (w, e))
        })
    }

    pub fn active_workout(&self) -> Option<&Workout> {
        self.open_microcycle()
            .and_then(|m| m.workouts.iter().find(|w| w.active))
    }

    pub(crate) fn workout_mut(&mut self, workout_id: Uuid) -> Option<&mut Workout> {
        self.microcycles
            .iter_mut()
            .flat_map(|m| m.workouts.iter_mut())
            .find(|w| w.id == workout_id)
    }

    pub(crate) fn exercise_mut(&mut self, exercise_id: Uuid) -> Option<&mut WorkingExercise> {
        self.microcycles
            .iter_mut()
            .flat_map(|m| m.workouts.iter_mut())
            .flat_map(|w| w.exercises.iter_mut())
            .find(|e| e.id == exercise_id)
    }

    /// Verify the structural invariants of the block tree
    ///
    /// Returns a list of violations, or an empty Vec if the block is consistent.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let open: Vec<_> = self.microcycles.iter().filter(|m| m.is_open()).collect();
        if open.len() > 1 {
            errors.push(format!("{} microcycles are open", open.len()));
        }
        if self.is_finished() && !open.is_empty() {
            errors.push("Finished mesocycle still has an open microcycle".to_string());
        }

        for micro in &self.microcycles {
            let active = micro.workouts.iter().filter(|w| w.active).count();
            if active > 1 {
                errors.push(format!(
                    "Microcycle {} has {} active workouts",
                    micro.index, active
                ));
            }
            if !micro.is_open() && active > 0 {
                errors.push(format!(
                    "Closed microcycle {} has an active workout",
                    micro.index
                ));
            }

            // An aborted block completes workouts that were never trained
            if self.terminated {
                continue;
            }
            for workout in &micro.workouts {
                if workout.state != WorkoutState::Completed {
                    continue;
                }
                if let Some(ex) = workout
                    .exercises
                    .iter()
                    .find(|e| !e.state.is_terminal_for_week())
                {
                    errors.push(format!(
                        "Completed workout {} holds {} exercise {}",
                        workout.id,
                        ex.state.name(),
                        ex.id
                    ));
                }
            }
        }

        errors
    }
}
