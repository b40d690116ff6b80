//! Default catalog of curated exercises and movement patterns.
//!
//! Every muscle group owns an ordered list of movement patterns. The picker
//! rotates through these patterns so consecutive slots for the same group
//! hit the muscle from different angles.

use crate::config::CustomExercise;
use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Ordered movement patterns for a muscle group
pub fn movement_patterns(group: MuscleGroup) -> &'static [MovementPattern] {
    use MovementPattern::*;
    match group {
        MuscleGroup::Chest => &[HorizontalPress, InclinePress, ChestFly],
        MuscleGroup::Back => &[VerticalPull, HorizontalRow, Pullover],
        MuscleGroup::SideDelts => &[LateralRaise, UprightRow],
        MuscleGroup::RearDelts => &[ReverseFly, FacePull],
        MuscleGroup::Biceps => &[Curl, HammerCurl],
        MuscleGroup::Triceps => &[TricepsPushdown, OverheadExtension, CloseGripPress],
        MuscleGroup::Quads => &[Squat, LegPress, KneeExtension],
        MuscleGroup::Hamstrings => &[HipHinge, LegCurl],
        MuscleGroup::Glutes => &[HipThrust, Lunge],
        MuscleGroup::Calves => &[StandingCalfRaise, SeatedCalfRaise],
    }
}

fn curated(
    id: &str,
    name: &str,
    muscle_group: MuscleGroup,
    movement_pattern: MovementPattern,
    priority: u32,
    min_experience: ExperienceLevel,
) -> ProvidedExercise {
    ProvidedExercise::Curated {
        id: id.into(),
        name: name.into(),
        muscle_group,
        movement_pattern,
        priority,
        min_experience,
    }
}

/// Builds the default catalog of curated exercises
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference.
pub fn build_default_catalog() -> Catalog {
    use ExperienceLevel as X;
    use MovementPattern as P;
    use MuscleGroup as G;

    let exercises = vec![
        // Chest
        curated("barbell_bench_press", "Barbell Bench Press", G::Chest, P::HorizontalPress, 1, X::Beginner),
        curated("dumbbell_bench_press", "Dumbbell Bench Press", G::Chest, P::HorizontalPress, 2, X::None),
        curated("machine_chest_press", "Machine Chest Press", G::Chest, P::HorizontalPress, 3, X::None),
        curated("incline_dumbbell_press", "Incline Dumbbell Press", G::Chest, P::InclinePress, 1, X::None),
        curated("incline_barbell_press", "Incline Barbell Press", G::Chest, P::InclinePress, 2, X::Intermediate),
        curated("cable_fly", "Cable Fly", G::Chest, P::ChestFly, 1, X::None),
        curated("pec_deck", "Pec Deck", G::Chest, P::ChestFly, 2, X::None),
        // Back
        curated("lat_pulldown", "Lat Pulldown", G::Back, P::VerticalPull, 1, X::None),
        curated("pull_up", "Pull-up", G::Back, P::VerticalPull, 2, X::Intermediate),
        curated("seated_cable_row", "Seated Cable Row", G::Back, P::HorizontalRow, 1, X::None),
        curated("barbell_row", "Barbell Row", G::Back, P::HorizontalRow, 2, X::Intermediate),
        curated("chest_supported_row", "Chest-Supported Row", G::Back, P::HorizontalRow, 3, X::None),
        curated("cable_pullover", "Cable Pullover", G::Back, P::Pullover, 1, X::Beginner),
        // Side delts
        curated("dumbbell_lateral_raise", "Dumbbell Lateral Raise", G::SideDelts, P::LateralRaise, 1, X::None),
        curated("cable_lateral_raise", "Cable Lateral Raise", G::SideDelts, P::LateralRaise, 2, X::Beginner),
        curated("cable_upright_row", "Cable Upright Row", G::SideDelts, P::UprightRow, 1, X::Intermediate),
        // Rear delts
        curated("reverse_pec_deck", "Reverse Pec Deck", G::RearDelts, P::ReverseFly, 1, X::None),
        curated("bent_over_reverse_fly", "Bent-Over Reverse Fly", G::RearDelts, P::ReverseFly, 2, X::Beginner),
        curated("face_pull", "Face Pull", G::RearDelts, P::FacePull, 1, X::None),
        // Biceps
        curated("barbell_curl", "Barbell Curl", G::Biceps, P::Curl, 1, X::None),
        curated("incline_dumbbell_curl", "Incline Dumbbell Curl", G::Biceps, P::Curl, 2, X::Intermediate),
        curated("hammer_curl", "Hammer Curl", G::Biceps, P::HammerCurl, 1, X::None),
        curated("cable_rope_hammer_curl", "Cable Rope Hammer Curl", G::Biceps, P::HammerCurl, 2, X::Beginner),
        // Triceps
        curated("rope_pushdown", "Rope Pushdown", G::Triceps, P::TricepsPushdown, 1, X::None),
        curated("bar_pushdown", "Bar Pushdown", G::Triceps, P::TricepsPushdown, 2, X::None),
        curated("overhead_cable_extension", "Overhead Cable Extension", G::Triceps, P::OverheadExtension, 1, X::Beginner),
        curated("skull_crusher", "Skull Crusher", G::Triceps, P::OverheadExtension, 2, X::Intermediate),
        curated("close_grip_bench_press", "Close-Grip Bench Press", G::Triceps, P::CloseGripPress, 1, X::Intermediate),
        // Quads
        curated("back_squat", "Back Squat", G::Quads, P::Squat, 1, X::Intermediate),
        curated("hack_squat", "Hack Squat", G::Quads, P::Squat, 2, X::Beginner),
        curated("goblet_squat", "Goblet Squat", G::Quads, P::Squat, 3, X::None),
        curated("leg_press", "Leg Press", G::Quads, P::LegPress, 1, X::None),
        curated("leg_extension", "Leg Extension", G::Quads, P::KneeExtension, 1, X::None),
        // Hamstrings
        curated("romanian_deadlift", "Romanian Deadlift", G::Hamstrings, P::HipHinge, 1, X::Beginner),
        curated("stiff_leg_deadlift", "Stiff-Leg Deadlift", G::Hamstrings, P::HipHinge, 2, X::Intermediate),
        curated("seated_leg_curl", "Seated Leg Curl", G::Hamstrings, P::LegCurl, 1, X::None),
        curated("lying_leg_curl", "Lying Leg Curl", G::Hamstrings, P::LegCurl, 2, X::None),
        // Glutes
        curated("barbell_hip_thrust", "Barbell Hip Thrust", G::Glutes, P::HipThrust, 1, X::Beginner),
        curated("glute_bridge", "Glute Bridge", G::Glutes, P::HipThrust, 2, X::None),
        curated("walking_lunge", "Walking Lunge", G::Glutes, P::Lunge, 1, X::None),
        curated("bulgarian_split_squat", "Bulgarian Split Squat", G::Glutes, P::Lunge, 2, X::Intermediate),
        // Calves
        curated("standing_calf_raise", "Standing Calf Raise", G::Calves, P::StandingCalfRaise, 1, X::None),
        curated("leg_press_calf_raise", "Leg Press Calf Raise", G::Calves, P::StandingCalfRaise, 2, X::None),
        curated("seated_calf_raise", "Seated Calf Raise", G::Calves, P::SeatedCalfRaise, 1, X::None),
    ];

    Catalog { exercises }
}

impl Catalog {
    /// Default catalog extended with the user's custom exercises
    pub fn with_custom(custom: &[CustomExercise]) -> Catalog {
        let mut catalog = get_default_catalog().clone();
        catalog
            .exercises
            .extend(custom.iter().map(ProvidedExercise::from));
        catalog
    }

    pub fn find(&self, id: &str) -> Option<&ProvidedExercise> {
        self.exercises.iter().find(|e| e.id() == id)
    }

    /// All exercises for one muscle group, in catalog order
    pub fn for_muscle_group(&self, group: MuscleGroup) -> impl Iterator<Item = &ProvidedExercise> {
        self.exercises
            .iter()
            .filter(move |e| e.muscle_group() == group)
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for exercise in &self.exercises {
            if exercise.id().is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if !seen.insert(exercise.id()) {
                errors.push(format!("Duplicate exercise ID '{}'", exercise.id()));
            }
            if exercise.name().is_empty() {
                errors.push(format!("Exercise '{}' has empty name", exercise.id()));
            }
            if let Some(pattern) = exercise.movement_pattern() {
                if !movement_patterns(exercise.muscle_group()).contains(&pattern) {
                    errors.push(format!(
                        "Exercise '{}': pattern {:?} does not belong to {}",
                        exercise.id(),
                        pattern,
                        exercise.muscle_group()
                    ));
                }
            }
        }

        for group in MuscleGroup::all() {
            if self.for_muscle_group(*group).next().is_none() {
                errors.push(format!("Catalog has no exercises for {}", group));
            }
        }

        errors
    }
}
