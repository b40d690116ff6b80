//! Read-only derivations over a training block.
//!
//! Nothing here mutates a block; every function can run against a snapshot
//! loaded from disk while no operation is in progress.

use crate::load_math::estimate_one_rep_max;
use crate::progression::ExerciseResult;
use crate::{ExerciseState, LoadingSet, Mesocycle, SetState, WorkingSet, WorkoutState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One exercise's numbers for one week
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CycleProgress {
    pub cycle_index: u32,
    pub state: String,
    pub sets_done: usize,
    pub sets_failed: usize,
    /// Heaviest weight prescribed this week
    pub top_weight: Option<f64>,
    /// Sum of weight x reps over completed sets
    pub volume_load: f64,
    /// Best Epley estimate over completed sets, or the loading set
    pub estimated_one_rep_max: Option<f64>,
}

/// Block-wide numbers and narrative for one week
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CycleInsight {
    pub cycle_index: u32,
    pub completed_workouts: usize,
    pub total_workouts: usize,
    pub sets_done: usize,
    pub sets_failed: usize,
    pub volume_load: f64,
    /// Average change in estimated 1RM against the previous week, in percent
    pub strength_change_pct: Option<f64>,
    pub narrative: String,
}

fn count_sets(sets: &[WorkingSet], state: SetState) -> usize {
    sets.iter().filter(|s| s.state == state).count()
}

fn volume_load(sets: &[WorkingSet]) -> f64 {
    sets.iter()
        .filter(|s| s.state == SetState::Done)
        .map(|s| s.weight * s.reps as f64)
        .sum()
}

fn best_estimate(state: &ExerciseState) -> Option<f64> {
    let from_sets = state
        .sets()
        .iter()
        .filter(|s| s.state == SetState::Done)
        .map(|s| estimate_one_rep_max(s.weight, s.reps))
        .fold(None, |best: Option<f64>, e| Some(best.map_or(e, |b| b.max(e))));

    let from_loading = match state {
        ExerciseState::Loaded { loading_set, .. } | ExerciseState::Tested { loading_set, .. } => {
            Some(estimate_one_rep_max(loading_set.weight, loading_set.reps))
        }
        ExerciseState::Loading
        | ExerciseState::Testing { .. }
        | ExerciseState::Pending { .. }
        | ExerciseState::Finished { .. } => None,
    };

    match (from_sets, from_loading) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

/// Finished weeks of one catalog exercise, oldest first
pub fn exercise_history(block: &Mesocycle, catalog_id: &str) -> Vec<ExerciseResult> {
    block
        .workouts()
        .flat_map(|w| w.exercises.iter().map(move |e| (w, e)))
        .filter(|(_, e)| e.exercise.id == catalog_id)
        .filter_map(|(w, e)| match &e.state {
            ExerciseState::Finished { sets, assessment } => Some(ExerciseResult {
                sets: sets.clone(),
                assessment: *assessment,
                feedback: w.feedback,
            }),
            ExerciseState::Loading
            | ExerciseState::Testing { .. }
            | ExerciseState::Tested { .. }
            | ExerciseState::Loaded { .. }
            | ExerciseState::Pending { .. } => None,
        })
        .collect()
}

/// Most recent loading or testing set recorded for a catalog exercise
pub fn latest_loading_set(block: &Mesocycle, catalog_id: &str) -> Option<LoadingSet> {
    block
        .workouts()
        .flat_map(|w| w.exercises.iter())
        .filter(|e| e.exercise.id == catalog_id)
        .filter_map(|e| match &e.state {
            ExerciseState::Loaded { loading_set, .. } | ExerciseState::Tested { loading_set, .. } => {
                Some(*loading_set)
            }
            ExerciseState::Loading
            | ExerciseState::Testing { .. }
            | ExerciseState::Pending { .. }
            | ExerciseState::Finished { .. } => None,
        })
        .last()
}

/// Last prescribed weight of every exercise, keyed by catalog id
///
/// Exercises that were never loaded have no entry.
pub fn suggest_testing_weights(block: &Mesocycle) -> HashMap<String, f64> {
    let mut weights = HashMap::new();
    for exercise in block.workouts().flat_map(|w| w.exercises.iter()) {
        let weight = match &exercise.state {
            ExerciseState::Testing { testing_weight } => Some(*testing_weight),
            ExerciseState::Loading => None,
            state => state
                .sets()
                .iter()
                .max_by_key(|s| s.order)
                .map(|s| s.weight),
        };
        if let Some(weight) = weight {
            weights.insert(exercise.exercise.id.clone(), weight);
        }
    }
    weights
}

/// Week-by-week numbers for one catalog exercise
pub fn get_cycle_progress_for_exercise(block: &Mesocycle, catalog_id: &str) -> Vec<CycleProgress> {
    let mut progress = Vec::new();
    for microcycle in &block.microcycles {
        for exercise in microcycle
            .workouts
            .iter()
            .flat_map(|w| w.exercises.iter())
            .filter(|e| e.exercise.id == catalog_id)
        {
            let sets = exercise.state.sets();
            let top_weight = match &exercise.state {
                ExerciseState::Testing { testing_weight } => Some(*testing_weight),
                _ => sets.iter().map(|s| s.weight).reduce(f64::max),
            };
            progress.push(CycleProgress {
                cycle_index: microcycle.index,
                state: exercise.state.name().to_string(),
                sets_done: count_sets(sets, SetState::Done),
                sets_failed: count_sets(sets, SetState::Failed),
                top_weight,
                volume_load: volume_load(sets),
                estimated_one_rep_max: best_estimate(&exercise.state),
            });
        }
    }
    progress
}

/// Weekly narrative and numbers, keyed by cycle index
pub fn get_lift_coach_insights(block: &Mesocycle) -> BTreeMap<u32, CycleInsight> {
    let mut insights = BTreeMap::new();
    let mut previous: HashMap<&str, f64> = HashMap::new();

    for microcycle in &block.microcycles {
        let exercises: Vec<_> = microcycle
            .workouts
            .iter()
            .flat_map(|w| w.exercises.iter())
            .collect();

        let mut sets_done = 0;
        let mut sets_failed = 0;
        let mut load = 0.0;
        let mut estimates: HashMap<&str, f64> = HashMap::new();
        for exercise in &exercises {
            let sets = exercise.state.sets();
            sets_done += count_sets(sets, SetState::Done);
            sets_failed += count_sets(sets, SetState::Failed);
            load += volume_load(sets);
            if let Some(estimate) = best_estimate(&exercise.state) {
                estimates.insert(exercise.exercise.id.as_str(), estimate);
            }
        }

        let changes: Vec<f64> = estimates
            .iter()
            .filter_map(|(id, now)| previous.get(id).map(|before| (now / before - 1.0) * 100.0))
            .collect();
        let strength_change_pct = if changes.is_empty() {
            None
        } else {
            Some(changes.iter().sum::<f64>() / changes.len() as f64)
        };

        let completed_workouts = microcycle
            .workouts
            .iter()
            .filter(|w| w.state == WorkoutState::Completed)
            .count();
        let total_workouts = microcycle.workouts.len();

        let mut narrative = if microcycle.index == 0 {
            let calibrated = exercises
                .iter()
                .filter(|e| e.state.is_terminal_for_week())
                .count();
            format!(
                "Testing week: {} of {} exercises calibrated",
                calibrated,
                exercises.len()
            )
        } else {
            format!(
                "Week {}: {} of {} workouts done, {} sets completed, {} failed",
                microcycle.index, completed_workouts, total_workouts, sets_done, sets_failed
            )
        };
        if let Some(pct) = strength_change_pct {
            let direction = if pct >= 0.0 { "up" } else { "down" };
            narrative.push_str(&format!(
                "; estimated strength {} {:.1}% on last week",
                direction,
                pct.abs()
            ));
        }

        insights.insert(
            microcycle.index,
            CycleInsight {
                cycle_index: microcycle.index,
                completed_workouts,
                total_workouts,
                sets_done,
                sets_failed,
                volume_load: load,
                strength_change_pct,
                narrative,
            },
        );

        if !estimates.is_empty() {
            previous = estimates;
        }
    }

    insights
}

/// Completed sets per day since the first training week started
///
/// `None` while the block is on its first two cycles or has no completed sets.
pub fn get_rolling_average_volume(block: &Mesocycle, now: DateTime<Utc>) -> Option<f64> {
    if block.microcycles.len() <= 2 {
        return None;
    }
    let start = block.microcycles.iter().find(|m| m.index == 1)?.created_at;

    let completed: usize = block
        .microcycles
        .iter()
        .filter(|m| m.index >= 1)
        .flat_map(|m| m.workouts.iter())
        .flat_map(|w| w.exercises.iter())
        .map(|e| count_sets(e.state.sets(), SetState::Done))
        .sum();
    if completed == 0 {
        return None;
    }

    let elapsed_days = ((now - start).num_seconds() as f64 / 86_400.0).max(1.0);
    Some(completed as f64 / elapsed_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Assessment, ExerciseRef, LifestyleFeedback, Microcycle, MuscleGroup, ProgressionType,
        WorkingExercise, Workout,
    };
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 6, 6, 30, 0).unwrap()
    }

    fn done(weight: f64, reps: u32) -> WorkingSet {
        WorkingSet {
            id: Uuid::new_v4(),
            state: SetState::Done,
            order: 0,
            reps,
            weight,
        }
    }

    fn exercise(catalog_id: &str, state: ExerciseState) -> WorkingExercise {
        WorkingExercise {
            id: Uuid::new_v4(),
            created_at: start(),
            exercise: ExerciseRef {
                id: catalog_id.into(),
                name: catalog_id.into(),
                muscle_group: MuscleGroup::Back,
            },
            order: 0,
            target_sets: 2,
            target_reps: 10,
            state,
        }
    }

    fn week(index: u32, exercise: WorkingExercise, feedback: Option<LifestyleFeedback>) -> Microcycle {
        Microcycle {
            id: Uuid::new_v4(),
            mesocycle_id: Uuid::nil(),
            index,
            created_at: start() + Duration::days(7 * index as i64),
            finished_at: None,
            workouts: vec![Workout {
                id: Uuid::new_v4(),
                microcycle_id: Uuid::nil(),
                day_index: 0,
                state: WorkoutState::Completed,
                active: false,
                feedback,
                exercises: vec![exercise],
            }],
        }
    }

    fn block() -> Mesocycle {
        let loading_set = LoadingSet {
            weight: 50.0,
            reps: 10,
        };
        Mesocycle {
            id: Uuid::nil(),
            created_at: start(),
            confirmed: true,
            finished_at: None,
            terminated: false,
            microcycles: vec![
                week(
                    0,
                    exercise(
                        "row",
                        ExerciseState::Loaded {
                            loading_set,
                            reached_failure: false,
                            sets: vec![done(40.0, 10), done(40.0, 10)],
                        },
                    ),
                    None,
                ),
                week(
                    1,
                    exercise(
                        "row",
                        ExerciseState::Finished {
                            sets: vec![done(50.0, 9), done(50.0, 9)],
                            assessment: Assessment::default(),
                        },
                    ),
                    Some(LifestyleFeedback {
                        diet_quality: 7,
                        sleep_quality: 3,
                    }),
                ),
                week(
                    2,
                    exercise(
                        "row",
                        ExerciseState::Pending {
                            progression: ProgressionType::ProgressedReps,
                            sets: vec![done(50.0, 10)],
                        },
                    ),
                    None,
                ),
            ],
        }
    }

    #[test]
    fn test_history_carries_workout_feedback() {
        let history = exercise_history(&block(), "row");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].feedback.unwrap().sleep_quality, 3);
        assert!(exercise_history(&block(), "curl").is_empty());
    }

    #[test]
    fn test_latest_loading_set() {
        let found = latest_loading_set(&block(), "row").unwrap();
        assert_eq!(found.weight, 50.0);
        assert!(latest_loading_set(&block(), "curl").is_none());
    }

    #[test]
    fn test_suggested_weights_use_latest_week() {
        let weights = suggest_testing_weights(&block());
        assert_eq!(weights.get("row"), Some(&50.0));
    }

    #[test]
    fn test_cycle_progress() {
        let progress = get_cycle_progress_for_exercise(&block(), "row");
        assert_eq!(progress.len(), 3);
        assert_eq!(progress[0].state, "loaded");
        // Loading set estimate 50 * (1 + 10/30) beats the calibration sets
        let e1rm = progress[0].estimated_one_rep_max.unwrap();
        assert!((e1rm - 66.666).abs() < 0.01);
        assert_eq!(progress[1].sets_done, 2);
        assert_eq!(progress[1].volume_load, 900.0);
        assert_eq!(progress[2].top_weight, Some(50.0));
    }

    #[test]
    fn test_insights_are_keyed_by_cycle() {
        let insights = get_lift_coach_insights(&block());
        assert_eq!(insights.len(), 3);
        assert!(insights[&0].narrative.starts_with("Testing week: 1 of 1"));
        assert!(insights[&0].strength_change_pct.is_none());
        assert_eq!(insights[&1].completed_workouts, 1);
        // 50 x 9 = 65.0 estimated against 66.67 from the loading set
        let change = insights[&1].strength_change_pct.unwrap();
        assert!(change < 0.0);
        assert!(insights[&1].narrative.contains("down"));
    }

    #[test]
    fn test_rolling_average_volume() {
        let block = block();
        // Three done sets over the 14 days since week 1 started
        let now = start() + Duration::days(21);
        let average = get_rolling_average_volume(&block, now).unwrap();
        assert!((average - 3.0 / 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_rolling_average_needs_three_cycles() {
        let mut block = block();
        block.microcycles.truncate(2);
        assert!(get_rolling_average_volume(&block, start() + Duration::days(10)).is_none());
    }

    #[test]
    fn test_rolling_average_without_done_sets() {
        let mut block = block();
        for micro in &mut block.microcycles {
            for workout in &mut micro.workouts {
                for exercise in &mut workout.exercises {
                    exercise.state = ExerciseState::Loading;
                }
            }
        }
        assert!(get_rolling_average_volume(&block, start() + Duration::days(21)).is_none());
    }
}
