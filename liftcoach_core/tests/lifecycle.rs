//! Full training-block lifecycles driven through the public API.

use chrono::{Duration, TimeZone, Utc};
use liftcoach_core::catalog::get_default_catalog;
use liftcoach_core::config::PlanningConfig;
use liftcoach_core::insights::{get_lift_coach_insights, suggest_testing_weights};
use liftcoach_core::volume::default_priorities;
use liftcoach_core::*;
use std::collections::HashMap;
use uuid::Uuid;

fn profile(days: u32) -> AthleteProfile {
    AthleteProfile {
        experience: ExperienceLevel::Intermediate,
        priorities: default_priorities(),
        training_days: days,
    }
}

fn open_workouts(block: &Mesocycle) -> Vec<Uuid> {
    block
        .open_microcycle()
        .map(|m| m.workouts.iter().map(|w| w.id).collect())
        .unwrap_or_default()
}

fn exercises_of(block: &Mesocycle, workout_id: Uuid) -> Vec<Uuid> {
    block
        .find_workout(workout_id)
        .map(|w| w.exercises.iter().map(|e| e.id).collect())
        .unwrap_or_default()
}

fn complete_all_sets(agg: &mut TrainingBlockAggregate<'_>, exercise_id: Uuid) {
    let set_ids: Vec<Uuid> = agg
        .block()
        .find_exercise(exercise_id)
        .unwrap()
        .1
        .state
        .sets()
        .iter()
        .map(|s| s.id)
        .collect();
    for set_id in set_ids {
        agg.set_state_has_changed(exercise_id, set_id, SetState::Done)
            .unwrap();
    }
}

/// Run the testing week: every exercise is loaded and every set completed
fn run_testing_week(agg: &mut TrainingBlockAggregate<'_>) {
    for workout_id in open_workouts(agg.block()) {
        assert_eq!(agg.start_workout().unwrap(), workout_id);
        for exercise_id in exercises_of(agg.block(), workout_id) {
            agg.exercise_loaded(
                exercise_id,
                LoadingSet {
                    weight: 50.0,
                    reps: 12,
                },
                false,
            )
            .unwrap();
            complete_all_sets(agg, exercise_id);
        }
        agg.finish_workout(workout_id, None).unwrap();
    }
}

/// Run a training week with every set completed
fn run_training_week(agg: &mut TrainingBlockAggregate<'_>) {
    let feedback = LifestyleFeedback {
        diet_quality: 7,
        sleep_quality: 8,
    };
    for workout_id in open_workouts(agg.block()) {
        agg.start_workout().unwrap();
        for exercise_id in exercises_of(agg.block(), workout_id) {
            complete_all_sets(agg, exercise_id);
            agg.finish_exercise(exercise_id, Assessment::default())
                .unwrap();
        }
        agg.finish_workout(workout_id, Some(feedback)).unwrap();
    }
}

#[test]
fn test_block_from_plan_to_successor() {
    let ids = SequentialIds::new(0);
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 1, 5, 6, 0, 0).unwrap());
    let settings = BlockSettings {
        training_weeks: 3,
        ..BlockSettings::default()
    };

    let plan = plan_program(&profile(3), get_default_catalog(), &PlanningConfig::default())
        .unwrap();
    let mut agg = TrainingBlockAggregate::create_mesocycle(
        &plan.template,
        &HashMap::new(),
        settings,
        &ids,
        &clock,
    )
    .unwrap();
    agg.confirm_mesocycle().unwrap();
    let exercise_count = plan.template.days.iter().map(Vec::len).sum::<usize>();

    run_testing_week(&mut agg);
    clock.advance(Duration::days(7));
    agg.extend_microcycle().unwrap();

    let week1 = agg.block().open_microcycle().unwrap();
    assert_eq!(week1.index, 1);
    let exercises: Vec<_> = week1.workouts.iter().flat_map(|w| &w.exercises).collect();
    assert_eq!(exercises.len(), exercise_count);
    for exercise in &exercises {
        match &exercise.state {
            ExerciseState::Pending { progression, sets } => {
                assert_eq!(*progression, ProgressionType::Initial);
                assert_eq!(sets.len() as u32, exercise.target_sets);
                assert!(sets.iter().all(|s| s.reps == 9));
            }
            other => panic!("expected pending, got {}", other.name()),
        }
    }

    run_training_week(&mut agg);
    clock.advance(Duration::days(7));
    agg.extend_microcycle().unwrap();

    let week2 = agg.block().open_microcycle().unwrap();
    assert!(week2
        .workouts
        .iter()
        .flat_map(|w| &w.exercises)
        .all(|e| matches!(
            e.state,
            ExerciseState::Pending {
                progression: ProgressionType::ProgressedReps,
                ..
            }
        ) && e.target_reps == 10));

    // Week 2 is skipped; its prescriptions carry over unchanged
    clock.advance(Duration::days(7));
    agg.extend_microcycle().unwrap();
    assert_eq!(agg.block().open_microcycle().unwrap().index, 3);
    assert!(matches!(
        agg.extend_microcycle(),
        Err(Error::MesocycleComplete { index: 3 })
    ));
    assert!(agg.block().check_invariants().is_empty());

    let insights = get_lift_coach_insights(agg.block());
    assert_eq!(insights.len(), 4);
    assert_eq!(insights[&1].completed_workouts, insights[&1].total_workouts);
    assert_eq!(insights[&2].completed_workouts, 0);

    let weights = suggest_testing_weights(agg.block());
    let successor = agg.finish_mesocycle(&weights).unwrap();
    assert!(agg.block().is_finished());
    assert!(agg.block().open_microcycle().is_none());
    assert_eq!(successor.microcycles.len(), 1);
    assert!(successor
        .workouts()
        .flat_map(|w| &w.exercises)
        .all(|e| matches!(e.state, ExerciseState::Testing { .. })));

    let (block, events) = agg.into_parts();
    assert!(matches!(events[0], Event::MesocycleCreated { .. }));
    assert_eq!(replay(&events), Some(block));
    assert_eq!(
        replay(events.iter().filter(|e| matches!(e, Event::NextMesocyclePlanned { .. }))),
        Some(successor)
    );
}

#[test]
fn test_extend_gives_every_terminal_exercise_one_successor() {
    let ids = SequentialIds::new(1_000);
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 6, 1, 6, 0, 0).unwrap());

    for days in 2..=6 {
        let plan = plan_program(
            &profile(days),
            get_default_catalog(),
            &PlanningConfig::default(),
        )
        .unwrap();
        let mut agg = TrainingBlockAggregate::create_mesocycle(
            &plan.template,
            &HashMap::new(),
            BlockSettings::default(),
            &ids,
            &clock,
        )
        .unwrap();
        run_testing_week(&mut agg);
        let before: Vec<String> = agg
            .block()
            .open_microcycle()
            .unwrap()
            .workouts
            .iter()
            .flat_map(|w| w.exercises.iter().map(|e| e.exercise.id.clone()))
            .collect();

        agg.extend_microcycle().unwrap();

        let after = agg.block().open_microcycle().unwrap();
        let successors: Vec<String> = after
            .workouts
            .iter()
            .flat_map(|w| w.exercises.iter().map(|e| e.exercise.id.clone()))
            .collect();
        assert_eq!(before, successors, "{} days", days);
        assert!(after
            .workouts
            .iter()
            .flat_map(|w| &w.exercises)
            .all(|e| e.state.name() == "pending"));
        assert!(agg.block().check_invariants().is_empty());
    }
}

#[test]
fn test_terminated_block_replays_and_rejects_further_work() {
    let ids = SequentialIds::new(0);
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 9, 7, 6, 0, 0).unwrap());
    let plan = plan_program(&profile(4), get_default_catalog(), &PlanningConfig::default())
        .unwrap();
    let mut agg = TrainingBlockAggregate::create_mesocycle(
        &plan.template,
        &HashMap::new(),
        BlockSettings::default(),
        &ids,
        &clock,
    )
    .unwrap();

    agg.start_workout().unwrap();
    agg.terminate_mesocycle().unwrap();

    assert!(agg.block().is_finished());
    assert!(agg
        .block()
        .workouts()
        .all(|w| w.state == WorkoutState::Completed && !w.active));
    assert!(matches!(
        agg.start_workout(),
        Err(Error::MesocycleAlreadyFinished(_))
    ));

    let (block, events) = agg.into_parts();
    assert_eq!(replay(&events), Some(block));
}
