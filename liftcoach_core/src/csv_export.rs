//! Flat CSV export of every set in a training block.

use crate::{Mesocycle, Result};
use std::path::Path;

/// One working set with its surrounding context
#[derive(Debug, serde::Serialize)]
struct SetRow<'a> {
    mesocycle_id: String,
    cycle_index: u32,
    day_index: u32,
    workout_state: &'static str,
    exercise_id: String,
    exercise: &'a str,
    exercise_name: &'a str,
    muscle_group: &'static str,
    exercise_state: &'static str,
    set_order: u32,
    set_state: &'static str,
    reps: u32,
    weight: f64,
}

fn workout_state_name(state: crate::WorkoutState) -> &'static str {
    match state {
        crate::WorkoutState::Pending => "pending",
        crate::WorkoutState::Completed => "completed",
    }
}

fn set_state_name(state: crate::SetState) -> &'static str {
    match state {
        crate::SetState::Pending => "pending",
        crate::SetState::Done => "done",
        crate::SetState::Failed => "failed",
    }
}

/// Write every set of the block to `csv_path`, replacing the file
///
/// Returns the number of rows written. Exercises without sets (still
/// loading or testing) produce no rows.
pub fn export_sets_csv(block: &Mesocycle, csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(csv_path)?;
    let mut writer = csv::Writer::from_writer(file);

    let mut rows = 0;
    for microcycle in &block.microcycles {
        for workout in &microcycle.workouts {
            for exercise in &workout.exercises {
                for set in exercise.state.sets() {
                    writer.serialize(SetRow {
                        mesocycle_id: block.id.to_string(),
                        cycle_index: microcycle.index,
                        day_index: workout.day_index,
                        workout_state: workout_state_name(workout.state),
                        exercise_id: exercise.id.to_string(),
                        exercise: &exercise.exercise.id,
                        exercise_name: &exercise.exercise.name,
                        muscle_group: exercise.exercise.muscle_group.as_str(),
                        exercise_state: exercise.state.name(),
                        set_order: set.order,
                        set_state: set_state_name(set.state),
                        reps: set.reps,
                        weight: set.weight,
                    })?;
                    rows += 1;
                }
            }
        }
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} sets to {:?}", rows, csv_path);
    Ok(rows)
}
