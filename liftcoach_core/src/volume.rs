//! Weekly volume calculator.
//!
//! Converts per-muscle-group priorities and the athlete's experience into a
//! weekly set budget, then clamps the budget to the configured bounds:
//! 1. Scale up to the weekly minimum (floor)
//! 2. Scale down to the weekly maximum (floor)
//! 3. Scale down to the per-workout ceiling (round to nearest)

use crate::config::PlanningConfig;
use crate::{Error, ExperienceLevel, MuscleGroup, MusclePriority, Result, VolumePerMuscleGroup};
use std::collections::BTreeMap;

/// Highest priority with a table entry
pub const MAX_PRIORITY: u8 = 10;

/// Base weekly sets indexed by `[experience][priority - 1]`
static VOLUME_TABLE: [[u32; 10]; 5] = [
    [2, 3, 3, 4, 5, 5, 6, 7, 7, 8],       // none
    [3, 4, 5, 5, 6, 7, 8, 8, 9, 10],      // beginner
    [4, 5, 6, 7, 8, 9, 10, 11, 12, 13],   // intermediate
    [4, 6, 7, 8, 10, 11, 12, 13, 14, 16], // advanced
    [5, 6, 8, 9, 11, 12, 14, 15, 17, 18], // expert
];

fn experience_row(experience: ExperienceLevel) -> usize {
    match experience {
        ExperienceLevel::None => 0,
        ExperienceLevel::Beginner => 1,
        ExperienceLevel::Intermediate => 2,
        ExperienceLevel::Advanced => 3,
        ExperienceLevel::Expert => 4,
    }
}

/// Base weekly sets for one priority; `None` for priority 0
pub fn base_sets(experience: ExperienceLevel, priority: u8) -> Result<Option<u32>> {
    if priority == 0 {
        return Ok(None);
    }
    if priority > MAX_PRIORITY {
        return Err(Error::UnknownPriority(priority));
    }
    Ok(Some(
        VOLUME_TABLE[experience_row(experience)][(priority - 1) as usize],
    ))
}

/// Every muscle group at the same middle priority
pub fn default_priorities() -> Vec<MusclePriority> {
    MuscleGroup::all()
        .iter()
        .map(|group| MusclePriority {
            muscle_group: *group,
            priority: 5,
        })
        .collect()
}

/// Compute the weekly set budget per muscle group
pub fn get_volume_per_muscle_group(
    priorities: &[MusclePriority],
    experience: ExperienceLevel,
    training_days: u32,
    config: &PlanningConfig,
) -> Result<VolumePerMuscleGroup> {
    if training_days == 0 {
        return Err(Error::Config("training_days must be at least 1".into()));
    }

    let mut volume: BTreeMap<MuscleGroup, u32> = BTreeMap::new();
    for entry in priorities {
        if let Some(sets) = base_sets(experience, entry.priority)? {
            *volume.entry(entry.muscle_group).or_insert(0) += sets;
        }
    }

    let total = total_of(&volume);
    if total == 0 {
        tracing::warn!("All muscle group priorities are zero, no volume planned");
        return Ok(VolumePerMuscleGroup::default());
    }

    if total < config.min_sets_per_microcycle {
        tracing::debug!(
            "Weekly volume {} below minimum {}, scaling up",
            total,
            config.min_sets_per_microcycle
        );
        scale_floor(&mut volume, config.min_sets_per_microcycle, total);
    }

    let total = total_of(&volume);
    if total > config.max_sets_per_microcycle {
        tracing::debug!(
            "Weekly volume {} above maximum {}, scaling down",
            total,
            config.max_sets_per_microcycle
        );
        scale_floor(&mut volume, config.max_sets_per_microcycle, total);
    }

    let total = total_of(&volume);
    let cap = config.max_sets_per_workout * training_days;
    if total > cap {
        tracing::debug!(
            "{} sets over {} days exceeds {} per workout, scaling to {}",
            total,
            training_days,
            config.max_sets_per_workout,
            cap
        );
        scale_round(&mut volume, cap, total);
        trim_to(&mut volume, cap);
    }

    volume.retain(|_, sets| *sets > 0);
    let result = VolumePerMuscleGroup(volume);

    tracing::info!(
        "Planned {} weekly sets across {} muscle groups",
        result.total(),
        result.len()
    );
    Ok(result)
}

fn total_of(volume: &BTreeMap<MuscleGroup, u32>) -> u32 {
    volume.values().sum()
}

/// Multiply every entry by `target / total`, rounding down
fn scale_floor(volume: &mut BTreeMap<MuscleGroup, u32>, target: u32, total: u32) {
    for sets in volume.values_mut() {
        *sets = ((*sets as u64 * target as u64) / total as u64) as u32;
    }
}

/// Multiply every entry by `target / total`, rounding half up
fn scale_round(volume: &mut BTreeMap<MuscleGroup, u32>, target: u32, total: u32) {
    let total = total as u64;
    for sets in volume.values_mut() {
        *sets = ((*sets as u64 * target as u64 * 2 + total) / (2 * total)) as u32;
    }
}

/// Remove single sets from the largest entries until the total fits
fn trim_to(volume: &mut BTreeMap<MuscleGroup, u32>, cap: u32) {
    while total_of(volume) > cap {
        let largest = volume
            .iter()
            .fold(None::<(MuscleGroup, u32)>, |best, (group, sets)| match best {
                Some((_, best_sets)) if best_sets >= *sets => best,
                _ => Some((*group, *sets)),
            });
        match largest {
            Some((group, sets)) if sets > 0 => {
                volume.insert(group, sets - 1);
            }
            _ => break,
        }
    }
}
