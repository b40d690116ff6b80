//! Exercise provider and picker.
//!
//! Turns a split template into an exercise template by assigning a concrete
//! catalog exercise to every muscle group slot:
//! - Custom exercises for a group are always consumed first
//! - Curated exercises rotate through the group's movement patterns
//! - Curated exercises above the athlete's experience are skipped
//! - No exercise appears twice in one week

use crate::catalog::movement_patterns;
use crate::split::distribute;
use crate::{
    Catalog, Error, ExerciseTemplate, ExperienceLevel, MovementPattern, MuscleGroup,
    ProvidedExercise, Result, SplitTemplate, TemplateExercise,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Curated exercises of one pattern the athlete may perform, best first
fn curated_for_pattern<'a>(
    catalog: &'a Catalog,
    group: MuscleGroup,
    pattern: MovementPattern,
    experience: Option<ExperienceLevel>,
) -> Vec<&'a ProvidedExercise> {
    let mut candidates: Vec<(&ProvidedExercise, u32)> = catalog
        .for_muscle_group(group)
        .filter_map(|e| match e {
            ProvidedExercise::Curated {
                movement_pattern,
                priority,
                min_experience,
                ..
            } if *movement_pattern == pattern
                && experience.map_or(true, |x| *min_experience <= x) =>
            {
                Some((e, *priority))
            }
            _ => None,
        })
        .collect();
    candidates.sort_by_key(|(_, priority)| *priority);
    candidates.into_iter().map(|(e, _)| e).collect()
}

/// Provide the next exercise for a muscle group slot
///
/// The preferred pattern is `patterns[slot_number % patterns.len()]`; the
/// remaining patterns are tried in rotation order after it. Returns `None`
/// when every candidate for the group is already selected or gated.
pub fn provide_exercise<'a>(
    catalog: &'a Catalog,
    group: MuscleGroup,
    slot_number: usize,
    already_selected: &HashSet<String>,
    experience: ExperienceLevel,
) -> Option<&'a ProvidedExercise> {
    if let Some(custom) = catalog
        .for_muscle_group(group)
        .find(|e| e.is_custom() && !already_selected.contains(e.id()))
    {
        return Some(custom);
    }

    let patterns = movement_patterns(group);
    (0..patterns.len())
        .map(|offset| patterns[(slot_number + offset) % patterns.len()])
        .find_map(|pattern| {
            curated_for_pattern(catalog, group, pattern, Some(experience))
                .into_iter()
                .find(|e| !already_selected.contains(e.id()))
        })
}

/// Assign exercises to every slot of a split template
///
/// Sets of slots that found no exercise are handed to the same group's
/// picked exercises on that day (or, failing that, elsewhere in the week).
/// A group with no picked exercise at all fails the whole template.
pub fn pick_exercises(
    template: &SplitTemplate,
    experience: ExperienceLevel,
    catalog: &Catalog,
) -> Result<ExerciseTemplate> {
    let mut selected: HashSet<String> = HashSet::new();
    let mut slot_counters: HashMap<MuscleGroup, usize> = HashMap::new();
    let mut days: Vec<Vec<TemplateExercise>> = vec![Vec::new(); template.days.len()];
    let mut orphaned: Vec<BTreeMap<MuscleGroup, u32>> = vec![BTreeMap::new(); template.days.len()];

    for (day_index, day) in template.days.iter().enumerate() {
        for slot in day {
            let counter = slot_counters.entry(slot.muscle_group).or_insert(0);
            let slot_number = *counter;
            *counter += 1;

            match provide_exercise(catalog, slot.muscle_group, slot_number, &selected, experience) {
                Some(exercise) => {
                    tracing::debug!(
                        "Day {}: picked {} for {} ({} sets)",
                        day_index,
                        exercise.id(),
                        slot.muscle_group,
                        slot.sets
                    );
                    selected.insert(exercise.id().to_string());
                    days[day_index].push(TemplateExercise {
                        exercise: exercise.clone(),
                        sets: slot.sets,
                    });
                }
                None => {
                    tracing::debug!(
                        "Day {}: no exercise left for {}, orphaning {} sets",
                        day_index,
                        slot.muscle_group,
                        slot.sets
                    );
                    *orphaned[day_index].entry(slot.muscle_group).or_insert(0) += slot.sets;
                }
            }
        }
    }

    for (day_index, pool) in orphaned.into_iter().enumerate() {
        for (group, sets) in pool {
            redistribute_orphaned(&mut days, day_index, group, sets)?;
        }
    }

    if let Some(empty) = days.iter().position(|d| d.is_empty()) {
        return Err(Error::NoExercisesForDay(empty));
    }

    let result = ExerciseTemplate {
        split_type: template.split_type,
        days,
    };
    tracing::info!(
        "Picked {} exercises ({} sets) over {} days",
        result.days.iter().map(|d| d.len()).sum::<usize>(),
        result.total_sets(),
        result.days.len()
    );
    Ok(result)
}

fn redistribute_orphaned(
    days: &mut [Vec<TemplateExercise>],
    day_index: usize,
    group: MuscleGroup,
    sets: u32,
) -> Result<()> {
    let mut targets: Vec<(usize, usize)> = days[day_index]
        .iter()
        .enumerate()
        .filter(|(_, e)| e.exercise.muscle_group() == group)
        .map(|(i, _)| (day_index, i))
        .collect();

    if targets.is_empty() {
        targets = days
            .iter()
            .enumerate()
            .flat_map(|(d, day)| {
                day.iter()
                    .enumerate()
                    .filter(|(_, e)| e.exercise.muscle_group() == group)
                    .map(move |(i, _)| (d, i))
            })
            .collect();
    }

    if targets.is_empty() {
        tracing::warn!("No {} exercise picked anywhere this week", group);
        return Err(Error::NoExercisesForMuscleGroup { group, sets });
    }

    for ((d, i), share) in targets.iter().zip(distribute(sets, targets.len())) {
        days[*d][*i].sets += share;
    }
    Ok(())
}

/// Every exercise of a group in provider order: custom first, then by pattern
fn group_order(catalog: &Catalog, group: MuscleGroup) -> Vec<&ProvidedExercise> {
    let mut ordered: Vec<&ProvidedExercise> =
        catalog.for_muscle_group(group).filter(|e| e.is_custom()).collect();
    for pattern in movement_patterns(group) {
        ordered.extend(curated_for_pattern(catalog, group, *pattern, None));
    }
    ordered
}

/// Ordered replacement candidates for an exercise
///
/// Same movement pattern first, then the rest of the muscle group, then the
/// anatomically related groups.
pub fn replacement_candidates<'a>(
    catalog: &'a Catalog,
    original_id: &str,
    group: MuscleGroup,
    excluded_ids: &HashSet<String>,
) -> Vec<&'a ProvidedExercise> {
    let mut ordered: Vec<&ProvidedExercise> = Vec::new();

    if let Some(pattern) = catalog.find(original_id).and_then(|e| e.movement_pattern()) {
        ordered.extend(curated_for_pattern(catalog, group, pattern, None));
    }
    ordered.extend(group_order(catalog, group));
    for related in group.related() {
        ordered.extend(group_order(catalog, related));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    ordered
        .into_iter()
        .filter(|e| e.id() != original_id && !excluded_ids.contains(e.id()))
        .filter(|e| seen.insert(e.id()))
        .collect()
}
