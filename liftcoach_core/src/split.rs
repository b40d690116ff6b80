//! Split selection: turning a weekly volume map into training days.
//!
//! Each supported day count has an ordered chain of strategies. A strategy
//! that finds the volume too unbalanced for its halves (or thirds) returns
//! `None` and the next strategy is tried. Full-body never fails, so every
//! chain terminates with a template.

use crate::{Error, MuscleGroup, Result, SplitSlot, SplitTemplate, SplitType, VolumePerMuscleGroup};

/// Allowed deviation of each push/pull/legs share from one third
pub const PPL_TOLERANCE: f64 = 0.05;
/// Allowed deviation of the two halves' ratio from 1.0
pub const HALVES_TOLERANCE: f64 = 0.2;
/// Preferred number of sets per exercise
pub const IDEAL_SETS_PER_EXERCISE: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Strategy {
    PushPullLegs(usize),
    UpperLower(usize),
    PushPull(usize),
    FullBody(usize),
}

const TWO_DAYS: &[Strategy] = &[
    Strategy::UpperLower(2),
    Strategy::PushPull(2),
    Strategy::FullBody(4),
];
const THREE_DAYS: &[Strategy] = &[
    Strategy::PushPullLegs(3),
    Strategy::UpperLower(4),
    Strategy::PushPull(4),
    Strategy::FullBody(3),
];
const FOUR_DAYS: &[Strategy] = &[
    Strategy::UpperLower(4),
    Strategy::PushPull(4),
    Strategy::FullBody(4),
];
const FIVE_DAYS: &[Strategy] = &[
    Strategy::PushPullLegs(6),
    Strategy::UpperLower(6),
    Strategy::PushPull(6),
    Strategy::FullBody(5),
];
const SIX_DAYS: &[Strategy] = &[
    Strategy::PushPullLegs(6),
    Strategy::UpperLower(6),
    Strategy::PushPull(6),
    Strategy::FullBody(6),
];

fn strategies_for(days: u32) -> Option<&'static [Strategy]> {
    match days {
        2 => Some(TWO_DAYS),
        3 => Some(THREE_DAYS),
        4 => Some(FOUR_DAYS),
        5 => Some(FIVE_DAYS),
        6 => Some(SIX_DAYS),
        _ => None,
    }
}

/// 0 = push, 1 = pull, 2 = legs
fn ppl_category(group: MuscleGroup) -> usize {
    match group {
        MuscleGroup::Chest | MuscleGroup::SideDelts | MuscleGroup::Triceps => 0,
        MuscleGroup::Back | MuscleGroup::RearDelts | MuscleGroup::Biceps => 1,
        MuscleGroup::Quads | MuscleGroup::Hamstrings | MuscleGroup::Glutes | MuscleGroup::Calves => {
            2
        }
    }
}

/// 0 = upper, 1 = lower
fn upper_lower_category(group: MuscleGroup) -> usize {
    if ppl_category(group) == 2 {
        1
    } else {
        0
    }
}

/// 0 = push day (with quads and calves), 1 = pull day (with the posterior chain)
fn push_pull_category(group: MuscleGroup) -> usize {
    match group {
        MuscleGroup::Chest
        | MuscleGroup::SideDelts
        | MuscleGroup::Triceps
        | MuscleGroup::Quads
        | MuscleGroup::Calves => 0,
        MuscleGroup::Back
        | MuscleGroup::RearDelts
        | MuscleGroup::Biceps
        | MuscleGroup::Hamstrings
        | MuscleGroup::Glutes => 1,
    }
}

/// Select a split for the given weekly volume and number of training days
pub fn select_split(volume: &VolumePerMuscleGroup, days: u32) -> Result<SplitTemplate> {
    let strategies = strategies_for(days).ok_or(Error::NoSuitableSplit(days))?;

    for strategy in strategies {
        if let Some(template) = try_strategy(volume, *strategy) {
            tracing::info!(
                "Selected {:?} split with {} workouts for {} training days",
                template.split_type,
                template.days.len(),
                days
            );
            return Ok(ensure_ideal_sets_per_exercise(template, volume));
        }
        tracing::debug!("{:?} rejected for {} training days", strategy, days);
    }

    Err(Error::NoSuitableSplit(days))
}

fn try_strategy(volume: &VolumePerMuscleGroup, strategy: Strategy) -> Option<SplitTemplate> {
    match strategy {
        Strategy::PushPullLegs(buckets) => {
            let shares = category_totals(volume, 3, ppl_category);
            let total: u32 = shares.iter().sum();
            if total == 0 {
                return None;
            }
            let balanced = shares
                .iter()
                .all(|s| (*s as f64 / total as f64 - 1.0 / 3.0).abs() <= PPL_TOLERANCE + 1e-9);
            balanced.then(|| SplitTemplate {
                split_type: SplitType::PushPullLegs,
                days: distribute_by_category(volume, buckets, 3, ppl_category),
            })
        }
        Strategy::UpperLower(buckets) => halves_balanced(volume, upper_lower_category).then(|| {
            SplitTemplate {
                split_type: SplitType::UpperLower,
                days: distribute_by_category(volume, buckets, 2, upper_lower_category),
            }
        }),
        Strategy::PushPull(buckets) => halves_balanced(volume, push_pull_category).then(|| {
            SplitTemplate {
                split_type: SplitType::PushPull,
                days: distribute_by_category(volume, buckets, 2, push_pull_category),
            }
        }),
        Strategy::FullBody(buckets) => Some(full_body(volume, buckets)),
    }
}

fn category_totals(
    volume: &VolumePerMuscleGroup,
    categories: usize,
    classify: fn(MuscleGroup) -> usize,
) -> Vec<u32> {
    let mut totals = vec![0; categories];
    for (group, sets) in volume.iter() {
        totals[classify(group)] += sets;
    }
    totals
}

fn halves_balanced(volume: &VolumePerMuscleGroup, classify: fn(MuscleGroup) -> usize) -> bool {
    let totals = category_totals(volume, 2, classify);
    if totals[1] == 0 {
        return false;
    }
    (totals[0] as f64 / totals[1] as f64 - 1.0).abs() <= HALVES_TOLERANCE + 1e-9
}

/// Split `sets` into `parts` near-equal shares, the first shares taking the remainder
pub fn distribute(sets: u32, parts: usize) -> Vec<u32> {
    if parts == 0 {
        return Vec::new();
    }
    let base = sets / parts as u32;
    let remainder = (sets % parts as u32) as usize;
    (0..parts)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Rotate categories over the buckets and spread each group across its days
fn distribute_by_category(
    volume: &VolumePerMuscleGroup,
    buckets: usize,
    categories: usize,
    classify: fn(MuscleGroup) -> usize,
) -> Vec<Vec<SplitSlot>> {
    let mut days: Vec<Vec<SplitSlot>> = vec![Vec::new(); buckets];

    for (group, sets) in volume.iter() {
        let category = classify(group);
        let category_days: Vec<usize> = (0..buckets).filter(|d| d % categories == category).collect();
        for (day, share) in category_days
            .iter()
            .zip(distribute(sets, category_days.len()))
        {
            if share > 0 {
                days[*day].push(SplitSlot {
                    muscle_group: group,
                    sets: share,
                });
            }
        }
    }

    days
}

fn full_body(volume: &VolumePerMuscleGroup, buckets: usize) -> SplitTemplate {
    let mut days: Vec<Vec<SplitSlot>> = vec![Vec::new(); buckets];
    for (group, sets) in volume.iter() {
        for (day, share) in distribute(sets, buckets).into_iter().enumerate() {
            if share > 0 {
                days[day].push(SplitSlot {
                    muscle_group: group,
                    sets: share,
                });
            }
        }
    }
    SplitTemplate {
        split_type: SplitType::FullBody,
        days,
    }
}

/// Break each day's muscle group volume into exercises of ideal size
///
/// Same-group slots are merged, chunked into 4-set exercises plus a
/// remainder, a lone 1-set remainder is folded into a sibling (or raised to
/// 2 sets), and slots are ordered by their group's weekly volume.
pub fn ensure_ideal_sets_per_exercise(
    template: SplitTemplate,
    volume: &VolumePerMuscleGroup,
) -> SplitTemplate {
    let days = template
        .days
        .into_iter()
        .map(|day| {
            let mut merged: Vec<(MuscleGroup, u32)> = Vec::new();
            for slot in day {
                match merged.iter_mut().find(|(g, _)| *g == slot.muscle_group) {
                    Some((_, sets)) => *sets += slot.sets,
                    None => merged.push((slot.muscle_group, slot.sets)),
                }
            }

            let mut slots: Vec<SplitSlot> = merged
                .into_iter()
                .filter(|(_, sets)| *sets > 0)
                .flat_map(|(group, sets)| {
                    chunk_sets(sets).into_iter().map(move |s| SplitSlot {
                        muscle_group: group,
                        sets: s,
                    })
                })
                .collect();

            slots.sort_by(|a, b| volume.get(b.muscle_group).cmp(&volume.get(a.muscle_group)));
            slots
        })
        .collect();

    SplitTemplate {
        split_type: template.split_type,
        days,
    }
}

/// Chunk a group's daily sets into exercise-sized pieces
fn chunk_sets(sets: u32) -> Vec<u32> {
    let mut chunks = vec![IDEAL_SETS_PER_EXERCISE; (sets / IDEAL_SETS_PER_EXERCISE) as usize];
    match sets % IDEAL_SETS_PER_EXERCISE {
        0 => {}
        1 => match chunks.last_mut() {
            Some(last) => *last += 1,
            None => chunks.push(2),
        },
        remainder => chunks.push(remainder),
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn volume(entries: &[(MuscleGroup, u32)]) -> VolumePerMuscleGroup {
        VolumePerMuscleGroup(entries.iter().copied().collect::<BTreeMap<_, _>>())
    }

    fn balanced(sets: u32) -> VolumePerMuscleGroup {
        volume(
            &MuscleGroup::all()
                .iter()
                .map(|g| (*g, sets))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_chunk_sets() {
        assert_eq!(chunk_sets(4), vec![4]);
        assert_eq!(chunk_sets(5), vec![5]);
        assert_eq!(chunk_sets(9), vec![4, 5]);
        assert_eq!(chunk_sets(10), vec![4, 4, 2]);
        assert_eq!(chunk_sets(13), vec![4, 4, 5]);
        assert_eq!(chunk_sets(3), vec![3]);
        assert_eq!(chunk_sets(1), vec![2]);
    }

    #[test]
    fn test_distribute_gives_remainder_to_first() {
        assert_eq!(distribute(7, 3), vec![3, 2, 2]);
        assert_eq!(distribute(2, 4), vec![1, 1, 0, 0]);
        assert_eq!(distribute(0, 2), vec![0, 0]);
    }

    #[test]
    fn test_two_days_balanced_volume_uses_push_pull() {
        let template = select_split(&balanced(6), 2).unwrap();
        // Upper/lower is 36 vs 24 (ratio 1.5), push/pull is 30 vs 30
        assert_eq!(template.split_type, SplitType::PushPull);
        assert_eq!(template.days.len(), 2);
        assert_eq!(template.total_sets(), 60);
    }

    #[test]
    fn test_upper_lower_when_halves_balanced() {
        let v = volume(&[
            (MuscleGroup::Chest, 10),
            (MuscleGroup::Back, 10),
            (MuscleGroup::Quads, 10),
            (MuscleGroup::Hamstrings, 9),
        ]);
        let template = select_split(&v, 4).unwrap();
        assert_eq!(template.split_type, SplitType::UpperLower);
        assert_eq!(template.days.len(), 4);
        let day0: Vec<_> = template.days[0].iter().map(|s| s.muscle_group).collect();
        assert!(day0.contains(&MuscleGroup::Chest));
        assert!(!day0.contains(&MuscleGroup::Quads));
        assert_eq!(template.total_sets(), 39);
    }

    #[test]
    fn test_three_days_prefers_ppl_when_thirds_balanced() {
        let v = volume(&[
            (MuscleGroup::Chest, 12),
            (MuscleGroup::Triceps, 8),
            (MuscleGroup::Back, 12),
            (MuscleGroup::Biceps, 8),
            (MuscleGroup::Quads, 12),
            (MuscleGroup::Hamstrings, 8),
        ]);
        let template = select_split(&v, 3).unwrap();
        assert_eq!(template.split_type, SplitType::PushPullLegs);
        assert_eq!(template.days.len(), 3);
        assert!(template.days[2]
            .iter()
            .all(|s| matches!(s.muscle_group, MuscleGroup::Quads | MuscleGroup::Hamstrings)));
    }

    #[test]
    fn test_three_days_falls_back_when_ppl_unbalanced() {
        // Legs hold 40% of the volume
        let template = select_split(&balanced(6), 3).unwrap();
        assert_eq!(template.split_type, SplitType::PushPull);
        assert_eq!(template.days.len(), 4);
    }

    #[test]
    fn test_full_body_fallback() {
        let v = volume(&[(MuscleGroup::Chest, 9), (MuscleGroup::Biceps, 3)]);
        let template = select_split(&v, 4).unwrap();
        assert_eq!(template.split_type, SplitType::FullBody);
        assert_eq!(template.days.len(), 4);
        // Chest 9 over 4 buckets: 3, 2, 2, 2
        assert_eq!(template.days[0][0].muscle_group, MuscleGroup::Chest);
        assert_eq!(template.days[0][0].sets, 3);
    }

    #[test]
    fn test_unsupported_day_count() {
        assert!(matches!(
            select_split(&balanced(6), 7),
            Err(Error::NoSuitableSplit(7))
        ));
        assert!(matches!(
            select_split(&balanced(6), 1),
            Err(Error::NoSuitableSplit(1))
        ));
    }

    #[test]
    fn test_days_sorted_by_weekly_volume() {
        let v = volume(&[
            (MuscleGroup::Chest, 4),
            (MuscleGroup::SideDelts, 12),
            (MuscleGroup::Back, 8),
            (MuscleGroup::Quads, 4),
            (MuscleGroup::Hamstrings, 12),
            (MuscleGroup::Biceps, 4),
        ]);
        let template = select_split(&v, 6).unwrap();
        for day in &template.days {
            let weekly: Vec<u32> = day.iter().map(|s| v.get(s.muscle_group)).collect();
            assert!(weekly.windows(2).all(|w| w[0] >= w[1]), "{:?}", day);
        }
    }

    #[test]
    fn test_every_supported_day_count_produces_template() {
        for days in 2..=6 {
            let template = select_split(&balanced(5), days).unwrap();
            assert!(!template.days.is_empty());
            assert!(template.total_sets() >= 50);
        }
    }
}
