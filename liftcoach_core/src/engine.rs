//! Planning pipeline for a new training block.
//!
//! Runs the three planning stages in order:
//! 1. Volume calculator: priorities and experience become weekly sets
//! 2. Split selector: weekly sets are spread over day-slots
//! 3. Exercise picker: every slot gets a concrete exercise
//!
//! The resulting `ExerciseTemplate` is what the aggregate turns into a block.

use crate::config::PlanningConfig;
use crate::picker::pick_exercises;
use crate::split::select_split;
use crate::volume::get_volume_per_muscle_group;
use crate::{
    AthleteProfile, Catalog, Error, ExerciseTemplate, Result, SplitTemplate, VolumePerMuscleGroup,
};
use serde::{Deserialize, Serialize};

/// Every intermediate artifact of a planning run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgramPlan {
    pub volume: VolumePerMuscleGroup,
    pub split: SplitTemplate,
    pub template: ExerciseTemplate,
}

/// Plan a program for an athlete profile
pub fn plan_program(
    profile: &AthleteProfile,
    catalog: &Catalog,
    config: &PlanningConfig,
) -> Result<ProgramPlan> {
    let issues = catalog.validate();
    if !issues.is_empty() {
        return Err(Error::CatalogValidation(issues.join("; ")));
    }

    let volume = get_volume_per_muscle_group(
        &profile.priorities,
        profile.experience,
        profile.training_days,
        config,
    )?;
    if volume.is_empty() {
        return Err(Error::Config(
            "every muscle group has priority 0; nothing to plan".into(),
        ));
    }

    let split = select_split(&volume, profile.training_days)?;
    let template = pick_exercises(&split, profile.experience, catalog)?;

    tracing::info!(
        "Planned {} exercises over {} workouts ({} weekly sets)",
        template.days.iter().map(Vec::len).sum::<usize>(),
        template.days.len(),
        template.total_sets()
    );

    Ok(ProgramPlan {
        volume,
        split,
        template,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::volume::default_priorities;
    use crate::{ExperienceLevel, MuscleGroup, MusclePriority, SplitType};

    fn profile(experience: ExperienceLevel, training_days: u32) -> AthleteProfile {
        AthleteProfile {
            experience,
            priorities: default_priorities(),
            training_days,
        }
    }

    #[test]
    fn test_plan_two_days_intermediate() {
        let plan = plan_program(
            &profile(ExperienceLevel::Intermediate, 2),
            get_default_catalog(),
            &PlanningConfig::default(),
        )
        .unwrap();

        assert_eq!(plan.volume.len(), 10);
        assert_eq!(plan.split.days.len(), 2);
        // Upper holds 36 of 60 sets, so the halves fall back to push/pull
        assert_eq!(plan.split.split_type, SplitType::PushPull);
        assert_eq!(plan.template.total_sets(), plan.volume.total());
        assert!(plan.template.days.iter().all(|d| !d.is_empty()));
    }

    #[test]
    fn test_plan_every_supported_day_count() {
        for days in 2..=6 {
            let plan = plan_program(
                &profile(ExperienceLevel::Advanced, days),
                get_default_catalog(),
                &PlanningConfig::default(),
            );
            match plan {
                Ok(plan) => assert_eq!(plan.template.total_sets(), plan.volume.total()),
                Err(e) => assert!(
                    matches!(e, Error::NoExercisesForDay(_)),
                    "{} days failed with {}",
                    days,
                    e
                ),
            }
        }
    }

    #[test]
    fn test_plan_rejects_unsupported_days() {
        let result = plan_program(
            &profile(ExperienceLevel::Beginner, 7),
            get_default_catalog(),
            &PlanningConfig::default(),
        );
        assert!(matches!(result, Err(Error::NoSuitableSplit(7))));
    }

    #[test]
    fn test_plan_rejects_all_zero_priorities() {
        let mut athlete = profile(ExperienceLevel::Beginner, 3);
        athlete.priorities = vec![MusclePriority {
            muscle_group: MuscleGroup::Chest,
            priority: 0,
        }];
        let result = plan_program(
            &athlete,
            get_default_catalog(),
            &PlanningConfig::default(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_plan_rejects_invalid_catalog() {
        let catalog = Catalog::default();
        let result = plan_program(
            &profile(ExperienceLevel::Beginner, 3),
            &catalog,
            &PlanningConfig::default(),
        );
        assert!(matches!(result, Err(Error::CatalogValidation(_))));
    }
}
