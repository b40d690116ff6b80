use clap::{Parser, Subcommand};
use liftcoach_core::csv_export::export_sets_csv;
use liftcoach_core::insights::{
    get_cycle_progress_for_exercise, get_lift_coach_insights, get_rolling_average_volume,
    latest_loading_set, suggest_testing_weights, CycleProgress,
};
use liftcoach_core::picker::replacement_candidates;
use liftcoach_core::volume::default_priorities;
use liftcoach_core::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "liftcoach")]
#[command(about = "Periodized strength training planner and coach", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a new training block from an athlete profile
    Plan {
        /// Training days per week
        #[arg(long)]
        days: u32,

        /// none, beginner, intermediate, advanced or expert
        #[arg(long, default_value = "intermediate")]
        experience: ExperienceLevel,

        /// Muscle group priority as GROUP=PRIORITY (repeatable, 0 skips the group)
        #[arg(long = "priority", value_parser = parse_priority)]
        priorities: Vec<MusclePriority>,

        /// Show the plan without creating a block
        #[arg(long)]
        dry_run: bool,

        /// Replace a block that is still in progress
        #[arg(long)]
        force: bool,
    },

    /// Confirm the planned block
    Confirm,

    /// Show the current week
    Show,

    /// Start the next workout
    Start,

    /// Record the set an exercise was worked up to
    Load {
        /// Catalog id of an exercise in the current workout
        exercise: String,

        #[arg(long)]
        weight: f64,

        #[arg(long)]
        reps: u32,

        /// The set was taken to failure
        #[arg(long)]
        failure: bool,
    },

    /// Record the result of testing the suggested weight
    Test {
        exercise: String,

        #[arg(long)]
        weight: f64,

        #[arg(long)]
        reps: u32,
    },

    /// Mark a set done, failed or pending
    Set {
        exercise: String,

        /// Set number, starting at 1
        number: u32,

        /// done, failed or pending
        state: SetState,
    },

    /// Finish an exercise with an assessment
    FinishExercise {
        exercise: String,

        /// easy, moderate or hard
        #[arg(long, default_value = "moderate")]
        difficulty: Difficulty,

        /// too-light, just-right or too-heavy
        #[arg(long, default_value = "just-right")]
        load: LoadFeel,
    },

    /// Finish the current workout
    FinishWorkout {
        /// Diet quality, 1-10
        #[arg(long, requires = "sleep", value_parser = clap::value_parser!(u8).range(1..=10))]
        diet: Option<u8>,

        /// Sleep quality, 1-10
        #[arg(long, requires = "diet", value_parser = clap::value_parser!(u8).range(1..=10))]
        sleep: Option<u8>,
    },

    /// Swap an exercise of the current workout for another catalog exercise
    Replace {
        exercise: String,

        /// Catalog id of the replacement (defaults to the closest candidate)
        #[arg(long)]
        with: Option<String>,
    },

    /// Change the prescribed weight of an exercise
    Weight { exercise: String, weight: f64 },

    /// Close the current week and open the next
    Extend,

    /// Finish the block and plan the next one
    FinishBlock {
        /// Testing weight override as EXERCISE=WEIGHT (repeatable)
        #[arg(long = "weight", value_parser = parse_weight)]
        weights: Vec<(String, f64)>,
    },

    /// Abort the block
    Terminate,

    /// Weekly progress summary
    Insights {
        /// Show one exercise week by week
        #[arg(long)]
        exercise: Option<String>,
    },

    /// Export every set to CSV
    Export {
        /// Output path (defaults to sets.csv in the data directory)
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    liftcoach_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    let app = App {
        store: BlockStore::new(data_dir),
        config,
        json: cli.json,
    };

    match cli.command {
        Commands::Plan {
            days,
            experience,
            priorities,
            dry_run,
            force,
        } => cmd_plan(&app, days, experience, priorities, dry_run, force),
        Commands::Confirm => {
            let block = app.mutate(|agg| {
                agg.confirm_mesocycle()?;
                Ok(agg.block().clone())
            })?;
            app.emit(&block, || println!("✓ Block {} confirmed", block.id))
        }
        Commands::Show => {
            let block = app.store.load_required()?;
            app.emit(&block, || print_block(&block))
        }
        Commands::Start => {
            let workout = app.mutate(|agg| {
                let workout_id = agg.start_workout()?;
                workout_snapshot(agg.block(), workout_id)
            })?;
            app.emit(&workout, || print_workout(&workout))
        }
        Commands::Load {
            exercise: key,
            weight,
            reps,
            failure,
        } => {
            let exercise = app.mutate(|agg| {
                let exercise_id = current_exercise(agg.block(), &key)?;
                agg.exercise_loaded(exercise_id, LoadingSet { weight, reps }, failure)?;
                exercise_snapshot(agg.block(), exercise_id)
            })?;
            app.emit(&exercise, || print_exercise(&exercise))
        }
        Commands::Test {
            exercise: key,
            weight,
            reps,
        } => {
            let exercise = app.mutate(|agg| {
                let exercise_id = current_exercise(agg.block(), &key)?;
                agg.exercise_tested(exercise_id, LoadingSet { weight, reps })?;
                exercise_snapshot(agg.block(), exercise_id)
            })?;
            app.emit(&exercise, || print_exercise(&exercise))
        }
        Commands::Set {
            exercise: key,
            number,
            state,
        } => {
            let exercise = app.mutate(|agg| {
                let exercise_id = current_exercise(agg.block(), &key)?;
                let set_id = set_by_number(agg.block(), exercise_id, &key, number)?;
                agg.set_state_has_changed(exercise_id, set_id, state)?;
                exercise_snapshot(agg.block(), exercise_id)
            })?;
            app.emit(&exercise, || print_exercise(&exercise))
        }
        Commands::FinishExercise {
            exercise: key,
            difficulty,
            load,
        } => {
            let exercise = app.mutate(|agg| {
                let exercise_id = current_exercise(agg.block(), &key)?;
                agg.finish_exercise(exercise_id, Assessment { difficulty, load })?;
                exercise_snapshot(agg.block(), exercise_id)
            })?;
            app.emit(&exercise, || print_exercise(&exercise))
        }
        Commands::FinishWorkout { diet, sleep } => {
            let feedback = match (diet, sleep) {
                (Some(diet_quality), Some(sleep_quality)) => Some(LifestyleFeedback {
                    diet_quality,
                    sleep_quality,
                }),
                _ => None,
            };
            let workout = app.mutate(|agg| {
                let workout_id = current_workout(agg.block())?.id;
                agg.finish_workout(workout_id, feedback)?;
                workout_snapshot(agg.block(), workout_id)
            })?;
            app.emit(&workout, || print_workout(&workout))
        }
        Commands::Replace {
            exercise: key,
            with,
        } => cmd_replace(&app, &key, with.as_deref()),
        Commands::Weight {
            exercise: key,
            weight,
        } => {
            let exercise = app.mutate(|agg| {
                let exercise_id = current_exercise(agg.block(), &key)?;
                let history = exercise_snapshot(agg.block(), exercise_id)
                    .map(|e| latest_loading_set(agg.block(), &e.exercise.id))?;
                agg.exercise_weight_changed(exercise_id, weight, history)?;
                exercise_snapshot(agg.block(), exercise_id)
            })?;
            app.emit(&exercise, || print_exercise(&exercise))
        }
        Commands::Extend => {
            let microcycle = app.mutate(|agg| {
                agg.extend_microcycle()?;
                agg.block()
                    .open_microcycle()
                    .cloned()
                    .ok_or(Error::NoOpenMicrocycle)
            })?;
            app.emit(&microcycle, || print_microcycle(&microcycle))
        }
        Commands::FinishBlock { weights } => cmd_finish_block(&app, weights),
        Commands::Terminate => {
            let block = app.mutate(|agg| {
                agg.terminate_mesocycle()?;
                Ok(agg.block().clone())
            })?;
            app.emit(&block, || println!("✓ Block {} terminated", block.id))
        }
        Commands::Insights { exercise } => cmd_insights(&app, exercise),
        Commands::Export { path } => {
            let block = app.store.load_required()?;
            let path = path.unwrap_or_else(|| app.store.root().join("sets.csv"));
            let rows = export_sets_csv(&block, &path)?;
            let summary = ExportSummary { path, rows };
            app.emit(&summary, || {
                println!("✓ Exported {} sets", summary.rows);
                println!("  CSV: {}", summary.path.display());
            })
        }
    }
}

struct App {
    store: BlockStore,
    config: Config,
    json: bool,
}

impl App {
    fn settings(&self) -> BlockSettings {
        BlockSettings::from(&self.config)
    }

    /// Run one aggregate operation against the stored block and persist it
    fn mutate<T>(&self, op: impl FnOnce(&mut TrainingBlockAggregate<'_>) -> Result<T>) -> Result<T> {
        let ids = RandomIds;
        let clock = SystemClock;
        let settings = self.settings();
        self.store.update(|block| {
            let mut agg = TrainingBlockAggregate::load(block, settings, &ids, &clock);
            let output = op(&mut agg)?;
            let (block, events) = agg.into_parts();
            tracing::debug!("Committing {} events", events.len());
            Ok((block, events, output))
        })
    }

    fn emit<T: Serialize>(&self, value: &T, plain: impl FnOnce()) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            plain();
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct BlockTransition {
    finished: Uuid,
    successor: Mesocycle,
}

#[derive(Serialize)]
struct ExportSummary {
    path: PathBuf,
    rows: usize,
}

fn cmd_plan(
    app: &App,
    days: u32,
    experience: ExperienceLevel,
    overrides: Vec<MusclePriority>,
    dry_run: bool,
    force: bool,
) -> Result<()> {
    let mut priorities = default_priorities();
    for entry in overrides {
        if let Some(existing) = priorities
            .iter_mut()
            .find(|p| p.muscle_group == entry.muscle_group)
        {
            existing.priority = entry.priority;
        }
    }
    let profile = AthleteProfile {
        experience,
        priorities,
        training_days: days,
    };

    let catalog = Catalog::with_custom(&app.config.exercises.custom);
    let plan = plan_program(&profile, &catalog, &app.config.planning)?;

    if dry_run {
        return app.emit(&plan, || {
            print_plan(&plan);
            println!("\n[Dry run - no block created]");
        });
    }

    let previous = app.store.load()?;
    if let Some(previous) = &previous {
        if !previous.is_finished() && !force {
            return Err(Error::BlockInProgress(previous.id));
        }
    }
    let known_weights = previous
        .as_ref()
        .map(suggest_testing_weights)
        .unwrap_or_default();

    let ids = RandomIds;
    let clock = SystemClock;
    let agg = TrainingBlockAggregate::create_mesocycle(
        &plan.template,
        &known_weights,
        app.settings(),
        &ids,
        &clock,
    )?;
    let (block, events) = agg.into_parts();
    app.store.create(&block, &events)?;

    app.emit(&block, || {
        print_plan(&plan);
        println!();
        print_block(&block);
    })
}

fn cmd_replace(app: &App, key: &str, with: Option<&str>) -> Result<()> {
    let catalog = Catalog::with_custom(&app.config.exercises.custom);
    let exercise = app.mutate(|agg| {
        let block = agg.block();
        let workout = current_workout(block)?;
        let workout_id = workout.id;
        let exercise_id = current_exercise(block, key)?;
        let current = exercise_snapshot(block, exercise_id)?;

        let candidate = match with {
            Some(id) => catalog
                .find(id)
                .ok_or_else(|| Error::UnknownExercise(id.to_string()))?,
            None => {
                let taken: HashSet<String> = workout
                    .exercises
                    .iter()
                    .map(|e| e.exercise.id.clone())
                    .collect();
                replacement_candidates(
                    &catalog,
                    &current.exercise.id,
                    current.exercise.muscle_group,
                    &taken,
                )
                .into_iter()
                .next()
                .ok_or_else(|| Error::NoReplacement(current.exercise.id.clone()))?
            }
        };
        let history = latest_loading_set(block, candidate.id());

        let replacement_id = agg.replace_exercise(exercise_id, candidate, workout_id, history)?;
        exercise_snapshot(agg.block(), replacement_id)
    })?;
    app.emit(&exercise, || print_exercise(&exercise))
}

fn cmd_finish_block(app: &App, overrides: Vec<(String, f64)>) -> Result<()> {
    let ids = RandomIds;
    let clock = SystemClock;
    let settings = app.settings();

    let transition = app.store.update(|block| {
        let mut weights = suggest_testing_weights(&block);
        weights.extend(overrides);

        let mut agg = TrainingBlockAggregate::load(block, settings, &ids, &clock);
        let successor = agg.finish_mesocycle(&weights)?;
        let (finished, events) = agg.into_parts();
        let transition = BlockTransition {
            finished: finished.id,
            successor: successor.clone(),
        };
        Ok((successor, events, transition))
    })?;

    app.emit(&transition, || {
        println!("✓ Block {} finished", transition.finished);
        println!();
        print_block(&transition.successor);
    })
}

fn cmd_insights(app: &App, exercise: Option<String>) -> Result<()> {
    let block = app.store.load_required()?;

    if let Some(catalog_id) = exercise {
        let progress = get_cycle_progress_for_exercise(&block, &catalog_id);
        if progress.is_empty() {
            return Err(Error::UnknownExercise(catalog_id));
        }
        return app.emit(&progress, || print_progress(&catalog_id, &progress));
    }

    let insights = get_lift_coach_insights(&block);
    app.emit(&insights, || {
        for insight in insights.values() {
            println!("{}", insight.narrative);
        }
        if let Some(average) = get_rolling_average_volume(&block, chrono::Utc::now()) {
            println!("Rolling average: {:.1} sets per day", average);
        }
    })
}

// ----------------------------------------------------------------------------
// Addressing
// ----------------------------------------------------------------------------

/// The active workout, or the one `start` would pick next
fn current_workout(block: &Mesocycle) -> Result<&Workout> {
    if let Some(active) = block.active_workout() {
        return Ok(active);
    }
    block
        .open_microcycle()
        .and_then(|m| {
            m.workouts
                .iter()
                .filter(|w| w.state == WorkoutState::Pending)
                .min_by_key(|w| w.day_index)
        })
        .ok_or(Error::NoPendingWorkout)
}

/// Exercise of the current workout by catalog id or exercise uuid
fn current_exercise(block: &Mesocycle, key: &str) -> Result<Uuid> {
    current_workout(block)?
        .exercises
        .iter()
        .find(|e| e.exercise.id == key || e.id.to_string() == key)
        .map(|e| e.id)
        .ok_or_else(|| Error::UnknownExercise(key.to_string()))
}

fn set_by_number(block: &Mesocycle, exercise_id: Uuid, key: &str, number: u32) -> Result<Uuid> {
    let exercise = exercise_snapshot(block, exercise_id)?;
    exercise
        .state
        .sets()
        .iter()
        .find(|s| number > 0 && s.order == number - 1)
        .map(|s| s.id)
        .ok_or_else(|| Error::NoSuchSet {
            exercise: key.to_string(),
            number,
        })
}

fn exercise_snapshot(block: &Mesocycle, exercise_id: Uuid) -> Result<WorkingExercise> {
    block
        .find_exercise(exercise_id)
        .map(|(_, e)| e.clone())
        .ok_or(Error::ExerciseNotFound(exercise_id))
}

fn workout_snapshot(block: &Mesocycle, workout_id: Uuid) -> Result<Workout> {
    block
        .find_workout(workout_id)
        .cloned()
        .ok_or(Error::WorkoutNotFound(workout_id))
}

fn parse_priority(s: &str) -> std::result::Result<MusclePriority, String> {
    let (group, priority) = s
        .split_once('=')
        .ok_or_else(|| format!("expected GROUP=PRIORITY, got '{}'", s))?;
    Ok(MusclePriority {
        muscle_group: group.trim().parse()?,
        priority: priority
            .trim()
            .parse()
            .map_err(|e| format!("invalid priority '{}': {}", priority, e))?,
    })
}

fn parse_weight(s: &str) -> std::result::Result<(String, f64), String> {
    let (exercise, weight) = s
        .split_once('=')
        .ok_or_else(|| format!("expected EXERCISE=WEIGHT, got '{}'", s))?;
    let weight: f64 = weight
        .trim()
        .parse()
        .map_err(|e| format!("invalid weight '{}': {}", weight, e))?;
    if !(weight > 0.0) {
        return Err(format!("weight must be positive, got {}", weight));
    }
    Ok((exercise.trim().to_string(), weight))
}

// ----------------------------------------------------------------------------
// Display
// ----------------------------------------------------------------------------

fn print_plan(plan: &ProgramPlan) {
    println!(
        "{:?} split, {} weekly sets",
        plan.split.split_type,
        plan.volume.total()
    );
    for (group, sets) in plan.volume.iter() {
        println!("  {:<12} {:>3} sets", group.as_str(), sets);
    }
    for (day, exercises) in plan.template.days.iter().enumerate() {
        println!("Day {}", day + 1);
        for entry in exercises {
            println!("  {:<28} {} sets", entry.exercise.name(), entry.sets);
        }
    }
}

fn print_block(block: &Mesocycle) {
    let status = if block.is_finished() {
        "finished"
    } else if block.confirmed {
        "confirmed"
    } else {
        "planned"
    };
    println!("Block {} ({})", block.id, status);
    if let Some(microcycle) = block
        .open_microcycle()
        .or_else(|| block.microcycles.last())
    {
        print_microcycle(microcycle);
    }
}

fn print_microcycle(microcycle: &Microcycle) {
    if microcycle.index == 0 {
        println!("Testing week");
    } else {
        println!("Week {}", microcycle.index);
    }
    for workout in &microcycle.workouts {
        print_workout(workout);
    }
}

fn print_workout(workout: &Workout) {
    let status = match (workout.state, workout.active) {
        (WorkoutState::Completed, _) => "completed",
        (WorkoutState::Pending, true) => "active",
        (WorkoutState::Pending, false) => "pending",
    };
    println!("  Day {} [{}]", workout.day_index + 1, status);
    for exercise in &workout.exercises {
        print_exercise(exercise);
    }
}

fn print_exercise(exercise: &WorkingExercise) {
    let detail = match &exercise.state {
        ExerciseState::Loading => {
            format!("work up to a hard set of about {} reps", exercise.target_reps)
        }
        ExerciseState::Testing { testing_weight } => {
            format!("test {} x {}", testing_weight, exercise.target_reps)
        }
        ExerciseState::Tested { sets, .. }
        | ExerciseState::Loaded { sets, .. }
        | ExerciseState::Pending { sets, .. }
        | ExerciseState::Finished { sets, .. } => describe_sets(sets),
    };
    println!(
        "    {:<28} {:<9} {}",
        exercise.exercise.id,
        exercise.state.name(),
        detail
    );
}

fn describe_sets(sets: &[WorkingSet]) -> String {
    sets.iter()
        .map(|s| {
            let mark = match s.state {
                SetState::Pending => "",
                SetState::Done => " ✓",
                SetState::Failed => " ✗",
            };
            format!("{}x{}{}", s.reps, s.weight, mark)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_progress(catalog_id: &str, progress: &[CycleProgress]) {
    println!("{}", catalog_id);
    for week in progress {
        let top = week
            .top_weight
            .map(|w| format!("{}", w))
            .unwrap_or_else(|| "-".into());
        let estimate = week
            .estimated_one_rep_max
            .map(|e| format!("{:.1}", e))
            .unwrap_or_else(|| "-".into());
        println!(
            "  week {:<2} {:<9} top {:<6} done {:<2} failed {:<2} e1RM {}",
            week.cycle_index, week.state, top, week.sets_done, week.sets_failed, estimate
        );
    }
}
