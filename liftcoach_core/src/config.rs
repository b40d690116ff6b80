//! Configuration file support for liftcoach.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/liftcoach/config.toml`.

use crate::{Error, MuscleGroup, ProvidedExercise, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub planning: PlanningConfig,

    #[serde(default)]
    pub progression: ProgressionConfig,

    #[serde(default)]
    pub athlete: AthleteConfig,

    #[serde(default)]
    pub exercises: ExercisesConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Weekly volume bounds used by the volume calculator
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanningConfig {
    #[serde(default = "default_min_sets_per_microcycle")]
    pub min_sets_per_microcycle: u32,

    #[serde(default = "default_max_sets_per_microcycle")]
    pub max_sets_per_microcycle: u32,

    #[serde(default = "default_max_sets_per_workout")]
    pub max_sets_per_workout: u32,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            min_sets_per_microcycle: default_min_sets_per_microcycle(),
            max_sets_per_microcycle: default_max_sets_per_microcycle(),
            max_sets_per_workout: default_max_sets_per_workout(),
        }
    }
}

/// Block length and progression knobs
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Training weeks after the testing week
    #[serde(default = "default_training_weeks")]
    pub training_weeks: u32,

    /// Rolling completed sets per day above which volume is regressed
    #[serde(default)]
    pub max_rolling_sets_per_day: Option<f64>,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            training_weeks: default_training_weeks(),
            max_rolling_sets_per_day: None,
        }
    }
}

/// Per-athlete settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AthleteConfig {
    /// Multiplier applied to every computed weight
    #[serde(default = "default_load_coefficient")]
    pub load_coefficient: f64,
}

impl Default for AthleteConfig {
    fn default() -> Self {
        Self {
            load_coefficient: default_load_coefficient(),
        }
    }
}

/// Custom exercise definition
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomExercise {
    pub id: String,
    pub name: String,
    pub muscle_group: MuscleGroup,
}

impl From<&CustomExercise> for ProvidedExercise {
    fn from(custom: &CustomExercise) -> Self {
        ProvidedExercise::Custom {
            id: custom.id.clone(),
            name: custom.name.clone(),
            muscle_group: custom.muscle_group,
        }
    }
}

/// User exercises configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ExercisesConfig {
    #[serde(default)]
    pub custom: Vec<CustomExercise>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        PathBuf::from(home).join(".local/share")
    });
    base.join("liftcoach")
}

fn default_min_sets_per_microcycle() -> u32 {
    40
}

fn default_max_sets_per_microcycle() -> u32 {
    140
}

fn default_max_sets_per_workout() -> u32 {
    30
}

fn default_training_weeks() -> u32 {
    5
}

fn default_load_coefficient() -> f64 {
    1.0
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
        base.join("liftcoach").join("config.toml")
    }

    /// Check the numeric knobs before they reach the engine
    pub fn validate(&self) -> Result<()> {
        let planning = &self.planning;
        if planning.min_sets_per_microcycle > planning.max_sets_per_microcycle {
            return Err(Error::Config(format!(
                "min_sets_per_microcycle ({}) exceeds max_sets_per_microcycle ({})",
                planning.min_sets_per_microcycle, planning.max_sets_per_microcycle
            )));
        }
        if planning.max_sets_per_workout == 0 {
            return Err(Error::Config(
                "max_sets_per_workout must be greater than 0".into(),
            ));
        }
        if self.progression.training_weeks == 0 {
            return Err(Error::Config("training_weeks must be at least 1".into()));
        }
        if !(self.athlete.load_coefficient > 0.0) {
            return Err(Error::Config(format!(
                "load_coefficient must be positive, got {}",
                self.athlete.load_coefficient
            )));
        }
        if let Some(limit) = self.progression.max_rolling_sets_per_day {
            if !(limit > 0.0) {
                return Err(Error::Config(format!(
                    "max_rolling_sets_per_day must be positive, got {}",
                    limit
                )));
            }
        }
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
