#![forbid(unsafe_code)]

//! Core domain model and periodization engine for liftcoach.
//!
//! This crate provides:
//! - Domain types (muscle groups, catalog entries, the training block tree)
//! - Planning: weekly volume, split selection, exercise picking
//! - Load math and progression rules
//! - The event-sourced training-block aggregate
//! - Persistence collaborators (snapshot store, event journal, CSV export)

pub mod types;
pub mod error;
pub mod ids;
pub mod config;
pub mod logging;
pub mod load_math;
pub mod volume;
pub mod split;
pub mod catalog;
pub mod picker;
pub mod engine;
pub mod progression;
pub mod events;
pub mod aggregate;
pub mod insights;
pub mod store;
pub mod wal;
pub mod csv_export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use ids::{Clock, FixedClock, IdGenerator, RandomIds, SequentialIds, SystemClock};
pub use engine::{plan_program, ProgramPlan};
pub use events::{apply, replay, Event};
pub use aggregate::{BlockSettings, TrainingBlockAggregate};
pub use store::BlockStore;
pub use wal::{EventSink, JsonlEventLog};
