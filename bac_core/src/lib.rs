#![forbid(unsafe_code)]

//! Core domain model and computation for bacwatch.
//!
//! This crate provides:
//! - Domain types (drinks, profiles, BAC samples)
//! - Pure-alcohol calculation and Widmark BAC estimation
//! - Elimination strategies and status classification
//! - A cancellable refresh scheduler
//! - The storage contract plus file and in-memory stores

pub mod types;
pub mod error;
pub mod alcohol;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod drink_log;
pub mod profile_state;
pub mod store;
pub mod export;
pub mod elimination;
pub mod estimator;
pub mod status;
pub mod intake;
pub mod reading;
pub mod scheduler;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use alcohol::{pure_alcohol, PureAlcohol};
pub use catalog::{default_presets, preset_for, DrinkPreset};
pub use config::Config;
pub use store::{DrinkStore, FileStore, MemoryStore};
pub use elimination::EliminationStrategy;
pub use estimator::{estimate, estimate_with, Estimate};
pub use status::{classify, classify_for, Status, StatusTier};
pub use intake::IntakeSummary;
pub use reading::{take_reading, Reading, ReadingOptions};
pub use scheduler::{schedule, RefreshScheduler, RefreshTrigger, ScheduleHandle, SchedulerState};
