//! Zero-order (Widmark) elimination of alcohol.
//!
//! The body removes alcohol at a constant rate of [`ELIMINATION_RATE_PER_HOUR`]
//! percent BAC per hour. Absorption is treated as instantaneous.
//!
//! Two ways of combining several drinks are provided as an explicit
//! [`EliminationStrategy`]:
//! - [`EliminationStrategy::IndependentDecay`] decays every drink on its own and
//!   sums the residuals. Order does not matter. This is the default.
//! - [`EliminationStrategy::RunningTotal`] walks drinks in time order, decaying a
//!   running total between them. Kept for parity with older estimates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Elimination rate β in percent BAC per hour
pub const ELIMINATION_RATE_PER_HOUR: f64 = 0.015;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Initial BAC added by one drink at the moment it was drunk
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contribution {
    pub at: DateTime<Utc>,
    pub initial_bac: f64,
}

/// How per-drink contributions combine into one BAC value
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EliminationStrategy {
    #[default]
    IndependentDecay,
    RunningTotal,
}

impl EliminationStrategy {
    /// Combine contributions into the BAC at `now`
    pub fn combine(self, contributions: &[Contribution], now: DateTime<Utc>) -> f64 {
        match self {
            EliminationStrategy::IndependentDecay => contributions
                .iter()
                .map(|c| decay(c.initial_bac, hours_between(c.at, now)))
                .sum(),
            EliminationStrategy::RunningTotal => running_total(contributions, now),
        }
    }
}

impl std::str::FromStr for EliminationStrategy {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "independent_decay" | "independent" => Ok(EliminationStrategy::IndependentDecay),
            "running_total" | "running" => Ok(EliminationStrategy::RunningTotal),
            other => Err(crate::Error::invalid(format!(
                "unknown elimination strategy {:?}",
                other
            ))),
        }
    }
}

/// Linear decay floored at zero
pub fn decay(bac: f64, hours: f64) -> f64 {
    (bac - ELIMINATION_RATE_PER_HOUR * hours.max(0.0)).max(0.0)
}

/// Fractional hours from `from` to `to`, clamped at zero
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let millis = (to - from).num_milliseconds();
    (millis as f64 / MILLIS_PER_HOUR).max(0.0)
}

fn running_total(contributions: &[Contribution], now: DateTime<Utc>) -> f64 {
    let mut ordered = contributions.to_vec();
    ordered.sort_by_key(|c| c.at);

    let mut total = 0.0;
    let mut last: Option<DateTime<Utc>> = None;
    for c in &ordered {
        if let Some(prev) = last {
            total = decay(total, hours_between(prev, c.at));
        }
        total += c.initial_bac;
        last = Some(c.at);
    }

    match last {
        Some(prev) => decay(total, hours_between(prev, now)),
        None => 0.0,
    }
}
