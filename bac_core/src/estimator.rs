//! BAC estimation from a drink log.
//!
//! Each drink contributes an initial BAC given by the Widmark formula:
//!
//! ```text
//! initial = grams / (weight_kg * 1000 * r) * 100
//! ```
//!
//! Contributions are then decayed to `now` by the chosen
//! [`EliminationStrategy`]. Without a profile no BAC can be computed; the
//! pure alcohol total is still tracked.

use crate::elimination::{Contribution, EliminationStrategy};
use crate::{BacSample, DrinkEvent, Profile, Result};
use chrono::{DateTime, Utc};

/// Result of one estimation pass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Estimate {
    /// Percent BAC at the reference instant, never negative
    pub bac: f64,
    /// Pure alcohol across all supplied drinks, in cc
    pub total_pure_cc: f64,
}

impl Estimate {
    pub const ZERO: Estimate = Estimate {
        bac: 0.0,
        total_pure_cc: 0.0,
    };

    pub fn sample(&self, at: DateTime<Utc>) -> BacSample {
        BacSample {
            at,
            value: self.bac,
        }
    }
}

/// Estimate BAC at `now` using independent per-drink decay
pub fn estimate(
    events: &[DrinkEvent],
    profile: Option<&Profile>,
    now: DateTime<Utc>,
) -> Result<Estimate> {
    estimate_with(EliminationStrategy::IndependentDecay, events, profile, now)
}

/// Estimate BAC at `now` with an explicit elimination strategy
///
/// Fails with [`crate::Error::InvalidInput`] if any drink or the profile breaks
/// its invariants. The result does not depend on the order of `events`
/// for [`EliminationStrategy::IndependentDecay`].
pub fn estimate_with(
    strategy: EliminationStrategy,
    events: &[DrinkEvent],
    profile: Option<&Profile>,
    now: DateTime<Utc>,
) -> Result<Estimate> {
    if let Some(profile) = profile {
        profile.validate()?;
    }

    let mut total_pure_cc = 0.0;
    let mut contributions = Vec::with_capacity(events.len());

    for event in events {
        let pure = event.pure_alcohol()?;
        total_pure_cc += pure.cc;

        if let Some(profile) = profile {
            contributions.push(Contribution {
                at: event.timestamp,
                initial_bac: initial_bac(pure.grams, profile),
            });
        }
    }

    let bac = match profile {
        Some(_) => strategy.combine(&contributions, now),
        None => 0.0,
    };

    tracing::debug!(
        "Estimated BAC {:.5}% from {} drinks ({:.1} cc pure, strategy {:?})",
        bac,
        events.len(),
        total_pure_cc,
        strategy
    );

    Ok(Estimate { bac, total_pure_cc })
}

/// Widmark peak BAC contributed by `grams` of ethanol
pub fn initial_bac(grams: f64, profile: &Profile) -> f64 {
    let weight_grams = profile.weight_kg * 1000.0;
    grams / (weight_grams * profile.gender.widmark_r()) * 100.0
}
