//! Severity tiers for a BAC value.
//!
//! Bands are half-open and checked in ascending order; a value on a boundary
//! belongs to the higher band (0.05 is [`StatusTier::LegalLimitWarning`]).

use crate::Profile;
use serde::{Deserialize, Serialize};

/// Shown instead of the tier advice when no profile has been set up
pub const PROFILE_PROMPT: &str =
    "Set your gender and weight to estimate blood alcohol concentration.";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatusTier {
    NoReading,
    Normal,
    MildEffect,
    LegalLimitWarning,
    Intoxicated,
    Severe,
}

impl StatusTier {
    /// Numeric tier, 0 (no reading) through 5 (severe)
    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusTier::NoReading => "Normal / no reading",
            StatusTier::Normal => "Normal",
            StatusTier::MildEffect => "Mild effect",
            StatusTier::LegalLimitWarning => "Legal-limit warning",
            StatusTier::Intoxicated => "Intoxicated",
            StatusTier::Severe => "Severe / danger",
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            StatusTier::NoReading => "No alcohol detected.",
            StatusTier::Normal => "Minimal effect. Stay hydrated and pace yourself.",
            StatusTier::MildEffect => {
                "Mild relaxation and slower reactions. Consider stopping here."
            }
            StatusTier::LegalLimitWarning => {
                "Judgement is impaired and you are near the legal driving limit. Do not drive."
            }
            StatusTier::Intoxicated => {
                "Over the legal driving limit. Stop drinking and arrange a safe way home."
            }
            StatusTier::Severe => {
                "Dangerous level of intoxication. Stay with someone and seek medical help if symptoms worsen."
            }
        }
    }
}

/// Classification result for display
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Status {
    pub tier: StatusTier,
    pub label: String,
    pub description: String,
}

/// Map a BAC percentage to its tier
///
/// Anything not strictly positive (including NaN) is [`StatusTier::NoReading`].
pub fn classify(bac: f64) -> Status {
    let tier = tier_for(bac);
    Status {
        tier,
        label: tier.label().to_string(),
        description: tier.advice().to_string(),
    }
}

/// Like [`classify`], but prompts for a profile when none is set
pub fn classify_for(bac: f64, profile: Option<&Profile>) -> Status {
    let mut status = classify(bac);
    if profile.is_none() {
        status.description = PROFILE_PROMPT.to_string();
    }
    status
}

fn tier_for(bac: f64) -> StatusTier {
    if bac.is_nan() || bac <= 0.0 {
        StatusTier::NoReading
    } else if bac < 0.03 {
        StatusTier::Normal
    } else if bac < 0.05 {
        StatusTier::MildEffect
    } else if bac < 0.08 {
        StatusTier::LegalLimitWarning
    } else if bac < 0.15 {
        StatusTier::Intoxicated
    } else {
        StatusTier::Severe
    }
}
