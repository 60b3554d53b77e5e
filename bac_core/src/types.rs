//! Core domain types for the bacwatch system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Drink events and the drafts they are created from
//! - Physiological profiles
//! - Derived BAC samples
//! - User identifiers and time windows used by stores

use crate::{Error, Result};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lightest body weight accepted for a profile
pub const MIN_WEIGHT_KG: f64 = 20.0;

/// Heaviest body weight accepted for a profile
pub const MAX_WEIGHT_KG: f64 = 300.0;

// ============================================================================
// Drink Types
// ============================================================================

/// Opaque drink identifier
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct DrinkId(pub Uuid);

impl DrinkId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DrinkId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DrinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for DrinkId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(DrinkId)
            .map_err(|e| Error::invalid(format!("drink id {:?}: {}", s, e)))
    }
}

/// What was drunk. Display only; computation never looks at it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DrinkKind {
    Beer,
    Wine,
    Spirits,
    Other(String),
}

impl DrinkKind {
    /// Parse a user-supplied label, falling back to [`DrinkKind::Other`]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "beer" => DrinkKind::Beer,
            "wine" => DrinkKind::Wine,
            "spirits" | "spirit" | "liquor" => DrinkKind::Spirits,
            _ => DrinkKind::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DrinkKind::Beer => "beer",
            DrinkKind::Wine => "wine",
            DrinkKind::Spirits => "spirits",
            DrinkKind::Other(label) => label,
        }
    }
}

impl fmt::Display for DrinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fields supplied by the event-capture collaborator when logging a drink
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewDrink {
    pub kind: DrinkKind,
    pub timestamp: DateTime<Utc>,
    pub volume_cc: f64,
    pub abv_percent: f64,
}

impl NewDrink {
    /// Check the volume and strength invariants
    pub fn validate(&self) -> Result<()> {
        crate::alcohol::check_volume(self.volume_cc)?;
        crate::alcohol::check_abv(self.abv_percent)?;
        Ok(())
    }
}

/// A logged drink
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DrinkEvent {
    pub id: DrinkId,
    pub kind: DrinkKind,
    pub timestamp: DateTime<Utc>,
    pub volume_cc: f64,
    pub abv_percent: f64,
}

impl DrinkEvent {
    /// Validate a draft and assign it a fresh id
    pub fn create(draft: NewDrink) -> Result<Self> {
        draft.validate()?;
        Ok(Self {
            id: DrinkId::new(),
            kind: draft.kind,
            timestamp: draft.timestamp,
            volume_cc: draft.volume_cc,
            abv_percent: draft.abv_percent,
        })
    }

    /// Pure alcohol content of this drink
    pub fn pure_alcohol(&self) -> Result<crate::PureAlcohol> {
        crate::alcohol::pure_alcohol(self.volume_cc, self.abv_percent)
    }
}

// ============================================================================
// Profile Types
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Widmark body-water distribution ratio
    pub fn widmark_r(self) -> f64 {
        match self {
            Gender::Male => 0.68,
            Gender::Female => 0.55,
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(Error::invalid(format!(
                "gender must be male or female, got {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("male"),
            Gender::Female => f.write_str("female"),
        }
    }
}

/// Physiological profile used for the Widmark estimate
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub gender: Gender,
    pub weight_kg: f64,
}

impl Profile {
    pub fn new(gender: Gender, weight_kg: f64) -> Result<Self> {
        let profile = Self { gender, weight_kg };
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.weight_kg.is_finite()
            || self.weight_kg < MIN_WEIGHT_KG
            || self.weight_kg > MAX_WEIGHT_KG
        {
            return Err(Error::invalid(format!(
                "weight must be between {} and {} kg, got {}",
                MIN_WEIGHT_KG, MAX_WEIGHT_KG, self.weight_kg
            )));
        }
        Ok(())
    }
}

/// BAC value at an instant. Derived, never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BacSample {
    pub at: DateTime<Utc>,
    /// Percent BAC, never negative
    pub value: f64,
}

// ============================================================================
// Store Addressing
// ============================================================================

/// Identifier scoping a user's drinks and profile
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Accepts `[A-Za-z0-9_.-]+` not starting with a dot, so ids are safe as
    /// directory names.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let valid_chars = id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if id.is_empty() || id.starts_with('.') || !valid_chars {
            return Err(Error::invalid(format!("invalid user id {:?}", id)));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        UserId::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Half-open time range `[start, end)`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(Error::invalid(format!(
                "window end {} precedes start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Every instant
    pub fn all() -> Self {
        Self {
            start: DateTime::<Utc>::MIN_UTC,
            end: DateTime::<Utc>::MAX_UTC,
        }
    }

    /// The calendar day `date` as observed in `tz`
    pub fn day_of<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<Self> {
        let start = local_midnight(date, tz)?;
        let next = date
            .succ_opt()
            .ok_or_else(|| Error::invalid(format!("no day after {}", date)))?;
        let end = local_midnight(next, tz)?;
        Self::new(start, end)
    }

    /// Everything from `hours` before `now` onwards. Drinks stamped after
    /// `now` stay included; the estimator treats them as undecayed.
    ///
    /// The start saturates at the earliest representable instant.
    pub fn lookback(now: DateTime<Utc>, hours: u32) -> Self {
        let start = now
            .checked_sub_signed(Duration::hours(i64::from(hours)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self {
            start,
            end: DateTime::<Utc>::MAX_UTC,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<DateTime<Utc>> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::invalid(format!("no midnight on {}", date)))?;
    // Midnight can fall in a DST gap; take the first valid instant after it.
    let local = tz
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .ok_or_else(|| Error::invalid(format!("midnight of {} does not exist locally", date)))?;
    Ok(local.with_timezone(&Utc))
}
