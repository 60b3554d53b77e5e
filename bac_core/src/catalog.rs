//! Built-in drink presets.
//!
//! Presets supply the default serving size and strength when a drink is
//! logged by kind alone.

use crate::{DrinkKind, NewDrink, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

/// Default serving for a drink kind
#[derive(Clone, Debug, PartialEq)]
pub struct DrinkPreset {
    pub kind: DrinkKind,
    pub volume_cc: f64,
    pub abv_percent: f64,
}

impl DrinkPreset {
    /// Build a draft from this preset, overriding volume or strength if given
    pub fn draft(
        &self,
        timestamp: DateTime<Utc>,
        volume_cc: Option<f64>,
        abv_percent: Option<f64>,
    ) -> Result<NewDrink> {
        let draft = NewDrink {
            kind: self.kind.clone(),
            timestamp,
            volume_cc: volume_cc.unwrap_or(self.volume_cc),
            abv_percent: abv_percent.unwrap_or(self.abv_percent),
        };
        draft.validate()?;
        Ok(draft)
    }
}

/// Cached preset table
static DEFAULT_PRESETS: Lazy<Vec<DrinkPreset>> = Lazy::new(|| {
    vec![
        DrinkPreset {
            kind: DrinkKind::Beer,
            volume_cc: 330.0,
            abv_percent: 5.0,
        },
        DrinkPreset {
            kind: DrinkKind::Wine,
            volume_cc: 125.0,
            abv_percent: 12.0,
        },
        DrinkPreset {
            kind: DrinkKind::Spirits,
            volume_cc: 30.0,
            abv_percent: 40.0,
        },
    ]
});

/// All built-in presets
pub fn default_presets() -> &'static [DrinkPreset] {
    &DEFAULT_PRESETS
}

/// Preset for a kind; [`DrinkKind::Other`] has none
pub fn preset_for(kind: &DrinkKind) -> Option<&'static DrinkPreset> {
    DEFAULT_PRESETS.iter().find(|p| &p.kind == kind)
}
