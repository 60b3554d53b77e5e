//! One refresh worth of data for display.
//!
//! BAC always decays relative to the real present, over a lookback window of
//! recent drinks. The total and intake summary cover a separate display window
//! (usually a calendar day), so browsing an older day never freezes or
//! rewinds the live BAC.

use crate::elimination::EliminationStrategy;
use crate::estimator::estimate_with;
use crate::intake::IntakeSummary;
use crate::status::{classify_for, Status};
use crate::store::DrinkStore;
use crate::{BacSample, DrinkEvent, Profile, Result, TimeWindow, UserId};
use chrono::{DateTime, Utc};

/// Parameters that stay fixed across refreshes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReadingOptions {
    pub strategy: EliminationStrategy,
    pub lookback_hours: u32,
    pub daily_limit_cc: f64,
}

impl Default for ReadingOptions {
    fn default() -> Self {
        Self {
            strategy: EliminationStrategy::default(),
            lookback_hours: 48,
            daily_limit_cc: crate::intake::DEFAULT_DAILY_LIMIT_CC,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Reading {
    pub bac: BacSample,
    pub status: Status,
    pub intake: IntakeSummary,
    pub profile: Option<Profile>,
    /// Drinks in the display window, newest first
    pub drinks: Vec<DrinkEvent>,
}

/// Snapshot the store and compute a reading at `now`
pub fn take_reading<S: DrinkStore + ?Sized>(
    store: &S,
    user: &UserId,
    now: DateTime<Utc>,
    display: &TimeWindow,
    options: &ReadingOptions,
) -> Result<Reading> {
    let profile = store.get_profile(user)?;
    let recent = store.list_events(user, &TimeWindow::lookback(now, options.lookback_hours))?;
    let drinks = store.list_events(user, display)?;

    let live = estimate_with(options.strategy, &recent, profile.as_ref(), now)?;
    let shown = estimate_with(options.strategy, &drinks, None, now)?;

    Ok(Reading {
        bac: live.sample(now),
        status: classify_for(live.bac, profile.as_ref()),
        intake: IntakeSummary::new(shown.total_pure_cc, options.daily_limit_cc),
        profile,
        drinks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{StatusTier, PROFILE_PROMPT};
    use crate::store::MemoryStore;
    use crate::{DrinkKind, Gender, NewDrink};
    use chrono::{Duration, NaiveDate, Utc};

    fn spirits(at: DateTime<Utc>) -> NewDrink {
        NewDrink {
            kind: DrinkKind::Spirits,
            timestamp: at,
            volume_cc: 30.0,
            abv_percent: 40.0,
        }
    }

    #[test]
    fn test_reading_without_profile() {
        let mut store = MemoryStore::new();
        let user = UserId::new("sam").unwrap();
        let now = Utc::now();
        store.create_event(&user, spirits(now)).unwrap();

        let reading = take_reading(
            &store,
            &user,
            now,
            &TimeWindow::all(),
            &ReadingOptions::default(),
        )
        .unwrap();

        assert_eq!(reading.bac.value, 0.0);
        assert_eq!(reading.status.tier, StatusTier::NoReading);
        assert_eq!(reading.status.description, PROFILE_PROMPT);
        assert!((reading.intake.total_pure_cc - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_window_is_independent_of_decay() {
        let mut store = MemoryStore::new();
        let user = UserId::new("sam").unwrap();
        store
            .upsert_profile(&user, Profile::new(Gender::Female, 55.0).unwrap())
            .unwrap();

        let now = Utc::now();
        let past_day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let past_window = TimeWindow::day_of(past_day, &Utc).unwrap();
        store
            .create_event(&user, spirits(past_window.start + Duration::hours(20)))
            .unwrap();
        store.create_event(&user, spirits(now)).unwrap();
        store
            .create_event(&user, spirits(now - Duration::minutes(30)))
            .unwrap();

        let reading =
            take_reading(&store, &user, now, &past_window, &ReadingOptions::default()).unwrap();

        // Only today's drinks feed the live BAC
        assert!(reading.bac.value > 0.05);
        assert_eq!(reading.status.tier, StatusTier::LegalLimitWarning);
        // Only the old drink is in the displayed total
        assert_eq!(reading.drinks.len(), 1);
        assert!((reading.intake.total_pure_cc - 12.0).abs() < 1e-9);
        assert!(!reading.intake.over_limit);
    }

    #[test]
    fn test_invalid_logged_drink_does_not_block_reading() {
        use crate::store::FileStore;
        use std::io::Write;

        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());
        let user = UserId::new("sam").unwrap();
        let now = Utc::now();
        store
            .upsert_profile(&user, Profile::new(Gender::Male, 70.0).unwrap())
            .unwrap();
        store.create_event(&user, spirits(now)).unwrap();
        {
            let mut row = serde_json::to_value(
                crate::DrinkEvent::create(spirits(now)).unwrap(),
            )
            .unwrap();
            row["volume_cc"] = serde_json::json!(-5.0);
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(store.drinks_path(&user))
                .unwrap();
            writeln!(file, "{}", row).unwrap();
        }

        let options = ReadingOptions {
            lookback_hours: u32::MAX,
            ..ReadingOptions::default()
        };
        let reading = take_reading(&store, &user, now, &TimeWindow::all(), &options).unwrap();

        assert_eq!(reading.drinks.len(), 1);
        assert!(reading.bac.value > 0.0);
        assert!((reading.intake.total_pure_cc - 12.0).abs() < 1e-9);
    }
}
