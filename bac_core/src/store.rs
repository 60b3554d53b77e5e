//! Storage contract for drinks and profiles.
//!
//! The estimator only needs snapshots; whoever owns the data implements
//! [`DrinkStore`]. Two implementations ship:
//! - [`FileStore`]: one directory per user under a data dir, holding
//!   `drinks.jsonl` and `profile.json`
//! - [`MemoryStore`]: in-process maps, for tests and embedding

use crate::drink_log::{DrinkLog, DrinkSink};
use crate::{DrinkEvent, DrinkId, Error, NewDrink, Profile, Result, TimeWindow, UserId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Persistence operations the estimator's consumers rely on
pub trait DrinkStore {
    /// Drinks whose timestamp falls in `window`, newest first
    fn list_events(&self, user: &UserId, window: &TimeWindow) -> Result<Vec<DrinkEvent>>;

    /// Validate and persist a drink, returning its new id
    fn create_event(&mut self, user: &UserId, drink: NewDrink) -> Result<DrinkId>;

    /// Fails with [`Error::NotFound`] if the drink does not exist
    fn delete_event(&mut self, user: &UserId, id: DrinkId) -> Result<()>;

    /// `None` when the user has not set up a profile
    fn get_profile(&self, user: &UserId) -> Result<Option<Profile>>;

    fn upsert_profile(&mut self, user: &UserId, profile: Profile) -> Result<()>;
}

fn select(mut events: Vec<DrinkEvent>, window: &TimeWindow) -> Vec<DrinkEvent> {
    events.retain(|e| window.contains(e.timestamp));
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events
}

// ============================================================================
// File Store
// ============================================================================

/// File-backed store rooted at a data directory
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn user_dir(&self, user: &UserId) -> PathBuf {
        self.root.join("users").join(user.as_str())
    }

    pub fn drinks_path(&self, user: &UserId) -> PathBuf {
        self.user_dir(user).join("drinks.jsonl")
    }

    pub fn profile_path(&self, user: &UserId) -> PathBuf {
        self.user_dir(user).join("profile.json")
    }

    fn log(&self, user: &UserId) -> DrinkLog {
        DrinkLog::new(self.drinks_path(user))
    }
}

impl DrinkStore for FileStore {
    fn list_events(&self, user: &UserId, window: &TimeWindow) -> Result<Vec<DrinkEvent>> {
        let events = select(self.log(user).read_all()?, window);
        tracing::debug!("Listed {} drinks for {}", events.len(), user);
        Ok(events)
    }

    fn create_event(&mut self, user: &UserId, drink: NewDrink) -> Result<DrinkId> {
        let event = DrinkEvent::create(drink)?;
        self.log(user).append(&event)?;
        tracing::info!(
            "Logged {} ({} cc @ {}%) for {}",
            event.kind,
            event.volume_cc,
            event.abv_percent,
            user
        );
        Ok(event.id)
    }

    fn delete_event(&mut self, user: &UserId, id: DrinkId) -> Result<()> {
        self.log(user).remove(id)?;
        tracing::info!("Deleted drink {} for {}", id, user);
        Ok(())
    }

    fn get_profile(&self, user: &UserId) -> Result<Option<Profile>> {
        Profile::load(&self.profile_path(user))
    }

    fn upsert_profile(&mut self, user: &UserId, profile: Profile) -> Result<()> {
        profile.save(&self.profile_path(user))?;
        tracing::info!(
            "Saved profile for {}: {}, {} kg",
            user,
            profile.gender,
            profile.weight_kg
        );
        Ok(())
    }
}

// ============================================================================
// Memory Store
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    drinks: HashMap<UserId, Vec<DrinkEvent>>,
    profiles: HashMap<UserId, Profile>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DrinkStore for MemoryStore {
    fn list_events(&self, user: &UserId, window: &TimeWindow) -> Result<Vec<DrinkEvent>> {
        let events = self.drinks.get(user).cloned().unwrap_or_default();
        Ok(select(events, window))
    }

    fn create_event(&mut self, user: &UserId, drink: NewDrink) -> Result<DrinkId> {
        let event = DrinkEvent::create(drink)?;
        let id = event.id;
        self.drinks.entry(user.clone()).or_default().push(event);
        Ok(id)
    }

    fn delete_event(&mut self, user: &UserId, id: DrinkId) -> Result<()> {
        let drinks = self
            .drinks
            .get_mut(user)
            .ok_or_else(|| Error::NotFound(format!("drink {}", id)))?;
        let position = drinks
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| Error::NotFound(format!("drink {}", id)))?;
        drinks.remove(position);
        Ok(())
    }

    fn get_profile(&self, user: &UserId) -> Result<Option<Profile>> {
        Ok(self.profiles.get(user).copied())
    }

    fn upsert_profile(&mut self, user: &UserId, profile: Profile) -> Result<()> {
        profile.validate()?;
        self.profiles.insert(user.clone(), profile);
        Ok(())
    }
}
