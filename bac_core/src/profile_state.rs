//! Profile persistence with file locking.
//!
//! A profile is a small JSON document replaced atomically on every save.

use crate::{Error, Profile, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl Profile {
    /// Load a profile from a file with shared locking
    ///
    /// Returns `None` if the file doesn't exist. A corrupted or out-of-range
    /// profile logs a warning and also reads as `None`, so the estimator falls
    /// back to its no-profile policy.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::debug!("No profile file at {:?}", path);
            return Ok(None);
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open profile {:?}: {}. Treating as unset.", path, e);
                return Ok(None);
            }
        };

        file.lock_shared()?;
        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;

        if let Err(e) = read {
            tracing::warn!("Failed to read profile {:?}: {}. Treating as unset.", path, e);
            return Ok(None);
        }

        let profile = match serde_json::from_str::<Profile>(&contents) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Failed to parse profile {:?}: {}. Treating as unset.", path, e);
                return Ok(None);
            }
        };

        if let Err(e) = profile.validate() {
            tracing::warn!("Ignoring stored profile {:?}: {}", path, e);
            return Ok(None);
        }

        tracing::debug!("Loaded profile from {:?}", path);
        Ok(Some(profile))
    }

    /// Save a profile to a file with exclusive locking
    ///
    /// Atomically writes the profile by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "profile path missing parent")
        })?)?;

        // Serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved profile to {:?}", path);
        Ok(())
    }
}
