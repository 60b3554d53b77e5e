//! Append-only drink log.
//!
//! Drinks are appended to a JSONL (JSON Lines) file. A sidecar `.lock` file
//! serializes access: appends and deletions take it exclusively, reads take
//! it shared. Deletions rewrite the log atomically through a temp file.

use crate::{DrinkEvent, DrinkId, Error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Drink sink trait for persisting logged drinks
pub trait DrinkSink {
    fn append(&mut self, event: &DrinkEvent) -> Result<()>;
}

/// JSONL-backed drink log with file locking
#[derive(Clone, Debug)]
pub struct DrinkLog {
    path: PathBuf,
}

impl DrinkLog {
    /// Create a drink log for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn open_lock(&self) -> Result<File> {
        self.ensure_parent_dir()?;
        let lock = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(self.lock_path())?;
        Ok(lock)
    }

    /// Read every drink in the log
    ///
    /// Malformed lines are skipped with a warning.
    pub fn read_all(&self) -> Result<Vec<DrinkEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let lock = self.open_lock()?;
        lock.lock_shared()?;
        let events = read_events(&self.path);
        lock.unlock()?;

        let events = events?;
        tracing::debug!("Read {} drinks from {:?}", events.len(), self.path);
        Ok(events)
    }

    /// Remove the drink with `id`
    ///
    /// Returns [`Error::NotFound`] if no such drink is logged.
    pub fn remove(&self, id: DrinkId) -> Result<()> {
        let lock = self.open_lock()?;
        lock.lock_exclusive()?;
        let result = self.rewrite_without(id);
        lock.unlock()?;
        result
    }

    fn rewrite_without(&self, id: DrinkId) -> Result<()> {
        if !self.path.exists() {
            return Err(Error::NotFound(format!("drink {}", id)));
        }

        let events = read_events(&self.path)?;
        let before = events.len();
        let kept: Vec<_> = events.into_iter().filter(|e| e.id != id).collect();
        if kept.len() == before {
            return Err(Error::NotFound(format!("drink {}", id)));
        }

        let parent = self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "drink log path missing parent")
        })?;
        let temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            for event in &kept {
                serde_json::to_writer(&mut writer, event)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Removed drink {} from {:?}", id, self.path);
        Ok(())
    }
}

impl DrinkSink for DrinkLog {
    fn append(&mut self, event: &DrinkEvent) -> Result<()> {
        let lock = self.open_lock()?;
        lock.lock_exclusive()?;

        let result = (|| -> Result<()> {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            let mut writer = std::io::BufWriter::new(&file);
            let line = serde_json::to_string(event)?;
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            Ok(())
        })();

        lock.unlock()?;
        result?;

        tracing::debug!("Appended drink {} to {:?}", event.id, self.path);
        Ok(())
    }
}

fn read_events(path: &Path) -> Result<Vec<DrinkEvent>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut events = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        let event = match serde_json::from_str::<DrinkEvent>(&line) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Failed to parse drink at line {}: {}", line_num + 1, e);
                continue;
            }
        };
        // Same volume and strength rules as create_event
        if let Err(e) = event.pure_alcohol() {
            tracing::warn!("Skipping invalid drink at line {}: {}", line_num + 1, e);
            continue;
        }
        events.push(event);
    }

    Ok(events)
}
