//! CSV export of drink lists.

use crate::{DrinkEvent, Result};
use std::path::Path;

const HEADERS: [&str; 6] = [
    "id",
    "kind",
    "timestamp",
    "volume_cc",
    "abv_percent",
    "pure_cc",
];

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    kind: String,
    timestamp: String,
    volume_cc: f64,
    abv_percent: f64,
    pure_cc: f64,
}

impl TryFrom<&DrinkEvent> for CsvRow {
    type Error = crate::Error;

    fn try_from(event: &DrinkEvent) -> Result<Self> {
        Ok(CsvRow {
            id: event.id.to_string(),
            kind: event.kind.to_string(),
            timestamp: event.timestamp.to_rfc3339(),
            volume_cc: event.volume_cc,
            abv_percent: event.abv_percent,
            pure_cc: event.pure_alcohol()?.cc,
        })
    }
}

/// Write drinks to a CSV file with headers, replacing any existing file
///
/// Returns the number of rows written.
pub fn write_csv(events: &[DrinkEvent], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    // serialize() only emits headers alongside the first record
    if events.is_empty() {
        writer.write_record(HEADERS)?;
    }
    for event in events {
        writer.serialize(CsvRow::try_from(event)?)?;
    }
    writer.flush()?;

    tracing::info!("Exported {} drinks to {:?}", events.len(), path);
    Ok(events.len())
}
