// Snapshot store and history reader.
// Persists whole valuations under timestamp-named files and derives the
// (timestamp, grand total) series back out of them.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::valuation::Valuation;

const SNAPSHOT_PREFIX: &str = "snapshot_";
const SNAPSHOT_SUFFIX: &str = ".json";

/// Filename timestamp pattern. Fixed width, so lexicographic filename order
/// is chronological order.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Display format for history timestamps.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One history point extracted from a snapshot file.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPoint {
    pub timestamp: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub grand_total: Decimal,
}

/// The only field history needs out of a snapshot body.
#[derive(Debug, Deserialize)]
struct SnapshotTotals {
    #[serde(with = "rust_decimal::serde::float")]
    grand_total: Decimal,
}

/// Write a valuation snapshot named after the current wall-clock second.
///
/// Second resolution means two saves within the same second silently
/// overwrite each other; documented limitation, not defended against.
pub fn save(dir: &Path, valuation: &Valuation) -> Result<String> {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT);
    save_with_name(dir, valuation, &format!("{SNAPSHOT_PREFIX}{timestamp}{SNAPSHOT_SUFFIX}"))
}

fn save_with_name(dir: &Path, valuation: &Valuation, filename: &str) -> Result<String> {
    fs::create_dir_all(dir)?;

    let json = serde_json::to_string_pretty(valuation)?;
    let path = dir.join(filename);

    // Write atomically via temp file
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, &path)?;

    Ok(filename.to_string())
}

/// Read all snapshots into a chronological (timestamp, grand total) series.
///
/// The timestamp comes from the filename, not file metadata. Files that fail
/// to parse are skipped with a warning; a missing snapshot directory is an
/// empty history.
pub fn list_history(dir: &Path) -> Result<Vec<HistoryPoint>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut filenames: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(SNAPSHOT_PREFIX) && name.ends_with(SNAPSHOT_SUFFIX))
        .collect();
    filenames.sort();

    let mut history = Vec::with_capacity(filenames.len());
    for filename in filenames {
        match read_point(dir, &filename) {
            Ok(point) => history.push(point),
            Err(err) => warn!("skipping snapshot {filename}: {err}"),
        }
    }

    Ok(history)
}

fn read_point(dir: &Path, filename: &str) -> Result<HistoryPoint> {
    let raw_ts = &filename[SNAPSHOT_PREFIX.len()..filename.len() - SNAPSHOT_SUFFIX.len()];
    let timestamp = NaiveDateTime::parse_from_str(raw_ts, TIMESTAMP_FORMAT)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;

    let contents = fs::read_to_string(dir.join(filename))?;
    let totals: SnapshotTotals = serde_json::from_str(&contents)?;

    Ok(HistoryPoint {
        timestamp: timestamp.format(DISPLAY_FORMAT).to_string(),
        grand_total: totals.grand_total,
    })
}
