//! On-disk snapshot of the decoded market set (`markets.json`).

use super::Market;
use crate::error::RegistryError;
use alloy::primitives::Address;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serializer;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

/// Archives older than this should be rebuilt.
pub const STALE_AFTER_DAYS: i64 = 14;

/// Result of reading an archive. Staleness is advisory only.
#[derive(Debug, Clone)]
pub struct ArchiveSnapshot {
    pub markets: BTreeMap<Address, Market>,
    pub created_at: DateTime<Utc>,
    pub age: TimeDelta,
}

impl ArchiveSnapshot {
    pub fn is_stale(&self) -> bool {
        is_stale(self.age)
    }
}

pub fn is_stale(age: TimeDelta) -> bool {
    age > TimeDelta::days(STALE_AFTER_DAYS)
}

/// Read the archive at `path`, measuring its age against `now`.
///
/// A missing file is `RegistryError::NotFound`; there is no fallback to the
/// network here. Contents are returned as written, without re-validation.
pub fn read_archive(path: &Path, now: DateTime<Utc>) -> Result<ArchiveSnapshot, RegistryError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(RegistryError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    let markets: BTreeMap<Address, Market> = serde_json::from_str(&contents)?;

    let meta = std::fs::metadata(path)?;
    // Not every filesystem records birth time.
    let created = meta.created().or_else(|_| meta.modified())?;
    let created_at = DateTime::<Utc>::from(created);

    let snapshot = ArchiveSnapshot {
        markets,
        created_at,
        age: now - created_at,
    };

    if snapshot.is_stale() {
        warn!(
            path = %path.display(),
            age_days = snapshot.age.num_days(),
            "market archive is more than {STALE_AFTER_DAYS} days old, rebuild it to pick up new markets"
        );
    }
    debug!(path = %path.display(), markets = snapshot.markets.len(), "market archive read");

    Ok(snapshot)
}

/// Write the archive, creating the parent directory and replacing any
/// previous file. Output is pretty JSON with 4-space indentation.
///
/// The file is written beside the target and renamed over it, so the
/// archive's creation time is the time of this refresh.
pub fn write_archive(path: &Path, markets: &BTreeMap<Address, Market>) -> Result<(), RegistryError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    // Keys keep address order but are written checksummed.
    (&mut ser).collect_map(
        markets
            .iter()
            .map(|(addr, market)| (addr.to_checksum(None), market)),
    )?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, buf)?;
    std::fs::rename(&tmp, path)?;
    info!(path = %path.display(), markets = markets.len(), "market archive written");
    Ok(())
}
