//! Durable-field codec on top of a [`KeyValueStore`].
//!
//! Two entries are kept: the stat sheet and the load meter. The stat entry
//! accepts the current `{level, xp}` record encoding and the legacy encoding
//! where every category maps straight to an xp integer. Legacy snapshots are
//! migrated to level 1, discarding whatever level the user had reached.
use serde_json::Value;
use std::collections::BTreeMap;

use crate::KeyValueStore;
use crate::constants::{LOAD_KEY, LOAD_MAX, LOAD_MIN, STATS_KEY, XP_PER_LEVEL};
use crate::error::{PersistError, StateUnreadable};
use crate::load::SystemLoad;
use crate::stats::{CategoryId, StatRecord, StatSheet};

/// Where the stat sheet of a loaded snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// Nothing persisted yet.
    Defaults,
    /// Persisted in the current record encoding.
    Current,
    /// Migrated from the legacy scalar encoding.
    Legacy,
    /// Persisted bytes were unreadable and the defaults were substituted.
    Recovered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub stats: StatSheet,
    pub load: SystemLoad,
    pub origin: SnapshotOrigin,
}

impl Snapshot {
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            stats: StatSheet::defaults(),
            load: SystemLoad::default(),
            origin: SnapshotOrigin::Defaults,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Current,
    Legacy,
}

/// Decode the stats entry, migrating the legacy encoding when detected.
///
/// Unknown category keys are skipped; categories missing from the entry take
/// their default record.
///
/// # Errors
///
/// Returns [`StateUnreadable`] if the bytes are not a JSON object, mix the two
/// encodings, or hold a record outside the valid range.
pub fn decode_stats(bytes: &[u8]) -> Result<(StatSheet, SnapshotOrigin), StateUnreadable> {
    let Value::Object(entries) = serde_json::from_slice::<Value>(bytes)? else {
        return Err(StateUnreadable::NotAnObject);
    };

    let mut encoding = None;
    let mut records = BTreeMap::new();
    for (key, value) in entries {
        let Ok(category) = key.parse::<CategoryId>() else {
            log::warn!("ignoring persisted stats for unknown category {key:?}");
            continue;
        };
        let (record, seen) = decode_entry(category, value)?;
        match encoding {
            Some(previous) if previous != seen => return Err(StateUnreadable::MixedEncoding),
            _ => encoding = Some(seen),
        }
        records.insert(category, record);
    }

    let origin = match encoding {
        Some(Encoding::Legacy) => {
            log::info!(
                "migrating legacy stats snapshot for {} categories; levels reset to 1",
                records.len()
            );
            SnapshotOrigin::Legacy
        }
        Some(Encoding::Current) | None => SnapshotOrigin::Current,
    };
    Ok((StatSheet::with_overrides(&records), origin))
}

fn decode_entry(
    category: CategoryId,
    value: Value,
) -> Result<(StatRecord, Encoding), StateUnreadable> {
    match value {
        Value::Number(number) => {
            let xp = number
                .as_u64()
                .and_then(|raw| u32::try_from(raw).ok())
                .filter(|xp| *xp < XP_PER_LEVEL)
                .ok_or_else(|| StateUnreadable::OutOfRange {
                    category,
                    detail: format!("legacy xp {number}"),
                })?;
            Ok((StatRecord::starting(xp), Encoding::Legacy))
        }
        value @ Value::Object(_) => {
            let record: StatRecord = serde_json::from_value(value)?;
            if !record.is_valid() {
                return Err(StateUnreadable::OutOfRange {
                    category,
                    detail: format!("level {} xp {}", record.level, record.xp),
                });
            }
            Ok((record, Encoding::Current))
        }
        _ => Err(StateUnreadable::UnsupportedValue { category }),
    }
}

/// Decode the load entry, clamping out-of-range values into the meter.
///
/// # Errors
///
/// Returns the JSON error if the bytes are not an integer.
pub fn decode_load(bytes: &[u8]) -> Result<SystemLoad, serde_json::Error> {
    let raw: i64 = serde_json::from_slice(bytes)?;
    let clamped = raw.clamp(i64::from(LOAD_MIN), i64::from(LOAD_MAX));
    Ok(i32::try_from(clamped).map_or_else(|_| SystemLoad::default(), SystemLoad::new))
}

/// Reads and writes the durable pair (stats, load) through a backend.
#[derive(Debug, Clone)]
pub struct PersistenceAdapter<S> {
    storage: S,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Raw bytes stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StateUnreadable::Backend`] if the backend read fails.
    pub fn read_raw(&self, key: &'static str) -> Result<Option<Vec<u8>>, StateUnreadable> {
        self.storage
            .read(key)
            .map_err(|err| StateUnreadable::Backend {
                key,
                source: Box::new(err),
            })
    }

    /// Stat sheet as persisted, or `None` when nothing has been saved.
    ///
    /// # Errors
    ///
    /// Returns [`StateUnreadable`] if the entry cannot be read or decoded.
    pub fn read_stats(&self) -> Result<Option<(StatSheet, SnapshotOrigin)>, StateUnreadable> {
        self.read_raw(STATS_KEY)?
            .map(|bytes| decode_stats(&bytes))
            .transpose()
    }

    /// Load meter as persisted; absent or unreadable entries yield the default.
    #[must_use]
    pub fn read_load(&self) -> SystemLoad {
        match self.read_raw(LOAD_KEY) {
            Ok(Some(bytes)) => decode_load(&bytes).unwrap_or_else(|err| {
                log::warn!("persisted load unreadable, using default: {err}");
                SystemLoad::default()
            }),
            Ok(None) => SystemLoad::default(),
            Err(err) => {
                log::warn!("{err}; using default load");
                SystemLoad::default()
            }
        }
    }

    /// Full snapshot; never fails, substituting defaults for unreadable state.
    #[must_use]
    pub fn load(&self) -> Snapshot {
        let (stats, origin) = match self.read_stats() {
            Ok(Some(found)) => found,
            Ok(None) => (StatSheet::defaults(), SnapshotOrigin::Defaults),
            Err(err) => {
                log::warn!("persisted stats unreadable, using defaults: {err}");
                (StatSheet::defaults(), SnapshotOrigin::Recovered)
            }
        };
        Snapshot {
            stats,
            load: self.read_load(),
            origin,
        }
    }

    /// Write both durable entries, load first.
    ///
    /// There is no transaction across the two keys. If the stats write fails
    /// the backend keeps the previous sheet next to the new load, and the
    /// next successful save brings the pair back in step.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if encoding fails or the backend rejects a write.
    pub fn save(&self, stats: &StatSheet, load: SystemLoad) -> Result<(), PersistError> {
        let stats_bytes = serde_json::to_vec(stats).map_err(|source| PersistError::Encode {
            key: STATS_KEY,
            source,
        })?;
        let load_bytes =
            serde_json::to_vec(&load.value()).map_err(|source| PersistError::Encode {
                key: LOAD_KEY,
                source,
            })?;
        self.write(LOAD_KEY, &load_bytes)?;
        self.write(STATS_KEY, &stats_bytes)
    }

    fn write(&self, key: &'static str, bytes: &[u8]) -> Result<(), PersistError> {
        self.storage
            .write(key, bytes)
            .map_err(|err| PersistError::Backend {
                key,
                source: Box::new(err),
            })
    }
}
