//! Stat categories and per-category progression records.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{STARTING_LEVEL, XP_PER_LEVEL};
use crate::error::UnknownCategory;

/// The six tracked life domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoryId {
    Structure,
    Yield,
    Sense,
    Tuning,
    Energy,
    Morale,
}

impl CategoryId {
    pub const ALL: [Self; 6] = [
        Self::Structure,
        Self::Yield,
        Self::Sense,
        Self::Tuning,
        Self::Energy,
        Self::Morale,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structure => "Structure",
            Self::Yield => "Yield",
            Self::Sense => "Sense",
            Self::Tuning => "Tuning",
            Self::Energy => "Energy",
            Self::Morale => "Morale",
        }
    }

    /// Three letter label shown next to the meter.
    #[must_use]
    pub const fn short_label(self) -> &'static str {
        match self {
            Self::Structure => "STR",
            Self::Yield => "YIE",
            Self::Sense => "SEN",
            Self::Tuning => "TUN",
            Self::Energy => "ENE",
            Self::Morale => "MOR",
        }
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryId {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Level and partial progress towards the next level for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRecord {
    pub level: u32,
    pub xp: u32,
}

impl StatRecord {
    #[must_use]
    pub const fn new(level: u32, xp: u32) -> Self {
        Self { level, xp }
    }

    /// A fresh record at the starting level.
    #[must_use]
    pub const fn starting(xp: u32) -> Self {
        Self::new(STARTING_LEVEL, xp)
    }

    /// Level in `STARTING_LEVEL..u32::MAX` so a level-up can always be applied.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.level >= STARTING_LEVEL && self.level < u32::MAX && self.xp < XP_PER_LEVEL
    }
}

/// Gain applied to a record, with the overflow rolled into the level.
///
/// Callers guarantee `gain <= XP_PER_LEVEL`, so at most one level is gained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Advance {
    pub record: StatRecord,
    pub leveled_up: bool,
}

impl StatRecord {
    pub(crate) const fn advance(self, gain: u32) -> Advance {
        let total = self.xp + gain;
        if total >= XP_PER_LEVEL {
            Advance {
                record: Self::new(self.level + 1, total - XP_PER_LEVEL),
                leveled_up: true,
            }
        } else {
            Advance {
                record: Self::new(self.level, total),
                leveled_up: false,
            }
        }
    }
}

/// Total mapping from every category to its record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatSheet {
    records: BTreeMap<CategoryId, StatRecord>,
}

impl StatSheet {
    /// The snapshot used when nothing has been persisted yet.
    #[must_use]
    pub fn defaults() -> Self {
        Self::from_fn(|category| match category {
            CategoryId::Structure => StatRecord::starting(10),
            CategoryId::Yield => StatRecord::starting(5),
            CategoryId::Sense => StatRecord::starting(8),
            CategoryId::Tuning => StatRecord::starting(3),
            CategoryId::Energy => StatRecord::starting(12),
            CategoryId::Morale => StatRecord::starting(4),
        })
    }

    pub fn from_fn(mut f: impl FnMut(CategoryId) -> StatRecord) -> Self {
        Self {
            records: CategoryId::ALL
                .into_iter()
                .map(|category| (category, f(category)))
                .collect(),
        }
    }

    /// Build a sheet from a partial map, filling gaps from [`StatSheet::defaults`].
    #[must_use]
    pub fn with_overrides(overrides: &BTreeMap<CategoryId, StatRecord>) -> Self {
        let defaults = Self::defaults();
        Self::from_fn(|category| {
            overrides
                .get(&category)
                .copied()
                .unwrap_or_else(|| defaults.get(category))
        })
    }

    #[must_use]
    pub fn get(&self, category: CategoryId) -> StatRecord {
        self.records
            .get(&category)
            .copied()
            .unwrap_or(StatRecord::starting(0))
    }

    pub(crate) fn set(&mut self, category: CategoryId, record: StatRecord) {
        self.records.insert(category, record);
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, StatRecord)> + '_ {
        self.records.iter().map(|(category, record)| (*category, *record))
    }

    /// Sum of all levels, a rough overall progression indicator.
    #[must_use]
    pub fn total_level(&self) -> u32 {
        self.records.values().map(|record| record.level).sum()
    }
}

impl Default for StatSheet {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("structure".parse::<CategoryId>(), Ok(CategoryId::Structure));
        assert_eq!("MORALE".parse::<CategoryId>(), Ok(CategoryId::Morale));
        assert_eq!(
            "Spirit".parse::<CategoryId>(),
            Err(UnknownCategory("Spirit".to_string()))
        );
    }

    #[test]
    fn advance_rolls_overflow_into_next_level() {
        let advanced = StatRecord::new(1, 85).advance(25);
        assert!(advanced.leveled_up);
        assert_eq!(advanced.record, StatRecord::new(2, 10));

        let exact = StatRecord::new(3, 50).advance(50);
        assert!(exact.leveled_up);
        assert_eq!(exact.record, StatRecord::new(4, 0));
    }

    #[test]
    fn advance_below_threshold_keeps_level() {
        let advanced = StatRecord::new(2, 10).advance(30);
        assert!(!advanced.leveled_up);
        assert_eq!(advanced.record, StatRecord::new(2, 40));
    }

    #[test]
    fn record_validity_bounds_level_and_xp() {
        assert!(StatRecord::new(1, 99).is_valid());
        assert!(StatRecord::new(u32::MAX - 1, 0).is_valid());
        assert!(!StatRecord::new(0, 10).is_valid());
        assert!(!StatRecord::new(2, 100).is_valid());
        assert!(!StatRecord::new(u32::MAX, 95).is_valid());
    }

    #[test]
    fn defaults_cover_every_category() {
        let sheet = StatSheet::defaults();
        assert_eq!(sheet.iter().count(), CategoryId::ALL.len());
        assert_eq!(sheet.get(CategoryId::Energy), StatRecord::new(1, 12));
        assert_eq!(sheet.total_level(), 6);
    }

    #[test]
    fn sheet_serializes_as_category_object() {
        let json = serde_json::to_value(StatSheet::defaults()).unwrap();
        assert_eq!(json["Structure"]["level"], 1);
        assert_eq!(json["Structure"]["xp"], 10);
        assert_eq!(json["Morale"]["xp"], 4);
    }

    #[test]
    fn overrides_fill_missing_categories_from_defaults() {
        let overrides = BTreeMap::from([(CategoryId::Yield, StatRecord::new(4, 7))]);
        let sheet = StatSheet::with_overrides(&overrides);
        assert_eq!(sheet.get(CategoryId::Yield), StatRecord::new(4, 7));
        assert_eq!(sheet.get(CategoryId::Tuning), StatRecord::new(1, 3));
    }
}
