//! Static rule tables: protocol actions and emergence unlocks per category.
//!
//! The built-in catalog is compiled in. Custom catalogs can be loaded from
//! JSON and are validated so that a single protocol never grants more than one
//! level, even with the duress multiplier applied.
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::constants::{
    DURESS_MULTIPLIER, FALLBACK_PERK_DESCRIPTION, FALLBACK_PERK_TITLE, STRAIN_HIGH_THRESHOLD,
    XP_PER_LEVEL,
};
use crate::error::{CatalogError, UnknownCategory};
use crate::stats::CategoryId;

/// A discrete user activity with a fixed reward and load effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolAction {
    pub name: String,
    pub xp_gain: u32,
    #[serde(default)]
    pub load_delta: i32,
}

/// How a protocol moves the load meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadImpact {
    StrainHigh,
    StrainLow,
    Neutral,
    Recovery,
}

impl ProtocolAction {
    #[must_use]
    pub fn new(name: impl Into<String>, xp_gain: u32, load_delta: i32) -> Self {
        Self {
            name: name.into(),
            xp_gain,
            load_delta,
        }
    }

    #[must_use]
    pub const fn load_impact(&self) -> LoadImpact {
        if self.load_delta >= STRAIN_HIGH_THRESHOLD {
            LoadImpact::StrainHigh
        } else if self.load_delta > 0 {
            LoadImpact::StrainLow
        } else if self.load_delta < 0 {
            LoadImpact::Recovery
        } else {
            LoadImpact::Neutral
        }
    }

    #[must_use]
    pub const fn is_strain(&self) -> bool {
        matches!(
            self.load_impact(),
            LoadImpact::StrainHigh | LoadImpact::StrainLow
        )
    }
}

/// Narrative unlock shown when a category reaches a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergenceEntry {
    pub category: CategoryId,
    pub level: u32,
    pub title: String,
    pub description: String,
}

/// Reward attached to a level-up: a catalog entry or the generic fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Perk {
    Emergence(EmergenceEntry),
    Fallback,
}

impl Perk {
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Emergence(entry) => &entry.title,
            Self::Fallback => FALLBACK_PERK_TITLE,
        }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Emergence(entry) => &entry.description,
            Self::Fallback => FALLBACK_PERK_DESCRIPTION,
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }
}

/// JSON shape of a custom catalog.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    protocols: BTreeMap<String, Vec<ProtocolAction>>,
    #[serde(default)]
    emergence: Vec<EmergenceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    protocols: BTreeMap<CategoryId, Vec<ProtocolAction>>,
    emergence: BTreeMap<(CategoryId, u32), EmergenceEntry>,
}

static BUILTIN: Lazy<Arc<Catalog>> = Lazy::new(|| Arc::new(builtin_catalog()));

impl Catalog {
    /// The compiled-in rule tables.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Shared handle to the built-in catalog.
    #[must_use]
    pub fn shared_builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Build and validate a catalog from explicit tables.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the tables break a catalog invariant.
    pub fn new(
        protocols: BTreeMap<CategoryId, Vec<ProtocolAction>>,
        emergence: Vec<EmergenceEntry>,
    ) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for entry in &emergence {
            if entry.level < 2 {
                return Err(CatalogError::EmergenceLevelTooLow {
                    category: entry.category,
                    level: entry.level,
                });
            }
            if !seen.insert((entry.category, entry.level)) {
                return Err(CatalogError::DuplicateEmergence {
                    category: entry.category,
                    level: entry.level,
                });
            }
        }
        let catalog = Self {
            protocols,
            emergence: emergence
                .into_iter()
                .map(|entry| ((entry.category, entry.level), entry))
                .collect(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, names an unknown category,
    /// or the resulting tables fail validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut protocols = BTreeMap::new();
        for (key, actions) in file.protocols {
            let category: CategoryId = key.parse()?;
            protocols.insert(category, actions);
        }
        Self::new(protocols, file.emergence)
    }

    /// Check the protocol tables.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant: a category without protocols, a
    /// protocol without xp, or one whose duress-scaled gain exceeds a level.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for category in CategoryId::ALL {
            let actions = self.protocols_for(category);
            if actions.is_empty() {
                return Err(CatalogError::EmptyProtocols(category));
            }
            for action in actions {
                if action.xp_gain == 0 {
                    return Err(CatalogError::ZeroXp {
                        category,
                        name: action.name.clone(),
                    });
                }
                if action.xp_gain.saturating_mul(DURESS_MULTIPLIER) > XP_PER_LEVEL {
                    return Err(CatalogError::XpTooLarge {
                        category,
                        name: action.name.clone(),
                        xp_gain: action.xp_gain,
                    });
                }
            }
        }
        Ok(())
    }

    /// Ordered protocols for a category; never empty for a validated catalog.
    #[must_use]
    pub fn protocols_for(&self, category: CategoryId) -> &[ProtocolAction] {
        self.protocols
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// String-keyed lookup for callers holding a raw category name.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCategory`] if `key` is not one of the six categories.
    pub fn protocols_for_key(&self, key: &str) -> Result<&[ProtocolAction], UnknownCategory> {
        let category: CategoryId = key.parse()?;
        Ok(self.protocols_for(category))
    }

    #[must_use]
    pub fn find_protocol(&self, category: CategoryId, name: &str) -> Option<&ProtocolAction> {
        self.protocols_for(category)
            .iter()
            .find(|action| action.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn emergence_for(&self, category: CategoryId, level: u32) -> Option<&EmergenceEntry> {
        self.emergence.get(&(category, level))
    }

    /// Emergence entry for the level, or the fallback perk when none is defined.
    #[must_use]
    pub fn perk_for(&self, category: CategoryId, level: u32) -> Perk {
        self.emergence_for(category, level)
            .cloned()
            .map_or(Perk::Fallback, Perk::Emergence)
    }

    pub fn emergence_entries(&self) -> impl Iterator<Item = &EmergenceEntry> {
        self.emergence.values()
    }
}

fn builtin_catalog() -> Catalog {
    let protocols = BTreeMap::from([
        (
            CategoryId::Structure,
            vec![
                ProtocolAction::new("Gym / Strength", 25, -5),
                ProtocolAction::new("Walk", 15, -10),
                ProtocolAction::new("Ergonomics Check", 10, 0),
            ],
        ),
        (
            CategoryId::Yield,
            vec![
                ProtocolAction::new("Deep Work (Writing)", 25, 10),
                ProtocolAction::new("Admin / E-mail", 10, 5),
                ProtocolAction::new("Visualise Problem", 15, 5),
            ],
        ),
        (
            CategoryId::Sense,
            vec![
                ProtocolAction::new("Read Non-fiction", 15, -2),
                ProtocolAction::new("Reflection / Journal", 20, -15),
                ProtocolAction::new("Systems Analysis", 15, 5),
            ],
        ),
        (
            CategoryId::Tuning,
            vec![
                ProtocolAction::new("Plan the Day", 15, -5),
                ProtocolAction::new("Clear the Noise", 10, -2),
                ProtocolAction::new("Save to Buffer", 15, 0),
            ],
        ),
        (
            CategoryId::Energy,
            vec![
                ProtocolAction::new("Garden (Biomass)", 30, -20),
                ProtocolAction::new("Eat Protein", 15, -5),
                ProtocolAction::new("Rest / Hydrate", 10, 0),
            ],
        ),
        (
            CategoryId::Morale,
            vec![
                ProtocolAction::new("Social Interaction", 15, 5),
                ProtocolAction::new("Tend a Relationship", 20, -5),
                ProtocolAction::new("Dress Sharp", 15, 0),
            ],
        ),
    ]);

    let unlock = |category, level, title: &str, description: &str| {
        (
            (category, level),
            EmergenceEntry {
                category,
                level,
                title: title.to_string(),
                description: description.to_string(),
            },
        )
    };
    use CategoryId::{Energy, Morale, Sense, Structure, Tuning, Yield};
    let emergence = BTreeMap::from([
        unlock(
            Structure,
            2,
            "MYOFIBRIL ADAPTATION",
            "Muscle memory established. Starting resistance to training has dropped.",
        ),
        unlock(
            Structure,
            3,
            "SKELETAL INTEGRITY",
            "Posture improved. Ergonomic load causes less wear.",
        ),
        unlock(
            Structure,
            4,
            "IRON TEMPLE",
            "The body asks for activity instead of avoiding it.",
        ),
        unlock(
            Yield,
            2,
            "THE HEMINGWAY BRIDGE",
            "The ability to stop when you know what comes next.",
        ),
        unlock(
            Yield,
            3,
            "FLOW STATE ACCESS",
            "Time needed to reach deep focus has been halved.",
        ),
        unlock(
            Yield,
            4,
            "CONCEPTUAL DENSITY",
            "You say more with fewer words. The density of your text has increased.",
        ),
        unlock(
            Sense,
            2,
            "PATTERN RECOGNITION",
            "You see system faults before they happen.",
        ),
        unlock(
            Sense,
            3,
            "CYBERNETIC LOOP",
            "Feedback from the outside world is now integrated automatically.",
        ),
        unlock(
            Sense,
            4,
            "META-COGNITION",
            "You think about how you think while you think.",
        ),
        unlock(
            Tuning,
            2,
            "NOISE FILTER",
            "Irrelevant signals are filtered out automatically.",
        ),
        unlock(
            Tuning,
            3,
            "AGILE ADAPTATION",
            "The schedule is no longer a law, but a hypothesis.",
        ),
        unlock(
            Energy,
            2,
            "PHOTOSYNTHESIS",
            "Time spent in zone 3 recharges the batteries 20% faster.",
        ),
        unlock(
            Energy,
            3,
            "GASTRIC RHYTHM",
            "You sense the body's signals before energy dips.",
        ),
        unlock(
            Energy,
            4,
            "BIOMASS RECYCLING",
            "Everything is nourishment. Even setbacks are composted into growth.",
        ),
        unlock(
            Morale,
            2,
            "SIGNAL CLARITY",
            "Your communication gets through without noise.",
        ),
        unlock(
            Morale,
            3,
            "SOCIAL BATTERY EXTENDED",
            "Interaction drains less energy.",
        ),
    ]);

    Catalog {
        protocols,
        emergence,
    }
}
