//! The progression state machine.
//!
//! A [`ProgressionStore`] owns the stat sheet, the load meter, the duress mode,
//! the log ring and at most one pending [`LevelUpEvent`]. It is either `Idle`
//! or `Announcing` a level-up that the caller has not acknowledged yet. Every
//! mutation of a durable field is written through before the call returns.
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::KeyValueStore;
use crate::catalog::{Catalog, Perk, ProtocolAction};
use crate::constants::{
    ACCEPT_DELTA, ADVANCE_CYCLE_DELTA, LOG_ACCEPT, LOG_ADVANCE_CYCLE, LOG_RESIST, RESIST_DELTA,
    XP_PER_LEVEL,
};
use crate::duress::DuressMode;
use crate::error::{EngineError, PersistError};
use crate::load::SystemLoad;
use crate::log_ring::LogRing;
use crate::persistence::{PersistenceAdapter, SnapshotOrigin};
use crate::stats::{CategoryId, StatRecord, StatSheet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    Idle,
    Announcing,
}

/// Produced when a category crosses the xp threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpEvent {
    pub category: CategoryId,
    pub new_level: u32,
    pub perk: Perk,
}

/// Result of a single protocol execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolOutcome {
    NoLevelUp {
        category: CategoryId,
        applied_xp: u32,
        record: StatRecord,
    },
    LeveledUp(LevelUpEvent),
}

impl ProtocolOutcome {
    #[must_use]
    pub const fn level_up(&self) -> Option<&LevelUpEvent> {
        match self {
            Self::LeveledUp(event) => Some(event),
            Self::NoLevelUp { .. } => None,
        }
    }
}

pub struct ProgressionStore<S: KeyValueStore> {
    catalog: Arc<Catalog>,
    persistence: PersistenceAdapter<S>,
    stats: StatSheet,
    load: SystemLoad,
    duress: DuressMode,
    log: LogRing,
    pending: Option<LevelUpEvent>,
    origin: SnapshotOrigin,
}

impl<S: KeyValueStore> ProgressionStore<S> {
    /// Load the durable fields from `storage` and start with the built-in catalog.
    ///
    /// Unreadable persisted state is replaced by the default snapshot.
    pub fn initialize(storage: S) -> Self {
        Self::initialize_with_catalog(storage, Catalog::shared_builtin())
    }

    pub fn initialize_with_catalog(storage: S, catalog: Arc<Catalog>) -> Self {
        let persistence = PersistenceAdapter::new(storage);
        let snapshot = persistence.load();
        log::info!(
            "progression store initialized from {:?} snapshot (load {})",
            snapshot.origin,
            snapshot.load
        );
        Self {
            catalog,
            persistence,
            stats: snapshot.stats,
            load: snapshot.load,
            duress: DuressMode::None,
            log: LogRing::boot(),
            pending: None,
            origin: snapshot.origin,
        }
    }

    /// Flush the durable fields one last time and hand the backend back.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if the final write fails.
    pub fn dispose(self) -> Result<S, PersistError> {
        self.persist()?;
        Ok(self.persistence.into_inner())
    }

    /// Apply one protocol to `category`.
    ///
    /// Callers must not execute protocols while a level-up is pending; doing so
    /// is logged and a new level-up replaces the pending one.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::XpOverflow`] without touching any state if the
    /// applied gain would exceed a whole level, and [`EngineError::Persist`] if
    /// the write-through fails after the in-memory transition.
    pub fn execute_protocol(
        &mut self,
        category: CategoryId,
        action: &ProtocolAction,
    ) -> Result<ProtocolOutcome, EngineError> {
        if self.pending.is_some() {
            log::warn!(
                "protocol {:?} executed while a level-up is still pending",
                action.name
            );
        }

        let applied_xp = action.xp_gain.saturating_mul(self.duress.xp_multiplier());
        if applied_xp > XP_PER_LEVEL {
            return Err(EngineError::XpOverflow {
                category,
                name: action.name.clone(),
                applied_xp,
            });
        }

        self.load = self.load.adjusted(action.load_delta);
        let advance = self.stats.get(category).advance(applied_xp);
        self.stats.set(category, advance.record);
        log::debug!(
            "{category} +{applied_xp} xp via {:?} -> {:?}, load {}",
            action.name,
            advance.record,
            self.load
        );

        let outcome = if advance.leveled_up {
            let new_level = advance.record.level;
            let event = LevelUpEvent {
                category,
                new_level,
                perk: self.catalog.perk_for(category, new_level),
            };
            log::info!(
                "{category} reached level {new_level}: {}",
                event.perk.title()
            );
            self.log.push(format!(
                ">>> EMERGENCE: {} IS NOW LEVEL {new_level} <<<",
                category.as_str().to_uppercase()
            ));
            self.pending = Some(event.clone());
            ProtocolOutcome::LeveledUp(event)
        } else {
            self.log.push(protocol_line(action, applied_xp, self.duress));
            ProtocolOutcome::NoLevelUp {
                category,
                applied_xp,
                record: advance.record,
            }
        };

        self.persist()?;
        Ok(outcome)
    }

    /// Look up a protocol by raw category key and name, then execute it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownCategory`] or [`EngineError::UnknownProtocol`]
    /// for names outside the catalog, plus everything [`Self::execute_protocol`] returns.
    pub fn execute_named(
        &mut self,
        category_key: &str,
        protocol: &str,
    ) -> Result<ProtocolOutcome, EngineError> {
        let category: CategoryId = category_key.parse()?;
        let catalog = Arc::clone(&self.catalog);
        let action = catalog.find_protocol(category, protocol).ok_or_else(|| {
            EngineError::UnknownProtocol {
                category,
                name: protocol.to_string(),
            }
        })?;
        self.execute_protocol(category, action)
    }

    /// Consume the pending level-up, returning to `Idle`. No-op when idle.
    pub fn acknowledge_level_up(&mut self) -> Option<LevelUpEvent> {
        self.pending.take()
    }

    /// Toggle a duress mode; selecting the active mode again clears it.
    pub fn set_duress_mode(&mut self, mode: DuressMode) -> DuressMode {
        let next = self.duress.toggled(mode);
        let line = if next.is_active() {
            format!("> DURESS MODE: {} ENGAGED.", next.as_str().to_uppercase())
        } else {
            "> DURESS MODE DISENGAGED.".to_string()
        };
        log::debug!("duress mode {} -> {next}", self.duress);
        self.duress = next;
        self.log.push(line);
        next
    }

    /// Load-only adjustment shared by the passive coping gestures.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if the write-through fails.
    pub fn apply_passive_adjustment(
        &mut self,
        delta: i32,
        log_text: impl Into<String>,
    ) -> Result<SystemLoad, PersistError> {
        self.load = self.load.adjusted(delta);
        self.log.push(log_text);
        log::debug!("passive adjustment {delta:+}, load now {}", self.load);
        self.persist()?;
        Ok(self.load)
    }

    /// Resist the signal.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if the write-through fails.
    pub fn resist(&mut self) -> Result<SystemLoad, PersistError> {
        self.apply_passive_adjustment(RESIST_DELTA, LOG_RESIST)
    }

    /// Accept the signal.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if the write-through fails.
    pub fn accept(&mut self) -> Result<SystemLoad, PersistError> {
        self.apply_passive_adjustment(ACCEPT_DELTA, LOG_ACCEPT)
    }

    /// Close the current cycle, adding entropy to the load meter.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if the write-through fails.
    pub fn advance_cycle(&mut self) -> Result<SystemLoad, PersistError> {
        self.apply_passive_adjustment(ADVANCE_CYCLE_DELTA, LOG_ADVANCE_CYCLE)
    }

    fn persist(&self) -> Result<(), PersistError> {
        self.persistence.save(&self.stats, self.load)
    }

    #[must_use]
    pub const fn stats(&self) -> &StatSheet {
        &self.stats
    }

    #[must_use]
    pub fn stat(&self, category: CategoryId) -> StatRecord {
        self.stats.get(category)
    }

    #[must_use]
    pub const fn load(&self) -> SystemLoad {
        self.load
    }

    #[must_use]
    pub const fn duress(&self) -> DuressMode {
        self.duress
    }

    #[must_use]
    pub const fn log(&self) -> &LogRing {
        &self.log
    }

    #[must_use]
    pub const fn pending_level_up(&self) -> Option<&LevelUpEvent> {
        self.pending.as_ref()
    }

    #[must_use]
    pub const fn phase(&self) -> StorePhase {
        if self.pending.is_some() {
            StorePhase::Announcing
        } else {
            StorePhase::Idle
        }
    }

    #[must_use]
    pub const fn origin(&self) -> SnapshotOrigin {
        self.origin
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub const fn storage(&self) -> &S {
        self.persistence.storage()
    }
}

fn protocol_line(action: &ProtocolAction, applied_xp: u32, duress: DuressMode) -> String {
    let kind = if action.is_strain() {
        "STRAIN"
    } else {
        "RECOVERY"
    };
    let mut line = format!(
        "> {} DONE. +{applied_xp} XP ({kind})",
        action.name.to_uppercase()
    );
    if let Some(tag) = duress.log_tag() {
        line.push(' ');
        line.push_str(tag);
    }
    line
}
