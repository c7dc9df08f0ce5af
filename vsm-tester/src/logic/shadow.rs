//! Independent reference model the store is checked against after every gesture.
use anyhow::{Result, bail, ensure};
use std::collections::BTreeMap;
use vsm_core::constants::{
    ACCEPT_DELTA, ADVANCE_CYCLE_DELTA, LOAD_MAX, LOAD_MIN, LOG_CAPACITY, RESIST_DELTA,
};
use vsm_core::{
    Catalog, CategoryId, DuressMode, KeyValueStore, ProgressionStore, ProtocolOutcome, StatRecord,
};

use super::gestures::Gesture;

#[derive(Debug, Clone)]
pub struct ShadowModel {
    stats: BTreeMap<CategoryId, StatRecord>,
    load: i32,
    duress: DuressMode,
    pending: Option<(CategoryId, u32)>,
    log_len: usize,
}

impl ShadowModel {
    pub fn mirror<S: KeyValueStore>(store: &ProgressionStore<S>) -> Self {
        Self {
            stats: store.stats().iter().collect(),
            load: store.load().value(),
            duress: store.duress(),
            pending: store
                .pending_level_up()
                .map(|event| (event.category, event.new_level)),
            log_len: store.log().len(),
        }
    }

    /// Predict the effect of `gesture`. Returns the level-up it should cause.
    pub fn apply(&mut self, gesture: Gesture, catalog: &Catalog) -> Option<(CategoryId, u32)> {
        match gesture {
            Gesture::Protocol { category, index } => {
                let action = &catalog.protocols_for(category)[index];
                let multiplier = if self.duress == DuressMode::None {
                    1
                } else {
                    2
                };
                self.load = (self.load + action.load_delta).clamp(LOAD_MIN, LOAD_MAX);
                let record = self.stats.entry(category).or_insert(StatRecord::new(1, 0));
                let mut xp = record.xp + action.xp_gain * multiplier;
                let mut level = record.level;
                let leveled_up = xp >= 100;
                if leveled_up {
                    xp -= 100;
                    level += 1;
                }
                *record = StatRecord::new(level, xp);
                self.push_log();
                if leveled_up {
                    self.pending = Some((category, level));
                    return self.pending;
                }
                None
            }
            Gesture::Duress(mode) => {
                self.duress = if self.duress == mode {
                    DuressMode::None
                } else {
                    mode
                };
                self.push_log();
                None
            }
            Gesture::Resist => self.passive(RESIST_DELTA),
            Gesture::Accept => self.passive(ACCEPT_DELTA),
            Gesture::AdvanceCycle => self.passive(ADVANCE_CYCLE_DELTA),
            Gesture::Acknowledge => {
                self.pending = None;
                None
            }
        }
    }

    fn passive(&mut self, delta: i32) -> Option<(CategoryId, u32)> {
        self.load = (self.load + delta).clamp(LOAD_MIN, LOAD_MAX);
        self.push_log();
        None
    }

    fn push_log(&mut self) {
        self.log_len = (self.log_len + 1).min(LOG_CAPACITY);
    }

    /// Compare the store against the model.
    pub fn check<S: KeyValueStore>(&self, store: &ProgressionStore<S>) -> Result<()> {
        for (category, expected) in &self.stats {
            let actual = store.stat(*category);
            ensure!(
                actual == *expected,
                "{category}: expected {expected:?}, store has {actual:?}"
            );
            ensure!(actual.xp < 100, "{category}: xp {} out of range", actual.xp);
        }
        ensure!(
            store.load().value() == self.load,
            "load: expected {}, store has {}",
            self.load,
            store.load().value()
        );
        ensure!(
            store.duress() == self.duress,
            "duress: expected {}, store has {}",
            self.duress,
            store.duress()
        );
        ensure!(
            store.log().len() == self.log_len,
            "log: expected {} entries, store has {}",
            self.log_len,
            store.log().len()
        );
        let pending = store
            .pending_level_up()
            .map(|event| (event.category, event.new_level));
        if pending != self.pending {
            bail!(
                "pending level-up: expected {:?}, store has {pending:?}",
                self.pending
            );
        }
        Ok(())
    }
}

/// Check that an outcome agrees with the level-up the model predicted.
pub fn check_outcome(
    outcome: &ProtocolOutcome,
    predicted: Option<(CategoryId, u32)>,
) -> Result<()> {
    let actual = outcome
        .level_up()
        .map(|event| (event.category, event.new_level));
    ensure!(
        actual == predicted,
        "level-up mismatch: predicted {predicted:?}, store emitted {actual:?}"
    );
    Ok(())
}
