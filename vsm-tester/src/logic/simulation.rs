use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::path::PathBuf;
use std::sync::Arc;
use vsm_core::{Catalog, ProgressionStore, ProtocolOutcome};

use super::backend::TesterBackend;
use super::gestures::Gesture;
use super::shadow::{ShadowModel, check_outcome};

/// Shared knobs for every scenario run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub catalog: Arc<Catalog>,
    pub steps: usize,
    pub state_dir: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(catalog: Arc<Catalog>, steps: usize) -> Self {
        Self {
            catalog,
            steps,
            state_dir: None,
        }
    }

    #[must_use]
    pub fn with_state_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.state_dir = dir;
        self
    }
}

/// A single iteration: a seeded rng, a store and the model shadowing it.
pub struct ScenarioRun {
    pub config: RunConfig,
    pub rng: ChaCha20Rng,
    pub backend: TesterBackend,
    pub store: ProgressionStore<TesterBackend>,
    shadow: ShadowModel,
    pub history: Vec<Gesture>,
}

impl ScenarioRun {
    pub fn start(config: &RunConfig, scenario: &str, seed: u64) -> Result<Self> {
        let backend = match &config.state_dir {
            Some(dir) => TesterBackend::file(dir.join(format!("{scenario}-{seed}")))?,
            None => TesterBackend::memory(),
        };
        log::debug!("starting {scenario} with seed {seed}");
        Ok(Self::with_backend(config, seed, backend))
    }

    pub fn with_backend(config: &RunConfig, seed: u64, backend: TesterBackend) -> Self {
        let store =
            ProgressionStore::initialize_with_catalog(backend.clone(), Arc::clone(&config.catalog));
        let shadow = ShadowModel::mirror(&store);
        Self {
            config: config.clone(),
            rng: ChaCha20Rng::seed_from_u64(seed),
            backend,
            store,
            shadow,
            history: Vec::new(),
        }
    }

    /// Dispatch a gesture into the store and verify it against the model.
    pub fn dispatch(&mut self, gesture: Gesture) -> Result<Option<ProtocolOutcome>> {
        self.history.push(gesture);
        let predicted = self.shadow.apply(gesture, &self.config.catalog);
        let outcome = match gesture {
            Gesture::Protocol { category, index } => {
                let catalog = Arc::clone(&self.config.catalog);
                let action = &catalog.protocols_for(category)[index];
                let outcome = self
                    .store
                    .execute_protocol(category, action)
                    .with_context(|| format!("step {}: {gesture}", self.history.len()))?;
                check_outcome(&outcome, predicted)?;
                Some(outcome)
            }
            Gesture::Duress(mode) => {
                self.store.set_duress_mode(mode);
                None
            }
            Gesture::Resist => {
                self.store.resist()?;
                None
            }
            Gesture::Accept => {
                self.store.accept()?;
                None
            }
            Gesture::AdvanceCycle => {
                self.store.advance_cycle()?;
                None
            }
            Gesture::Acknowledge => {
                self.store.acknowledge_level_up();
                None
            }
        };
        self.shadow
            .check(&self.store)
            .with_context(|| format!("after step {}: {gesture}", self.history.len()))?;
        Ok(outcome)
    }

    /// Run `steps` random gestures.
    pub fn random_walk(&mut self, steps: usize) -> Result<()> {
        let catalog = Arc::clone(&self.config.catalog);
        for gesture in Gesture::sequence(&mut self.rng, &catalog, steps) {
            self.dispatch(gesture)?;
        }
        Ok(())
    }

    /// A second store opened on the same backend, as after a reload.
    pub fn reopen(&self) -> ProgressionStore<TesterBackend> {
        ProgressionStore::initialize_with_catalog(
            self.backend.clone(),
            Arc::clone(&self.config.catalog),
        )
    }

    /// One-line view of the store: load meter, status and per-category levels.
    pub fn state_summary(&self) -> String {
        let load = self.store.load();
        let levels = self
            .store
            .stats()
            .iter()
            .map(|(category, record)| format!("{} {}", category.short_label(), record.level))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "load {load} {} | total level {} | {levels}",
            load.status(),
            self.store.stats().total_level()
        )
    }

    pub fn recent_history(&self) -> String {
        self.history
            .iter()
            .rev()
            .take(3)
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" <- ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_summary_shows_load_status_and_levels() {
        let config = RunConfig::new(Catalog::shared_builtin(), 10);
        let mut run = ScenarioRun::start(&config, "summary", 4).unwrap();
        assert_eq!(
            run.state_summary(),
            "load 20% STABLE | total level 6 | STR 1 YIE 1 SEN 1 TUN 1 ENE 1 MOR 1"
        );
        for _ in 0..7 {
            run.dispatch(Gesture::AdvanceCycle).unwrap();
        }
        assert!(run.state_summary().starts_with("load 90% CRITICAL"));
    }
}
