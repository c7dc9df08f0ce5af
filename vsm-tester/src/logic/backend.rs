use anyhow::{Context, Result};
use std::io;
use std::path::PathBuf;
use vsm_core::{FileStore, KeyValueStore, MemoryStore};

/// Backend used by scenario runs: in memory by default, on disk with `--state-dir`.
#[derive(Debug, Clone)]
pub enum TesterBackend {
    Memory(MemoryStore),
    File(FileStore),
}

impl TesterBackend {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    /// Fresh directory for one iteration, wiping leftovers from a previous run.
    pub fn file(root: PathBuf) -> Result<Self> {
        if root.exists() {
            std::fs::remove_dir_all(&root)
                .with_context(|| format!("failed to clear {}", root.display()))?;
        }
        let store =
            FileStore::open(&root).with_context(|| format!("failed to open {}", root.display()))?;
        Ok(Self::File(store))
    }
}

impl KeyValueStore for TesterBackend {
    type Error = io::Error;

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        match self {
            Self::Memory(store) => Ok(store.get(key)),
            Self::File(store) => store.read(key),
        }
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<(), Self::Error> {
        match self {
            Self::Memory(store) => {
                store.insert(key, value);
                Ok(())
            }
            Self::File(store) => store.write(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        match self {
            Self::Memory(store) => store.remove(key).map_err(|never| match never {}),
            Self::File(store) => store.remove(key),
        }
    }
}
