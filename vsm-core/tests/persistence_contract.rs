use vsm_core::constants::{LOAD_KEY, STATS_KEY};
use vsm_core::{
    CategoryId, FileStore, MemoryStore, PersistenceAdapter, ProgressionStore, ProtocolAction,
    SnapshotOrigin, StatRecord, StatSheet, SystemLoad,
};

fn temp_dir(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "vsm-persistence-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn save_then_initialize_reproduces_sheet_and_load() {
    let backend = MemoryStore::new();
    let sheet = StatSheet::from_fn(|category| match category {
        CategoryId::Structure => StatRecord::new(4, 99),
        CategoryId::Energy => StatRecord::new(2, 0),
        _ => StatRecord::new(1, 50),
    });
    PersistenceAdapter::new(backend.clone())
        .save(&sheet, SystemLoad::new(77))
        .unwrap();

    let store = ProgressionStore::initialize(backend);
    assert_eq!(store.origin(), SnapshotOrigin::Current);
    assert_eq!(store.stats(), &sheet);
    assert_eq!(store.load().value(), 77);
}

#[test]
fn legacy_scalar_snapshot_is_migrated_to_level_one() {
    let backend = MemoryStore::new();
    backend.insert(STATS_KEY, r#"{"Structure": 42, "Yield": 7}"#);

    let mut store = ProgressionStore::initialize(backend.clone());
    assert_eq!(store.origin(), SnapshotOrigin::Legacy);
    assert_eq!(store.stat(CategoryId::Structure), StatRecord::new(1, 42));
    assert_eq!(store.stat(CategoryId::Yield), StatRecord::new(1, 7));
    assert_eq!(store.load().value(), 20);

    // The first write-through rewrites the entry in the current encoding.
    store.resist().unwrap();
    let reopened = ProgressionStore::initialize(backend);
    assert_eq!(reopened.origin(), SnapshotOrigin::Current);
    assert_eq!(reopened.stat(CategoryId::Structure), StatRecord::new(1, 42));
}

#[test]
fn unreadable_state_falls_back_to_defaults() {
    let backend = MemoryStore::new();
    backend.insert(STATS_KEY, "{\"Structure\": {\"level\": 1");
    backend.insert(LOAD_KEY, "null");

    let store = ProgressionStore::initialize(backend);
    assert_eq!(store.origin(), SnapshotOrigin::Recovered);
    assert_eq!(store.stats(), &StatSheet::defaults());
    assert_eq!(store.load().value(), 20);
}

#[test]
fn saturated_level_is_treated_as_unreadable() {
    let backend = MemoryStore::new();
    backend.insert(STATS_KEY, r#"{"Structure": {"level": 4294967295, "xp": 95}}"#);

    let mut store = ProgressionStore::initialize(backend);
    assert_eq!(store.origin(), SnapshotOrigin::Recovered);
    assert_eq!(store.stat(CategoryId::Structure), StatRecord::new(1, 10));

    let outcome = store
        .execute_protocol(CategoryId::Structure, &ProtocolAction::new("Walk", 15, -10))
        .unwrap();
    assert!(outcome.level_up().is_none());
    assert_eq!(store.stat(CategoryId::Structure), StatRecord::new(1, 25));
}

#[test]
fn load_entry_alone_is_honoured() {
    let backend = MemoryStore::new();
    backend.insert(LOAD_KEY, "64");
    let store = ProgressionStore::initialize(backend);
    assert_eq!(store.origin(), SnapshotOrigin::Defaults);
    assert_eq!(store.load().value(), 64);
}

#[test]
fn every_mutation_writes_both_entries() {
    let backend = MemoryStore::new();
    let mut store = ProgressionStore::initialize(backend.clone());
    assert!(backend.is_empty());

    store
        .execute_protocol(CategoryId::Yield, &ProtocolAction::new("Draft", 10, 5))
        .unwrap();
    assert_eq!(backend.len(), 2);
    assert_eq!(backend.get(LOAD_KEY).as_deref(), Some(b"25".as_slice()));
}

#[test]
fn duress_mode_is_not_persisted() {
    let backend = MemoryStore::new();
    let mut store = ProgressionStore::initialize(backend.clone());
    store.set_duress_mode(vsm_core::DuressMode::Depression);
    store.advance_cycle().unwrap();

    let reopened = ProgressionStore::initialize(backend);
    assert_eq!(reopened.duress(), vsm_core::DuressMode::None);
    assert_eq!(reopened.load().value(), 30);
}

#[test]
fn file_store_survives_process_style_reopen() {
    let dir = temp_dir("reopen");
    let mut store = ProgressionStore::initialize(FileStore::open(&dir).unwrap());
    store
        .execute_named("Energy", "Garden (Biomass)")
        .unwrap();
    let backend = store.dispose().unwrap();
    assert!(backend.root().join("vsm-stats.json").exists());

    let reopened = ProgressionStore::initialize(FileStore::open(&dir).unwrap());
    assert_eq!(reopened.stat(CategoryId::Energy), StatRecord::new(1, 42));
    assert_eq!(reopened.load().value(), 0);
    std::fs::remove_dir_all(dir).unwrap();
}
