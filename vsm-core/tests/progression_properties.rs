use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use vsm_core::{
    Catalog, CategoryId, DuressMode, MemoryStore, ProgressionStore, ProtocolAction,
    ProtocolOutcome, StatRecord, StorePhase, constants::STATS_KEY,
};

fn store_with(records: &[(CategoryId, StatRecord)], load: i32) -> ProgressionStore<MemoryStore> {
    let backend = MemoryStore::new();
    let stats: serde_json::Map<String, serde_json::Value> = records
        .iter()
        .map(|(category, record)| {
            (
                category.to_string(),
                serde_json::to_value(record).unwrap(),
            )
        })
        .collect();
    backend.insert(STATS_KEY, serde_json::to_vec(&stats).unwrap());
    backend.insert("vsm-load", load.to_string());
    ProgressionStore::initialize(backend)
}

#[test]
fn level_up_rolls_remainder_and_emits_event() {
    let mut store = store_with(&[(CategoryId::Structure, StatRecord::new(1, 85))], 20);
    let outcome = store
        .execute_protocol(CategoryId::Structure, &ProtocolAction::new("Lift", 25, 0))
        .unwrap();

    assert_eq!(store.stat(CategoryId::Structure), StatRecord::new(2, 10));
    let ProtocolOutcome::LeveledUp(event) = outcome else {
        panic!("expected a level-up");
    };
    assert_eq!(event.category, CategoryId::Structure);
    assert_eq!(event.new_level, 2);
    assert_eq!(event.perk.title(), "MYOFIBRIL ADAPTATION");
    assert_eq!(store.pending_level_up(), Some(&event));
}

#[test]
fn duress_doubles_xp_but_not_load() {
    let mut store = store_with(&[(CategoryId::Morale, StatRecord::new(1, 10))], 20);
    store.set_duress_mode(DuressMode::Anxiety);
    let outcome = store
        .execute_protocol(CategoryId::Morale, &ProtocolAction::new("Call", 15, 5))
        .unwrap();

    assert_eq!(
        outcome,
        ProtocolOutcome::NoLevelUp {
            category: CategoryId::Morale,
            applied_xp: 30,
            record: StatRecord::new(1, 40),
        }
    );
    assert_eq!(store.load().value(), 25);
    assert_eq!(
        store.log().newest(),
        Some("> CALL DONE. +30 XP (STRAIN) [NOISE DAMPENED]")
    );
}

#[test]
fn load_clamps_at_both_bounds() {
    let mut low = store_with(&[], 3);
    low.execute_protocol(CategoryId::Sense, &ProtocolAction::new("Rest", 5, -10))
        .unwrap();
    assert_eq!(low.load().value(), 0);

    let mut high = store_with(&[], 98);
    high.execute_protocol(CategoryId::Yield, &ProtocolAction::new("Crunch", 5, 10))
        .unwrap();
    assert_eq!(high.load().value(), 100);
}

#[test]
fn duress_toggle_twice_returns_to_none() {
    let mut store = ProgressionStore::initialize(MemoryStore::new());
    for mode in [DuressMode::Anxiety, DuressMode::Depression] {
        store.set_duress_mode(mode);
        assert_eq!(store.duress(), mode);
        store.set_duress_mode(mode);
        assert_eq!(store.duress(), DuressMode::None);
    }
}

#[test]
fn log_ring_keeps_five_newest_after_seven_operations() {
    let mut store = ProgressionStore::initialize(MemoryStore::new());
    store.resist().unwrap();
    store.accept().unwrap();
    store.set_duress_mode(DuressMode::Anxiety);
    store.set_duress_mode(DuressMode::Anxiety);
    store.advance_cycle().unwrap();
    store
        .apply_passive_adjustment(-1, "> sixth".to_string())
        .unwrap();
    store.apply_passive_adjustment(2, "> seventh").unwrap();

    let lines = store.log().to_vec();
    assert_eq!(
        lines,
        vec![
            "> seventh",
            "> sixth",
            "> CYCLE ADVANCED. ENTROPY +10.",
            "> DURESS MODE DISENGAGED.",
            "> DURESS MODE: ANXIETY ENGAGED.",
        ]
    );
}

#[test]
fn missing_emergence_uses_fallback_perk() {
    let mut store = store_with(&[(CategoryId::Tuning, StatRecord::new(3, 95))], 20);
    let outcome = store
        .execute_protocol(CategoryId::Tuning, &ProtocolAction::new("Plan", 15, -5))
        .unwrap();
    let event = outcome.level_up().expect("level-up");
    assert_eq!(event.new_level, 4);
    assert!(event.perk.is_fallback());
    assert_eq!(event.perk.title(), "SYSTEM OPTIMIZED");
    assert_eq!(event.perk.description(), "Capacity increased.");
}

#[test]
fn acknowledge_is_a_no_op_when_idle() {
    let mut store = ProgressionStore::initialize(MemoryStore::new());
    assert_eq!(store.phase(), StorePhase::Idle);
    assert!(store.acknowledge_level_up().is_none());
    assert_eq!(store.phase(), StorePhase::Idle);
}

#[test]
fn random_protocol_walk_preserves_stat_invariants() {
    let catalog = Catalog::builtin();
    for seed in [1_u64, 7, 1337, 0xC0FFEE] {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut store = ProgressionStore::initialize(MemoryStore::new());
        for _ in 0..500 {
            if rng.gen_bool(0.1) {
                let mode = if rng.gen_bool(0.5) {
                    DuressMode::Anxiety
                } else {
                    DuressMode::Depression
                };
                store.set_duress_mode(mode);
            }
            let category = CategoryId::ALL[rng.gen_range(0..CategoryId::ALL.len())];
            let actions = catalog.protocols_for(category);
            let action = &actions[rng.gen_range(0..actions.len())];
            let before = store.stat(category);

            let outcome = store.execute_protocol(category, action).unwrap();
            let after = store.stat(category);

            assert!(after.xp < 100, "seed {seed}: xp escaped range: {after:?}");
            assert!(after.level >= before.level, "seed {seed}: level decreased");
            assert!(after.level <= before.level + 1, "seed {seed}: level skipped");
            assert_eq!(outcome.level_up().is_some(), after.level > before.level);
            assert!((0..=100).contains(&store.load().value()));
            assert!(store.log().len() <= 5);
            store.acknowledge_level_up();
        }
    }
}
