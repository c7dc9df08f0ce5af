use anyhow::{Context, Result, bail, ensure};
use rand::Rng;
use vsm_core::constants::{LOAD_KEY, STATS_KEY};
use vsm_core::{
    CategoryId, DuressMode, KeyValueStore, ProtocolOutcome, SnapshotOrigin, StatRecord, StorePhase,
};

use super::TestScenario;
use crate::logic::{Gesture, ScenarioRun};

pub fn all_scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::new(
            "smoke",
            "One protocol per category plus every passive gesture",
            smoke,
        ),
        TestScenario::new(
            "level-up",
            "Drive one category across the xp threshold and acknowledge the event",
            level_up,
        ),
        TestScenario::new(
            "duress",
            "Duress doubles xp, leaves load deltas alone and toggles off",
            duress,
        ),
        TestScenario::new(
            "load-bounds",
            "Saturate the load meter in both directions",
            load_bounds,
        ),
        TestScenario::new(
            "log-ring",
            "Log keeps only the five newest lines",
            log_ring,
        ),
        TestScenario::new(
            "persistence-roundtrip",
            "Reloading after a random walk restores stats and load",
            persistence_roundtrip,
        ),
        TestScenario::new(
            "legacy-migration",
            "Legacy scalar snapshots load as level 1 records",
            legacy_migration,
        ),
        TestScenario::new(
            "random-walk",
            "Random gestures checked step by step against a reference model",
            random_walk,
        ),
    ]
}

fn smoke(run: &mut ScenarioRun) -> Result<()> {
    ensure!(
        run.store.origin() == SnapshotOrigin::Defaults,
        "fresh backend should start from defaults"
    );
    for category in CategoryId::ALL {
        run.dispatch(Gesture::Protocol { category, index: 0 })?;
        run.dispatch(Gesture::Acknowledge)?;
    }
    for gesture in [Gesture::Resist, Gesture::Accept, Gesture::AdvanceCycle] {
        run.dispatch(gesture)?;
    }
    ensure!(run.store.log().len() == 5, "log should be full");
    Ok(())
}

fn level_up(run: &mut ScenarioRun) -> Result<()> {
    let category = CategoryId::ALL[run.rng.gen_range(0..CategoryId::ALL.len())];
    let starting_level = run.store.stat(category).level;
    for _ in 0..100 {
        let outcome = run.dispatch(Gesture::Protocol { category, index: 0 })?;
        if let Some(ProtocolOutcome::LeveledUp(event)) = outcome {
            ensure!(
                event.new_level == starting_level + 1,
                "{category} jumped from {starting_level} to {}",
                event.new_level
            );
            let expected = run.store.catalog().perk_for(category, event.new_level);
            ensure!(event.perk == expected, "perk mismatch for {category}");
            ensure!(
                run.store.phase() == StorePhase::Announcing,
                "store should announce the level-up"
            );
            run.dispatch(Gesture::Acknowledge)?;
            ensure!(
                run.store.phase() == StorePhase::Idle,
                "acknowledge should return to idle"
            );
            return Ok(());
        }
    }
    bail!("{category} never levelled up")
}

fn duress(run: &mut ScenarioRun) -> Result<()> {
    let mode = if run.rng.gen_bool(0.5) {
        DuressMode::Anxiety
    } else {
        DuressMode::Depression
    };
    run.dispatch(Gesture::Duress(mode))?;

    let category = CategoryId::ALL[run.rng.gen_range(0..CategoryId::ALL.len())];
    let actions = run.store.catalog().protocols_for(category);
    let index = run.rng.gen_range(0..actions.len());
    let action = actions[index].clone();
    let load_before = run.store.load();

    let outcome = run.dispatch(Gesture::Protocol { category, index })?;
    ensure!(
        run.store.load() == load_before.adjusted(action.load_delta),
        "duress must not change load deltas"
    );
    if let Some(ProtocolOutcome::NoLevelUp { applied_xp, .. }) = outcome {
        ensure!(
            applied_xp == action.xp_gain * 2,
            "expected doubled xp, got {applied_xp}"
        );
    }
    if let Some(tag) = mode.log_tag() {
        let newest = run.store.log().newest().unwrap_or_default();
        ensure!(
            newest.ends_with(tag) || newest.starts_with(">>> EMERGENCE"),
            "missing duress tag in {newest:?}"
        );
    }

    run.dispatch(Gesture::Duress(mode))?;
    ensure!(
        run.store.duress() == DuressMode::None,
        "second toggle should clear the mode"
    );
    Ok(())
}

fn load_bounds(run: &mut ScenarioRun) -> Result<()> {
    for _ in 0..12 {
        run.dispatch(Gesture::AdvanceCycle)?;
    }
    ensure!(run.store.load().value() == 100, "load should saturate at 100");
    for _ in 0..25 {
        run.dispatch(Gesture::Resist)?;
    }
    ensure!(run.store.load().value() == 0, "load should bottom out at 0");
    Ok(())
}

fn log_ring(run: &mut ScenarioRun) -> Result<()> {
    let steps = run.config.steps.max(7);
    run.random_walk(steps)?;
    run.dispatch(Gesture::Resist)?;
    let lines: Vec<&str> = run.store.log().iter().collect();
    ensure!(lines.len() == 5, "expected 5 log lines, got {}", lines.len());
    ensure!(
        lines[0] == "> SIGNAL JAMMED. RESISTANCE XP GAINED.",
        "newest line should be the last gesture, got {:?}",
        lines[0]
    );
    Ok(())
}

fn persistence_roundtrip(run: &mut ScenarioRun) -> Result<()> {
    let steps = run.config.steps;
    run.random_walk(steps)?;
    // Guarantees at least one write-through even if the walk only toggled modes.
    run.dispatch(Gesture::Accept)?;

    let reopened = run.reopen();
    ensure!(
        reopened.origin() == SnapshotOrigin::Current,
        "reload should read the current encoding, got {:?}",
        reopened.origin()
    );
    ensure!(reopened.stats() == run.store.stats(), "stats differ after reload");
    ensure!(reopened.load() == run.store.load(), "load differs after reload");
    ensure!(
        reopened.duress() == DuressMode::None,
        "duress mode must not survive a reload"
    );
    Ok(())
}

fn legacy_migration(run: &mut ScenarioRun) -> Result<()> {
    let mut legacy = serde_json::Map::new();
    let mut expected = Vec::new();
    for category in CategoryId::ALL {
        if run.rng.gen_bool(0.7) {
            let xp: u32 = run.rng.gen_range(0..100);
            legacy.insert(category.to_string(), xp.into());
            expected.push((category, xp));
        }
    }
    let load: i32 = run.rng.gen_range(0..=100);
    let bytes = serde_json::to_vec(&legacy)?;
    run.backend
        .write(STATS_KEY, &bytes)
        .context("seeding legacy stats")?;
    run.backend
        .write(LOAD_KEY, load.to_string().as_bytes())
        .context("seeding load")?;

    let migrated = run.reopen();
    if !expected.is_empty() {
        ensure!(
            migrated.origin() == SnapshotOrigin::Legacy,
            "expected legacy origin, got {:?}",
            migrated.origin()
        );
    }
    for (category, xp) in expected {
        ensure!(
            migrated.stat(category) == StatRecord::new(1, xp),
            "{category} migrated to {:?}",
            migrated.stat(category)
        );
    }
    ensure!(migrated.load().value() == load, "load changed in migration");
    Ok(())
}

fn random_walk(run: &mut ScenarioRun) -> Result<()> {
    let steps = run.config.steps;
    run.random_walk(steps)
}
