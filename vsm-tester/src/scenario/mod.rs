use anyhow::Result;

use crate::logic::ScenarioRun;

pub mod catalog;

pub type ScenarioCheck = fn(&mut ScenarioRun) -> Result<()>;

// Logic test scenario
#[derive(Debug, Clone, Copy)]
pub struct TestScenario {
    pub key: &'static str,
    pub description: &'static str,
    pub check: ScenarioCheck,
}

impl TestScenario {
    pub const fn new(key: &'static str, description: &'static str, check: ScenarioCheck) -> Self {
        Self {
            key,
            description,
            check,
        }
    }
}

pub fn get_scenario(key: &str) -> Option<TestScenario> {
    catalog::all_scenarios()
        .into_iter()
        .find(|scenario| scenario.key == key)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog::all_scenarios()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_keys_are_unique_and_resolvable() {
        let listed = list_scenarios();
        for (key, _) in &listed {
            assert!(get_scenario(key).is_some(), "missing {key}");
        }
        let mut keys: Vec<_> = listed.iter().map(|(key, _)| *key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), listed.len());
        assert!(get_scenario("no-such-scenario").is_none());
    }
}
