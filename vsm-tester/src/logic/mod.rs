pub mod backend;
pub mod gestures;
pub mod reports;
pub mod seeds;
pub mod shadow;
pub mod simulation;
pub mod tester;

pub use gestures::Gesture;
pub use seeds::resolve_seed_inputs;
pub use simulation::{RunConfig, ScenarioRun};
pub use tester::*;
