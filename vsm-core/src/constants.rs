//! Centralized progression and tuning constants for the VSM engine.
//!
//! These values define the deterministic arithmetic of the progression model.
//! Keeping them together ensures the rules can only be adjusted via code
//! changes reviewed in version control, rather than through persisted state.

// Progression --------------------------------------------------------------
/// Experience needed to advance one level; xp always renormalizes below it.
pub const XP_PER_LEVEL: u32 = 100;
/// Xp multiplier applied to protocol gains while any duress mode is active.
pub const DURESS_MULTIPLIER: u32 = 2;
pub const STARTING_LEVEL: u32 = 1;

// Load meter ---------------------------------------------------------------
pub const LOAD_MIN: i32 = 0;
pub const LOAD_MAX: i32 = 100;
pub const DEFAULT_LOAD: i32 = 20;
/// Load strictly above this value is reported as critical.
pub const LOAD_CRITICAL_THRESHOLD: i32 = 80;
/// Protocols at or above this delta are classified as heavy strain.
pub const STRAIN_HIGH_THRESHOLD: i32 = 10;

// Passive gestures ---------------------------------------------------------
pub const RESIST_DELTA: i32 = -5;
pub const ACCEPT_DELTA: i32 = -5;
pub const ADVANCE_CYCLE_DELTA: i32 = 10;

// Log ring -----------------------------------------------------------------
pub const LOG_CAPACITY: usize = 5;
pub(crate) const LOG_BOOT: &str = "SYSTEM ONLINE.";
pub(crate) const LOG_AWAITING: &str = "AWAITING INPUT.";
pub(crate) const LOG_RESIST: &str = "> SIGNAL JAMMED. RESISTANCE XP GAINED.";
pub(crate) const LOG_ACCEPT: &str = "> SIGNAL ACCEPTED. STRAIN RELEASED.";
pub(crate) const LOG_ADVANCE_CYCLE: &str = "> CYCLE ADVANCED. ENTROPY +10.";

// Emergence fallback -------------------------------------------------------
pub const FALLBACK_PERK_TITLE: &str = "SYSTEM OPTIMIZED";
pub const FALLBACK_PERK_DESCRIPTION: &str = "Capacity increased.";

// Persistence keys ---------------------------------------------------------
pub const STATS_KEY: &str = "vsm-stats";
pub const LOAD_KEY: &str = "vsm-load";
