//! Global stress meter shared by every category.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{DEFAULT_LOAD, LOAD_CRITICAL_THRESHOLD, LOAD_MAX, LOAD_MIN};

/// Load value, always within `LOAD_MIN..=LOAD_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct SystemLoad(i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Stable,
    Critical,
}

impl SystemLoad {
    /// Clamp an arbitrary value into the meter range.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(if value < LOAD_MIN {
            LOAD_MIN
        } else if value > LOAD_MAX {
            LOAD_MAX
        } else {
            value
        })
    }

    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn adjusted(self, delta: i32) -> Self {
        Self::new(self.0.saturating_add(delta))
    }

    #[must_use]
    pub const fn status(self) -> LoadStatus {
        if self.0 > LOAD_CRITICAL_THRESHOLD {
            LoadStatus::Critical
        } else {
            LoadStatus::Stable
        }
    }
}

impl Default for SystemLoad {
    fn default() -> Self {
        Self(DEFAULT_LOAD)
    }
}

impl From<i32> for SystemLoad {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl From<SystemLoad> for i32 {
    fn from(value: SystemLoad) -> Self {
        value.0
    }
}

impl fmt::Display for SystemLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => f.write_str("STABLE"),
            Self::Critical => f.write_str("CRITICAL"),
        }
    }
}
