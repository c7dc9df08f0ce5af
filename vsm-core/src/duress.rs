//! Temporary coping modes that scale protocol xp.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::DURESS_MULTIPLIER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuressMode {
    #[default]
    None,
    Anxiety,
    Depression,
}

impl DuressMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Anxiety => "anxiety",
            Self::Depression => "depression",
        }
    }

    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }

    #[must_use]
    pub const fn xp_multiplier(self) -> u32 {
        if self.is_active() { DURESS_MULTIPLIER } else { 1 }
    }

    /// Suffix appended to protocol log lines while the mode is active.
    #[must_use]
    pub const fn log_tag(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Anxiety => Some("[NOISE DAMPENED]"),
            Self::Depression => Some("[INERTIA BROKEN]"),
        }
    }

    /// Mode after the user selects `requested`: choosing the active mode again clears it.
    #[must_use]
    pub fn toggled(self, requested: Self) -> Self {
        if self == requested {
            Self::None
        } else {
            requested
        }
    }
}

impl fmt::Display for DuressMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuressMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "anxiety" => Ok(Self::Anxiety),
            "depression" => Ok(Self::Depression),
            _ => Err(()),
        }
    }
}
