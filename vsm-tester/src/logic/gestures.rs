use rand::Rng;
use std::fmt;
use vsm_core::{Catalog, CategoryId, DuressMode};

/// One user gesture dispatched into the progression store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Protocol { category: CategoryId, index: usize },
    Duress(DuressMode),
    Resist,
    Accept,
    AdvanceCycle,
    Acknowledge,
}

impl Gesture {
    /// Weighted pick: protocols dominate, the rest keep the meters moving.
    pub fn random<R: Rng>(rng: &mut R, catalog: &Catalog) -> Self {
        match rng.gen_range(0..20) {
            0 => Self::Duress(DuressMode::Anxiety),
            1 => Self::Duress(DuressMode::Depression),
            2 => Self::Resist,
            3 => Self::Accept,
            4 => Self::AdvanceCycle,
            5 => Self::Acknowledge,
            _ => {
                let category = CategoryId::ALL[rng.gen_range(0..CategoryId::ALL.len())];
                let count = catalog.protocols_for(category).len().max(1);
                Self::Protocol {
                    category,
                    index: rng.gen_range(0..count),
                }
            }
        }
    }

    pub fn sequence<R: Rng>(rng: &mut R, catalog: &Catalog, steps: usize) -> Vec<Self> {
        (0..steps).map(|_| Self::random(rng, catalog)).collect()
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol { category, index } => {
                write!(f, "protocol {}#{index}", category.short_label())
            }
            Self::Duress(mode) => write!(f, "duress {mode}"),
            Self::Resist => f.write_str("resist"),
            Self::Accept => f.write_str("accept"),
            Self::AdvanceCycle => f.write_str("advance-cycle"),
            Self::Acknowledge => f.write_str("acknowledge"),
        }
    }
}
