//! Bounded, newest-first activity log.
use std::collections::VecDeque;

use crate::constants::{LOG_AWAITING, LOG_BOOT, LOG_CAPACITY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRing {
    entries: VecDeque<String>,
}

impl LogRing {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: VecDeque::with_capacity(LOG_CAPACITY + 1),
        }
    }

    /// The two boot lines a fresh store shows.
    #[must_use]
    pub fn boot() -> Self {
        let mut ring = Self::empty();
        ring.push(LOG_AWAITING);
        ring.push(LOG_BOOT);
        ring
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.entries.push_front(line.into());
        self.entries.truncate(LOG_CAPACITY);
    }

    #[must_use]
    pub fn newest(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for LogRing {
    fn default() -> Self {
        Self::boot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_lines_are_newest_first() {
        let ring = LogRing::boot();
        assert_eq!(ring.to_vec(), vec!["SYSTEM ONLINE.", "AWAITING INPUT."]);
    }

    #[test]
    fn ring_keeps_only_latest_entries() {
        let mut ring = LogRing::empty();
        for idx in 1..=7 {
            ring.push(format!("entry {idx}"));
        }
        assert_eq!(ring.len(), LOG_CAPACITY);
        assert_eq!(ring.newest(), Some("entry 7"));
        assert_eq!(ring.iter().last(), Some("entry 3"));
    }
}
