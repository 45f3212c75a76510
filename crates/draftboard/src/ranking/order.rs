// The drafter's custom order: a sequence of player identities where
// position in the sequence is the rank.

use std::collections::HashSet;

use thiserror::Error;
use tracing::warn;

use crate::player::{PlayerKey, RankingTable};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("rank {rank} is out of range (1..={len})")]
    RankOutOfRange { rank: usize, len: usize },
}

/// Ordered, duplicate-free list of player identities. Entry `i` has custom
/// rank `i + 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomOrder {
    entries: Vec<PlayerKey>,
}

impl CustomOrder {
    /// Build an order, dropping repeated keys after their first occurrence.
    pub fn new(entries: Vec<PlayerKey>) -> Self {
        let mut seen = HashSet::with_capacity(entries.len());
        let mut deduped = Vec::with_capacity(entries.len());
        for key in entries {
            if seen.contains(&key) {
                warn!("duplicate ranking entry for {}, keeping first", key);
                continue;
            }
            seen.insert(key.clone());
            deduped.push(key);
        }
        CustomOrder { entries: deduped }
    }

    /// Capture the current order of a ranking table.
    pub fn from_table(table: &RankingTable) -> Self {
        CustomOrder::new(table.iter().map(|r| r.key.clone()).collect())
    }

    pub fn entries(&self) -> &[PlayerKey] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlayerKey> {
        self.entries.iter()
    }

    /// Move the player at `from_rank` so it ends up at `to_rank`, shifting
    /// the players in between by one. Ranks are 1-based.
    pub fn move_entry(&mut self, from_rank: usize, to_rank: usize) -> Result<(), OrderError> {
        let len = self.entries.len();
        for rank in [from_rank, to_rank] {
            if rank == 0 || rank > len {
                return Err(OrderError::RankOutOfRange { rank, len });
            }
        }
        let key = self.entries.remove(from_rank - 1);
        self.entries.insert(to_rank - 1, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(names: &[&str]) -> CustomOrder {
        CustomOrder::new(names.iter().map(|n| PlayerKey::new(*n, "WR")).collect())
    }

    fn names(order: &CustomOrder) -> Vec<&str> {
        order.iter().map(|k| k.player.as_str()).collect()
    }

    #[test]
    fn duplicates_keep_first() {
        let o = order(&["A", "B", "A", "C"]);
        assert_eq!(names(&o), vec!["A", "B", "C"]);
    }

    #[test]
    fn move_down_shifts_others_up() {
        let mut o = order(&["A", "B", "C", "D"]);
        o.move_entry(1, 3).unwrap();
        assert_eq!(names(&o), vec!["B", "C", "A", "D"]);
    }

    #[test]
    fn move_up_shifts_others_down() {
        let mut o = order(&["A", "B", "C", "D"]);
        o.move_entry(4, 2).unwrap();
        assert_eq!(names(&o), vec!["A", "D", "B", "C"]);
    }

    #[test]
    fn move_to_same_rank_is_noop() {
        let mut o = order(&["A", "B"]);
        o.move_entry(2, 2).unwrap();
        assert_eq!(names(&o), vec!["A", "B"]);
    }

    #[test]
    fn move_out_of_range_is_rejected() {
        let mut o = order(&["A", "B"]);
        assert_eq!(
            o.move_entry(0, 1),
            Err(OrderError::RankOutOfRange { rank: 0, len: 2 })
        );
        assert_eq!(
            o.move_entry(1, 3),
            Err(OrderError::RankOutOfRange { rank: 3, len: 2 })
        );
        assert_eq!(names(&o), vec!["A", "B"]);
    }
}
