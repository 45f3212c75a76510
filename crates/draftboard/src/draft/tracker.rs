// Draft session tracker: marking players drafted, splitting the board into
// available and drafted players, and resetting the session.
//
// Row lifecycle: Available -> Drafted. There is no per-player undo; only a
// session-wide reset returns players to Available.

use tracing::{debug, info};

use super::session::DraftSessionState;
use crate::player::{PlayerKey, PlayerRecord, RankingTable};

/// Result of a mark-drafted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// Newly drafted at this 1-based draft position.
    Drafted { pick: usize },
    /// Already drafted earlier; nothing changed.
    AlreadyDrafted { pick: usize },
    /// Input did not identify a player on the board; nothing changed.
    Ignored,
}

/// A drafted row with its draft position.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftedPlayer {
    pub pick: usize,
    pub record: PlayerRecord,
}

/// The board partitioned by drafted state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardSplit {
    /// Not yet drafted, in custom-rank order.
    pub available: Vec<PlayerRecord>,
    /// Drafted, newest pick first.
    pub drafted: Vec<DraftedPlayer>,
}

/// Mark `key` drafted. Repeated marks are no-ops. Keys that are not on any
/// board are accepted; they simply never show up in a split.
pub fn mark_drafted(state: &mut DraftSessionState, key: PlayerKey) -> MarkOutcome {
    if let Some(pick) = state.draft_position(&key) {
        debug!("{} already drafted at pick {}", key, pick);
        return MarkOutcome::AlreadyDrafted { pick };
    }
    info!("pick {}: {}", state.len() + 1, key);
    let pick = state.push(key);
    MarkOutcome::Drafted { pick }
}

/// Mark drafted from raw user input naming a custom rank on `table`.
/// Non-integer or out-of-range input is ignored.
pub fn mark_drafted_input(
    state: &mut DraftSessionState,
    table: &RankingTable,
    raw: &str,
) -> MarkOutcome {
    let Ok(rank) = raw.trim().parse::<u32>() else {
        debug!("ignoring non-numeric draft input '{}'", raw);
        return MarkOutcome::Ignored;
    };
    let Some(record) = table.by_rank(rank) else {
        debug!("ignoring draft input for unknown rank {}", rank);
        return MarkOutcome::Ignored;
    };
    mark_drafted(state, record.key.clone())
}

/// Partition `table` into available and drafted rows.
pub fn split(state: &DraftSessionState, table: &RankingTable) -> BoardSplit {
    let positions = state.position_index();
    let mut out = BoardSplit::default();

    for record in table {
        match positions.get(&record.key) {
            Some(&pick) => out.drafted.push(DraftedPlayer {
                pick,
                record: record.clone(),
            }),
            None => out.available.push(record.clone()),
        }
    }

    out.drafted.sort_by(|a, b| b.pick.cmp(&a.pick));
    out
}

/// End the draft: every player becomes available again.
pub fn reset(state: &mut DraftSessionState) {
    info!("draft reset after {} picks", state.len());
    state.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> RankingTable {
        RankingTable::new(
            ["A", "B", "C", "D"]
                .iter()
                .zip(1u32..)
                .map(|(name, rank)| PlayerRecord::new(PlayerKey::new(*name, "WR"), None, rank))
                .collect(),
        )
    }

    fn key(name: &str) -> PlayerKey {
        PlayerKey::new(name, "WR")
    }

    fn available(split: &BoardSplit) -> Vec<&str> {
        split.available.iter().map(|r| r.key.player.as_str()).collect()
    }

    fn drafted(split: &BoardSplit) -> Vec<(usize, &str)> {
        split
            .drafted
            .iter()
            .map(|d| (d.pick, d.record.key.player.as_str()))
            .collect()
    }

    #[test]
    fn marking_twice_is_idempotent() {
        let mut state = DraftSessionState::new();
        assert_eq!(mark_drafted(&mut state, key("B")), MarkOutcome::Drafted { pick: 1 });
        assert_eq!(
            mark_drafted(&mut state, key("B")),
            MarkOutcome::AlreadyDrafted { pick: 1 }
        );
        assert_eq!(state.len(), 1);
        assert_eq!(state.draft_position(&key("B")), Some(1));
    }

    #[test]
    fn draft_positions_follow_mark_order() {
        let mut state = DraftSessionState::new();
        mark_drafted(&mut state, key("C"));
        mark_drafted(&mut state, key("A"));
        assert_eq!(mark_drafted(&mut state, key("D")), MarkOutcome::Drafted { pick: 3 });
    }

    #[test]
    fn split_partitions_and_orders_newest_first() {
        let mut state = DraftSessionState::new();
        mark_drafted(&mut state, key("C"));
        mark_drafted(&mut state, key("A"));
        let split = split(&state, &board());
        assert_eq!(available(&split), vec!["B", "D"]);
        assert_eq!(drafted(&split), vec![(2, "A"), (1, "C")]);
    }

    #[test]
    fn unknown_key_is_accepted_but_never_surfaces() {
        let mut state = DraftSessionState::new();
        assert_eq!(
            mark_drafted(&mut state, key("Nobody")),
            MarkOutcome::Drafted { pick: 1 }
        );
        mark_drafted(&mut state, key("B"));
        let split = split(&state, &board());
        assert_eq!(available(&split), vec!["A", "C", "D"]);
        assert_eq!(drafted(&split), vec![(2, "B")]);
    }

    #[test]
    fn reset_returns_everyone_to_available() {
        let mut state = DraftSessionState::new();
        mark_drafted(&mut state, key("A"));
        mark_drafted(&mut state, key("D"));
        reset(&mut state);
        let split = split(&state, &board());
        assert_eq!(split.available, board().into_rows());
        assert!(split.drafted.is_empty());
    }

    #[test]
    fn reset_on_empty_session_is_fine() {
        let mut state = DraftSessionState::new();
        reset(&mut state);
        assert!(state.is_empty());
    }

    #[test]
    fn input_resolves_rank() {
        let mut state = DraftSessionState::new();
        assert_eq!(
            mark_drafted_input(&mut state, &board(), " 3 "),
            MarkOutcome::Drafted { pick: 1 }
        );
        assert_eq!(state.drafted(), &[key("C")]);
    }

    #[test]
    fn invalid_input_is_noop() {
        let mut state = DraftSessionState::new();
        let table = board();
        for raw in ["", "abc", "-1", "0", "5", "2.5"] {
            assert_eq!(mark_drafted_input(&mut state, &table, raw), MarkOutcome::Ignored);
        }
        assert!(state.is_empty());
    }
}
