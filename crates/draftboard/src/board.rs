// Board queries: platform selection, position filter, and name search
// layered over the tracker's available/drafted split.

use tracing::warn;

use crate::draft::session::DraftSessionState;
use crate::draft::tracker::{self, DraftedPlayer};
use crate::player::{Platform, PlayerRecord, RankingTable};

/// Position filter; "all" (any case) or blank selects every position.
/// Other values are uppercased to match the positions on the board.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PositionFilter {
    #[default]
    All,
    Exact(String),
}

impl PositionFilter {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            PositionFilter::All
        } else {
            PositionFilter::Exact(raw.to_ascii_uppercase())
        }
    }

    pub fn matches(&self, position: &str) -> bool {
        match self {
            PositionFilter::All => true,
            PositionFilter::Exact(p) => p == position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardQuery {
    pub platform: Platform,
    pub position: PositionFilter,
    /// Lowercased substring to find in the player identity string.
    search: Option<String>,
}

impl BoardQuery {
    pub fn new(platform: Platform) -> Self {
        BoardQuery {
            platform,
            position: PositionFilter::All,
            search: None,
        }
    }

    /// Build a query from raw request parameters. An unknown or missing
    /// platform falls back to `default_platform`.
    pub fn from_params(
        platform: Option<&str>,
        position: Option<&str>,
        search: Option<&str>,
        default_platform: Platform,
    ) -> Self {
        let platform = match platform {
            Some(raw) => Platform::from_id(raw).unwrap_or_else(|| {
                warn!(
                    "unknown platform '{}', using {}",
                    raw,
                    default_platform.id()
                );
                default_platform
            }),
            None => default_platform,
        };

        BoardQuery::new(platform)
            .with_position(PositionFilter::parse(position.unwrap_or("")))
            .with_search(search.unwrap_or(""))
    }

    pub fn with_position(mut self, position: PositionFilter) -> Self {
        self.position = position;
        self
    }

    pub fn with_search(mut self, search: &str) -> Self {
        let search = search.trim();
        self.search = (!search.is_empty()).then(|| search.to_lowercase());
        self
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn matches(&self, record: &PlayerRecord) -> bool {
        self.position.matches(&record.key.position)
            && self
                .search
                .as_deref()
                .map_or(true, |needle| record.key.player.to_lowercase().contains(needle))
    }
}

/// What a drafter sees: available and drafted players after filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub platform: Platform,
    pub available: Vec<PlayerRecord>,
    /// Newest pick first.
    pub drafted: Vec<DraftedPlayer>,
    /// Rows on the unfiltered board; zero means no ADP data was available.
    pub total_players: usize,
}

impl BoardView {
    pub fn build(table: &RankingTable, state: &DraftSessionState, query: &BoardQuery) -> Self {
        let split = tracker::split(state, table);
        BoardView {
            platform: query.platform,
            available: split
                .available
                .into_iter()
                .filter(|r| query.matches(r))
                .collect(),
            drafted: split
                .drafted
                .into_iter()
                .filter(|d| query.matches(&d.record))
                .collect(),
            total_players: table.len(),
        }
    }

    /// True when there was no data at all, as opposed to a filter that
    /// matched nothing.
    pub fn is_unavailable(&self) -> bool {
        self.total_players == 0
    }
}
