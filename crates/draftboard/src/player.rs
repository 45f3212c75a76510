// Player identity, ADP values, and the ranking table shared by every stage
// of the ADP -> ranking -> metrics -> draft pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Header of the player identity column on FantasyPros pages and in the
/// persisted rankings file. The value bundles name, team, and bye week,
/// e.g. "Ja'Marr Chase CIN (10)".
pub const PLAYER_COLUMN: &str = "Player Team (Bye)";

/// Header of the position column.
pub const POSITION_COLUMN: &str = "POS";

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// ADP platform whose consensus values a ranking is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Sleeper,
    Underdog,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Sleeper, Platform::Underdog];

    /// Query identifier ("sleeper" / "underdog").
    pub fn id(&self) -> &'static str {
        match self {
            Platform::Sleeper => "sleeper",
            Platform::Underdog => "underdog",
        }
    }

    /// Header of this platform's ADP column on the FantasyPros tables.
    pub fn adp_column(&self) -> &'static str {
        match self {
            Platform::Sleeper => "Sleeper",
            Platform::Underdog => "Underdog",
        }
    }

    /// Parse a query identifier, ignoring case and surrounding whitespace.
    pub fn from_id(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sleeper" => Some(Platform::Sleeper),
            "underdog" => Some(Platform::Underdog),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.adp_column())
    }
}

// ---------------------------------------------------------------------------
// Identity and ADP
// ---------------------------------------------------------------------------

/// Identity of a player row: the name-team-bye string plus position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerKey {
    pub player: String,
    pub position: String,
}

impl PlayerKey {
    pub fn new(player: impl Into<String>, position: impl Into<String>) -> Self {
        PlayerKey {
            player: player.into(),
            position: position.into(),
        }
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.player, self.position)
    }
}

/// ADP cell exactly as the source published it. Kept as text because
/// sources occasionally publish non-numeric placeholders; see
/// [`AdpValue::numeric`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdpValue(String);

impl AdpValue {
    /// Wrap a raw cell. Blank cells are treated as missing.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(AdpValue(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, or `None` when the cell does not parse as a finite
    /// float.
    pub fn numeric(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl fmt::Display for AdpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Ranking table
// ---------------------------------------------------------------------------

/// Rank of a player among players sharing the same position, e.g. "WR3".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PositionRank {
    pub position: String,
    pub rank: u32,
}

impl fmt::Display for PositionRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.position, self.rank)
    }
}

/// One row of a ranking table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub key: PlayerKey,
    /// ADP for the selected platform, if the player appears there.
    pub adp: Option<AdpValue>,
    /// The drafter's custom rank (1-based, dense).
    pub rank: u32,
    /// Filled in by [`crate::metrics::add_position_rank`].
    pub position_rank: Option<PositionRank>,
    /// Custom rank minus numeric ADP. Filled in by
    /// [`crate::metrics::add_differential`]; stays `None` when the ADP is
    /// missing or non-numeric.
    pub diff: Option<f64>,
}

impl PlayerRecord {
    pub fn new(key: PlayerKey, adp: Option<AdpValue>, rank: u32) -> Self {
        PlayerRecord {
            key,
            adp,
            rank,
            position_rank: None,
            diff: None,
        }
    }
}

/// Players ordered by custom rank ascending. Tables are rebuilt rather than
/// mutated; the metrics functions return new tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankingTable {
    rows: Vec<PlayerRecord>,
}

impl RankingTable {
    /// Build a table, ordering rows by custom rank (stable for equal ranks).
    pub fn new(mut rows: Vec<PlayerRecord>) -> Self {
        rows.sort_by_key(|r| r.rank);
        RankingTable { rows }
    }

    pub fn rows(&self) -> &[PlayerRecord] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<PlayerRecord> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlayerRecord> {
        self.rows.iter()
    }

    /// Look up a row by custom rank.
    pub fn by_rank(&self, rank: u32) -> Option<&PlayerRecord> {
        self.rows.iter().find(|r| r.rank == rank)
    }

    /// Look up a row by identity.
    pub fn find(&self, key: &PlayerKey) -> Option<&PlayerRecord> {
        self.rows.iter().find(|r| &r.key == key)
    }

    /// Distinct positions in first-seen order.
    pub fn positions(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();
        for row in &self.rows {
            if seen.insert(row.key.position.as_str()) {
                out.push(row.key.position.clone());
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a RankingTable {
    type Item = &'a PlayerRecord;
    type IntoIter = std::slice::Iter<'a, PlayerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
