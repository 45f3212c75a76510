// Derived ranking metrics: per-position rank and the reach/value
// differential against ADP, plus the differential color scale.
//
// Both metrics need the whole table (position rank depends on every other
// row), so they are table -> table functions rather than per-row helpers.

use std::collections::HashMap;
use std::fmt;

use crate::player::{AdpValue, PositionRank, RankingTable};

/// Differential magnitude at which the color scale saturates.
pub const DEFAULT_DIFF_CLAMP: f64 = 15.0;

/// Return a copy of `table` with every row's position rank set.
///
/// A row's position rank is 1 + the number of rows with the same position
/// and a strictly smaller custom rank.
pub fn add_position_rank(table: &RankingTable) -> RankingTable {
    let mut rows = table.rows().to_vec();

    let mut by_rank: Vec<usize> = (0..rows.len()).collect();
    by_rank.sort_by_key(|&i| rows[i].rank);

    let mut counts: HashMap<String, u32> = HashMap::new();
    let mut assigned = vec![0u32; rows.len()];
    let mut start = 0;
    while start < by_rank.len() {
        // Rows sharing a custom rank do not count against each other.
        let rank = rows[by_rank[start]].rank;
        let end = by_rank[start..]
            .iter()
            .position(|&i| rows[i].rank != rank)
            .map_or(by_rank.len(), |offset| start + offset);

        for &i in &by_rank[start..end] {
            assigned[i] = counts.get(&rows[i].key.position).copied().unwrap_or(0) + 1;
        }
        for &i in &by_rank[start..end] {
            *counts.entry(rows[i].key.position.clone()).or_insert(0) += 1;
        }
        start = end;
    }

    for (row, pos_rank) in rows.iter_mut().zip(assigned) {
        row.position_rank = Some(PositionRank {
            position: row.key.position.clone(),
            rank: pos_rank,
        });
    }
    RankingTable::new(rows)
}

/// Return a copy of `table` with every row's differential set. Rows whose
/// ADP is missing or non-numeric get `None`.
pub fn add_differential(table: &RankingTable) -> RankingTable {
    let rows = table
        .iter()
        .map(|row| {
            let mut row = row.clone();
            row.diff = differential(row.rank, row.adp.as_ref());
            row
        })
        .collect();
    RankingTable::new(rows)
}

/// Apply both metrics.
pub fn annotate(table: &RankingTable) -> RankingTable {
    add_differential(&add_position_rank(table))
}

/// Custom rank minus numeric ADP. Positive means the drafter is lower on the
/// player than consensus (value), negative means higher (reach).
pub fn differential(rank: u32, adp: Option<&AdpValue>) -> Option<f64> {
    adp.and_then(AdpValue::numeric).map(|adp| f64::from(rank) - adp)
}

// ---------------------------------------------------------------------------
// Color scale
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const NEUTRAL: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Map a differential onto the reach (green) / value (red) scale.
///
/// The differential is clamped to `[-clamp, clamp]`; the off channels fade
/// linearly from 255 at zero to 100 at the clamp. Zero, `None`, non-finite
/// input, or a non-positive clamp give [`Rgb::NEUTRAL`].
pub fn diff_color(diff: Option<f64>, clamp: f64) -> Rgb {
    let Some(diff) = diff.filter(|d| d.is_finite()) else {
        return Rgb::NEUTRAL;
    };
    if !clamp.is_finite() || clamp <= 0.0 {
        return Rgb::NEUTRAL;
    }

    let norm = diff.clamp(-clamp, clamp);
    let faded = (255.0 - 155.0 * norm.abs() / clamp).round() as u8;
    if norm < 0.0 {
        Rgb {
            r: faded,
            g: 255,
            b: faded,
        }
    } else if norm > 0.0 {
        Rgb {
            r: 255,
            g: faded,
            b: faded,
        }
    } else {
        Rgb::NEUTRAL
    }
}
