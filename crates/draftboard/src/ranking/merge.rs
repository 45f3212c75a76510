// Merge of the persisted custom order with freshly reconciled ADP data.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::{debug, info};

use super::order::CustomOrder;
use crate::adp::reconcile::AdpTable;
use crate::player::{AdpValue, PlayerKey, PlayerRecord, RankingTable};

/// What to do with players that have fresh ADP but are not in the persisted
/// order (rookies, newly listed players).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnrankedPolicy {
    /// Append them after the ranked players, in ADP table order.
    #[default]
    Append,
    /// Leave them out; the persisted order defines the board.
    Drop,
}

/// Build the ranking table for one platform.
///
/// With a persisted order, every persisted player is kept (missing ADP when
/// the player is absent from the fresh data) and ranked 1..N in persisted
/// order; unranked fresh players follow `policy`. Without an order, or when
/// the ADP table is empty so there is nothing to join against, ranks follow
/// the ADP table's own order.
pub fn merge(adp: &AdpTable, order: Option<&CustomOrder>, policy: UnrankedPolicy) -> RankingTable {
    match order {
        Some(order) if !adp.is_empty() => rank_by_order(adp, order, policy),
        Some(_) => {
            debug!("no ADP rows to join the custom order against; using ADP order");
            rank_by_adp(adp)
        }
        None => rank_by_adp(adp),
    }
}

/// Ranks follow the ADP table's row order, starting at 1.
pub fn rank_by_adp(adp: &AdpTable) -> RankingTable {
    RankingTable::new(
        adp.rows
            .iter()
            .zip(1u32..)
            .map(|(row, rank)| PlayerRecord::new(row.key.clone(), row.adp.clone(), rank))
            .collect(),
    )
}

fn rank_by_order(adp: &AdpTable, order: &CustomOrder, policy: UnrankedPolicy) -> RankingTable {
    let adp_by_key: HashMap<&PlayerKey, Option<&AdpValue>> =
        adp.rows.iter().map(|r| (&r.key, r.adp.as_ref())).collect();

    let mut keys: Vec<(PlayerKey, Option<AdpValue>)> = order
        .iter()
        .map(|key| {
            let value = adp_by_key.get(key).copied().flatten().cloned();
            (key.clone(), value)
        })
        .collect();

    let missing = order.iter().filter(|k| !adp_by_key.contains_key(k)).count();

    let ranked: HashSet<&PlayerKey> = order.iter().collect();
    let unranked: Vec<_> = adp
        .rows
        .iter()
        .filter(|r| !ranked.contains(&r.key))
        .collect();

    match policy {
        UnrankedPolicy::Append => {
            keys.extend(unranked.iter().map(|r| (r.key.clone(), r.adp.clone())));
        }
        UnrankedPolicy::Drop => {}
    }

    info!(
        "merged custom order: {} ranked ({} without fresh ADP), {} unranked {}",
        order.len(),
        missing,
        unranked.len(),
        match policy {
            UnrankedPolicy::Append => "appended",
            UnrankedPolicy::Drop => "dropped",
        }
    );

    RankingTable::new(
        keys.into_iter()
            .zip(1u32..)
            .map(|((key, value), rank)| PlayerRecord::new(key, value, rank))
            .collect(),
    )
}
