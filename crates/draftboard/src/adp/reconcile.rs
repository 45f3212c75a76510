// Outer join of the Sleeper and Underdog ADP tables.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use super::source::{AdpSource, PlatformTable};
use crate::player::{AdpValue, Platform, PlayerKey};

/// One reconciled row: identity plus the ADP of the requested platform.
#[derive(Debug, Clone, PartialEq)]
pub struct AdpRow {
    pub key: PlayerKey,
    pub adp: Option<AdpValue>,
}

/// Reconciled ADP table for one platform. Keys are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct AdpTable {
    pub platform: Platform,
    pub rows: Vec<AdpRow>,
}

impl AdpTable {
    pub fn empty(platform: Platform) -> Self {
        AdpTable {
            platform,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, key: &PlayerKey) -> Option<&AdpRow> {
        self.rows.iter().find(|r| &r.key == key)
    }
}

/// Both platforms' values for a key while joining.
struct Joined {
    key: PlayerKey,
    sleeper: Option<AdpValue>,
    underdog: Option<AdpValue>,
}

/// Full outer join of the two platform tables on (player, position),
/// keeping `platform`'s ADP column.
///
/// Rows appear in Sleeper first-seen order, followed by Underdog-only rows
/// in their first-seen order. A player missing from one side keeps the row
/// with that side's ADP missing. If either table lacks its identity columns
/// the result is empty.
pub fn reconcile(
    platform: Platform,
    sleeper: &PlatformTable,
    underdog: &PlatformTable,
) -> AdpTable {
    if !sleeper.has_identity_columns || !underdog.has_identity_columns {
        warn!(
            "cannot reconcile ADP: sleeper available={}, underdog available={}",
            sleeper.has_identity_columns, underdog.has_identity_columns
        );
        return AdpTable::empty(platform);
    }

    let mut joined: Vec<Joined> = Vec::with_capacity(sleeper.rows.len());
    let mut index: HashMap<PlayerKey, usize> = HashMap::new();

    for row in &sleeper.rows {
        if index.contains_key(&row.key) {
            warn!("duplicate Sleeper ADP row for {}, keeping first", row.key);
            continue;
        }
        index.insert(row.key.clone(), joined.len());
        joined.push(Joined {
            key: row.key.clone(),
            sleeper: row.adp.clone(),
            underdog: None,
        });
    }

    let mut seen_underdog: HashSet<&PlayerKey> = HashSet::new();
    for row in &underdog.rows {
        if !seen_underdog.insert(&row.key) {
            warn!("duplicate Underdog ADP row for {}, keeping first", row.key);
            continue;
        }
        match index.get(&row.key) {
            Some(&i) => joined[i].underdog = row.adp.clone(),
            None => {
                index.insert(row.key.clone(), joined.len());
                joined.push(Joined {
                    key: row.key.clone(),
                    sleeper: None,
                    underdog: row.adp.clone(),
                });
            }
        }
    }

    let rows = joined
        .into_iter()
        .map(|j| AdpRow {
            adp: match platform {
                Platform::Sleeper => j.sleeper,
                Platform::Underdog => j.underdog,
            },
            key: j.key,
        })
        .collect();

    AdpTable { platform, rows }
}

/// Fetch both platform tables concurrently and reconcile them for
/// `platform`.
pub async fn fetch_reconciled(source: &dyn AdpSource, platform: Platform) -> AdpTable {
    let (sleeper, underdog) = tokio::join!(
        source.fetch_table(Platform::Sleeper),
        source.fetch_table(Platform::Underdog)
    );
    let table = reconcile(platform, &sleeper, &underdog);
    info!(
        "Reconciled {} ADP: {} sleeper + {} underdog rows -> {} players",
        platform,
        sleeper.rows.len(),
        underdog.rows.len(),
        table.len()
    );
    table
}
