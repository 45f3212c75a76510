// Application state and orchestration.
//
// Wires the ADP source, ranking store, cache, and session store together:
// fetch + reconcile -> merge with the saved order -> annotate -> (cache) ->
// split by the caller's draft session -> filter.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::adp::reconcile::fetch_reconciled;
use crate::adp::source::AdpSource;
use crate::board::{BoardQuery, BoardView};
use crate::cache::AdpCache;
use crate::config::Config;
use crate::draft::session::{SessionId, SessionStore};
use crate::draft::tracker::{self, MarkOutcome};
use crate::metrics;
use crate::player::{Platform, RankingTable};
use crate::ranking::merge::merge;
use crate::ranking::order::CustomOrder;
use crate::ranking::store::{RankingStore, StoreError};

pub struct AppState {
    pub config: Config,
    source: Arc<dyn AdpSource>,
    store: RankingStore,
    cache: AdpCache,
    sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn AdpSource>) -> Self {
        let store = RankingStore::new(&config.rankings.path);
        let ttl_secs = i64::try_from(config.adp.cache_ttl_secs)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1000);
        let cache = AdpCache::new(chrono::Duration::seconds(ttl_secs));

        AppState {
            config,
            source,
            store,
            cache,
            sessions: SessionStore::new(),
        }
    }

    pub fn store(&self) -> &RankingStore {
        &self.store
    }

    pub fn default_platform(&self) -> Platform {
        self.config.adp.default_platform
    }

    /// The annotated ranking table for `platform`, served from the cache
    /// while fresh. An empty table means no ADP data was available; empty
    /// results are not cached so the next request retries the fetch.
    pub async fn rankings(&self, platform: Platform) -> RankingTable {
        let now = Utc::now();
        if let Some(table) = self.cache.get(platform, now) {
            debug!("serving {} rankings from cache", platform);
            return table;
        }

        let table = self.build_rankings(platform).await;
        if table.is_empty() {
            warn!("no {} rankings available", platform);
        } else {
            self.cache.insert(platform, table.clone(), now);
        }
        table
    }

    async fn build_rankings(&self, platform: Platform) -> RankingTable {
        let adp = fetch_reconciled(self.source.as_ref(), platform).await;
        let order = self.store.load();
        let merged = merge(&adp, order.as_ref(), self.config.rankings.unranked_policy);
        info!(
            "built {} rankings: {} players ({})",
            platform,
            merged.len(),
            if order.is_some() {
                "custom order"
            } else {
                "ADP order"
            }
        );
        metrics::annotate(&merged)
    }

    /// The filtered board for one session.
    pub async fn board(&self, session_id: &SessionId, query: &BoardQuery) -> BoardView {
        let table = self.rankings(query.platform).await;
        let session = self.sessions.load(session_id);
        BoardView::build(&table, &session.state, query)
    }

    /// Mark the player at custom rank `raw` on `platform`'s board drafted.
    pub async fn mark_drafted(
        &self,
        session_id: &SessionId,
        platform: Platform,
        raw: &str,
    ) -> MarkOutcome {
        let table = self.rankings(platform).await;
        let mut session = self.sessions.load(session_id);
        let outcome = tracker::mark_drafted_input(&mut session.state, &table, raw);
        if matches!(outcome, MarkOutcome::Drafted { .. }) {
            self.sessions.store(session);
        }
        outcome
    }

    /// End the session's draft, returning every player to the board.
    pub fn end_draft(&self, session_id: &SessionId) {
        let mut session = self.sessions.load(session_id);
        tracker::reset(&mut session.state);
        self.sessions.store(session);
    }

    /// Persist a new custom order. Cached boards are dropped since they were
    /// merged against the old order.
    pub fn save_order(&self, order: &CustomOrder) -> Result<(), StoreError> {
        self.store.save(order)?;
        self.cache.invalidate_all();
        Ok(())
    }

    /// Move one player on `platform`'s board and save the resulting order.
    pub async fn move_player(
        &self,
        platform: Platform,
        from_rank: usize,
        to_rank: usize,
    ) -> anyhow::Result<CustomOrder> {
        let table = self.rankings(platform).await;
        let mut order = CustomOrder::from_table(&table);
        order
            .move_entry(from_rank, to_rank)
            .context("cannot move player")?;
        self.save_order(&order)
            .context("failed to save rankings")?;
        info!("moved rank {} to {}", from_rank, to_rank);
        Ok(order)
    }

    /// Drop cached boards so the next request refetches ADP.
    pub fn refresh(&self) {
        self.cache.invalidate_all();
    }
}
