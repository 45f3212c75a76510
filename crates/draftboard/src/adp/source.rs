// ADP source adapter: fetches the FantasyPros ADP pages and normalizes them
// into per-platform tables.
//
// Every failure mode (transport error, non-success status, missing table)
// collapses into an empty table here so callers never see fetch errors.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::config::AdpConfig;
use crate::player::{AdpValue, Platform, PlayerKey, PLAYER_COLUMN, POSITION_COLUMN};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One normalized row from a platform page.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub key: PlayerKey,
    /// Value of the platform's ADP column, `None` when the column is absent
    /// or the cell is blank.
    pub adp: Option<AdpValue>,
}

/// A platform's ADP table. `has_identity_columns` is false when the page
/// could not be fetched or did not carry both identity columns, which the
/// reconciler treats as "data unavailable".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformTable {
    pub has_identity_columns: bool,
    pub rows: Vec<SourceRow>,
}

impl PlatformTable {
    /// The "source unavailable" table.
    pub fn empty() -> Self {
        PlatformTable::default()
    }

    pub fn with_rows(rows: Vec<SourceRow>) -> Self {
        PlatformTable {
            has_identity_columns: true,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Anything that can produce a platform's ADP table.
#[async_trait]
pub trait AdpSource: Send + Sync {
    /// Fetch the table for `platform`. Implementations must not fail: any
    /// problem is reported as [`PlatformTable::empty`].
    async fn fetch_table(&self, platform: Platform) -> PlatformTable;
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

// ---------------------------------------------------------------------------
// FantasyPros adapter
// ---------------------------------------------------------------------------

/// Scrapes the FantasyPros ADP pages (Sleeper from the overall page,
/// Underdog from the best-ball page).
pub struct FantasyProsSource {
    client: Client,
    sleeper_url: String,
    underdog_url: String,
}

impl FantasyProsSource {
    pub fn new(
        sleeper_url: impl Into<String>,
        underdog_url: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("draftboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            sleeper_url: sleeper_url.into(),
            underdog_url: underdog_url.into(),
        })
    }

    pub fn from_config(config: &AdpConfig) -> anyhow::Result<Self> {
        Self::new(
            config.sleeper_url.clone(),
            config.underdog_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn url_for(&self, platform: Platform) -> &str {
        match platform {
            Platform::Sleeper => &self.sleeper_url,
            Platform::Underdog => &self.underdog_url,
        }
    }

    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Http {
                url: url.to_string(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        response.text().await.map_err(|e| FetchError::Http {
            url: url.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl AdpSource for FantasyProsSource {
    async fn fetch_table(&self, platform: Platform) -> PlatformTable {
        let url = self.url_for(platform);
        debug!("Fetching {} ADP from {}", platform, url);

        match self.fetch_html(url).await {
            Ok(html) => {
                let table = parse_adp_table(&html, platform);
                info!(
                    "Parsed {} {} ADP rows ({} bytes of HTML)",
                    table.rows.len(),
                    platform,
                    html.len()
                );
                table
            }
            Err(e) => {
                warn!("{} ADP unavailable: {}", platform, e);
                PlatformTable::empty()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// HTML parsing
// ---------------------------------------------------------------------------

/// Parse a FantasyPros ADP page.
///
/// Reads `<table id="data">`, takes column names from `thead th`, and keeps
/// the two identity columns plus `platform`'s ADP column. Digits are
/// stripped from positions ("WR12" -> "WR").
pub fn parse_adp_table(html: &str, platform: Platform) -> PlatformTable {
    let (Some(table_sel), Some(header_sel), Some(row_sel), Some(cell_sel)) = (
        selector("table#data"),
        selector("thead th"),
        selector("tbody tr"),
        selector("td"),
    ) else {
        return PlatformTable::empty();
    };

    let document = Html::parse_document(html);
    let Some(table) = document.select(&table_sel).next() else {
        warn!("{} page has no ADP table", platform);
        return PlatformTable::empty();
    };

    let headers: Vec<String> = table.select(&header_sel).map(cell_text).collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let (Some(player_idx), Some(pos_idx)) = (column(PLAYER_COLUMN), column(POSITION_COLUMN))
    else {
        warn!(
            "{} ADP table is missing identity columns (headers: {:?})",
            platform, headers
        );
        return PlatformTable::empty();
    };
    let adp_idx = column(platform.adp_column());
    if adp_idx.is_none() {
        warn!(
            "{} ADP table has no '{}' column; ADP will be missing",
            platform,
            platform.adp_column()
        );
    }

    let mut rows = Vec::new();
    for (row_index, tr) in table.select(&row_sel).enumerate() {
        let cells: Vec<String> = tr.select(&cell_sel).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }

        let (Some(player), Some(pos)) = (cells.get(player_idx), cells.get(pos_idx)) else {
            debug!("skipping short {} row {}", platform, row_index);
            continue;
        };

        rows.push(SourceRow {
            key: PlayerKey::new(player.clone(), strip_digits(pos)),
            adp: adp_idx
                .and_then(|i| cells.get(i))
                .and_then(|raw| AdpValue::new(raw.as_str())),
        });
    }

    PlatformTable::with_rows(rows)
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            warn!("invalid selector '{}': {}", css, e);
            None
        }
    }
}

fn cell_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Remove positional-rank digits from a position cell.
pub fn strip_digits(pos: &str) -> String {
    pos.chars().filter(|c| !c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(headers: &[&str], rows: &[Vec<&str>]) -> String {
        let mut html = String::from("<html><body><table id=\"data\"><thead><tr>");
        for h in headers {
            html.push_str(&format!("<th>{h}</th>"));
        }
        html.push_str("</tr></thead><tbody>");
        for row in rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<td>{cell}</td>"));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table></body></html>");
        html
    }

    #[test]
    fn strip_digits_removes_position_rank() {
        assert_eq!(strip_digits("WR12"), "WR");
        assert_eq!(strip_digits("DST1"), "DST");
        assert_eq!(strip_digits("QB"), "QB");
    }

    #[test]
    fn parses_platform_column() {
        let html = page(
            &["Rank", "Player Team (Bye)", "POS", "Sleeper", "AVG"],
            &[
                vec!["1", "Ja'Marr Chase CIN (10)", "WR1", "1.2", "1.1"],
                vec!["2", "Bijan Robinson ATL (5)", "RB1", "2.4", "2.5"],
            ],
        );
        let table = parse_adp_table(&html, Platform::Sleeper);
        assert!(table.has_identity_columns);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].key, PlayerKey::new("Ja'Marr Chase CIN (10)", "WR"));
        assert_eq!(table.rows[0].adp.as_ref().unwrap().as_str(), "1.2");
        assert_eq!(table.rows[1].key.position, "RB");
    }

    #[test]
    fn missing_adp_column_keeps_rows() {
        let html = page(
            &["Player Team (Bye)", "POS", "Sleeper"],
            &[vec!["Saquon Barkley PHI (9)", "RB3", "4.0"]],
        );
        let table = parse_adp_table(&html, Platform::Underdog);
        assert!(table.has_identity_columns);
        assert_eq!(table.rows.len(), 1);
        assert!(table.rows[0].adp.is_none());
    }

    #[test]
    fn missing_identity_column_is_unavailable() {
        let html = page(&["Player", "Sleeper"], &[vec!["Someone", "1.0"]]);
        let table = parse_adp_table(&html, Platform::Sleeper);
        assert!(!table.has_identity_columns);
        assert!(table.is_empty());
    }

    #[test]
    fn page_without_table_is_unavailable() {
        let table =
            parse_adp_table("<html><body><p>maintenance</p></body></html>", Platform::Sleeper);
        assert_eq!(table, PlatformTable::empty());
    }

    #[test]
    fn empty_and_short_rows_are_skipped() {
        let html = page(
            &["Player Team (Bye)", "POS", "Underdog"],
            &[vec![], vec!["Lonely Cell"], vec!["Puka Nacua LAR (8)", "WR4", ""]],
        );
        let table = parse_adp_table(&html, Platform::Underdog);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].key.player, "Puka Nacua LAR (8)");
        assert!(table.rows[0].adp.is_none());
    }

    #[tokio::test]
    async fn unreachable_host_degrades_to_empty() {
        let source = FantasyProsSource::new(
            "http://127.0.0.1:9/overall.php",
            "http://127.0.0.1:9/best-ball-overall.php",
            Duration::from_millis(500),
        )
        .unwrap();
        let table = source.fetch_table(Platform::Sleeper).await;
        assert_eq!(table, PlatformTable::empty());
    }
}
