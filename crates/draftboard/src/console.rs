// Interactive draft console: a line-oriented front end over AppState.
//
// Reads commands from any async line source and writes plain-text boards to
// any async writer, so the loop can be driven from tests with in-memory
// buffers.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::board::{BoardQuery, BoardView, PositionFilter};
use crate::draft::session::SessionId;
use crate::draft::tracker::MarkOutcome;
use crate::metrics::{diff_color, Rgb};
use crate::player::{Platform, PlayerRecord};

pub const HELP: &str = "\
commands:
  board [POS|all] [search...]  show the draft board
  platform <sleeper|underdog>  switch ADP platform
  draft <rank>                 mark the player at <rank> drafted
  move <from> <to>             move a player in your rankings and save
  end                          end the draft (everyone back on the board)
  refresh                      refetch ADP data
  help                         show this help
  quit                         exit
";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Board {
        position: PositionFilter,
        search: String,
    },
    Platform(String),
    Draft(String),
    Move { from: usize, to: usize },
    End,
    Refresh,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub fn parse_command(line: &str) -> Command {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Command::Empty;
    };

    match verb.to_lowercase().as_str() {
        "board" | "b" => {
            let position = words.next().map(PositionFilter::parse).unwrap_or_default();
            let search = words.collect::<Vec<_>>().join(" ");
            Command::Board { position, search }
        }
        "platform" | "p" => match words.next() {
            Some(id) => Command::Platform(id.to_string()),
            None => Command::Invalid("usage: platform <sleeper|underdog>".into()),
        },
        "draft" | "d" => Command::Draft(words.next().unwrap_or("").to_string()),
        "move" | "m" => {
            let ranks: Vec<Option<usize>> = words.map(|w| w.parse().ok()).collect();
            match ranks.as_slice() {
                [Some(from), Some(to)] => Command::Move {
                    from: *from,
                    to: *to,
                },
                _ => Command::Invalid("usage: move <from> <to>".into()),
            }
        }
        "end" => Command::End,
        "refresh" => Command::Refresh,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => Command::Invalid(format!("unknown command '{other}' (try 'help')")),
    }
}

/// Console session state.
pub struct Console<'a> {
    app: &'a AppState,
    session: SessionId,
    platform: Platform,
    color: bool,
}

impl<'a> Console<'a> {
    pub fn new(app: &'a AppState, session: SessionId) -> Self {
        Console {
            app,
            session,
            platform: app.default_platform(),
            color: false,
        }
    }

    /// Shade the Diff column with ANSI background colors.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Execute one command, returning the text to show. `None` means quit.
    pub async fn execute(&mut self, command: Command) -> Option<String> {
        debug!("console command: {:?}", command);
        let out = match command {
            Command::Quit => return None,
            Command::Empty => String::new(),
            Command::Help => HELP.to_string(),
            Command::Invalid(message) => format!("{message}\n"),
            Command::Board { position, search } => {
                let query = BoardQuery::new(self.platform)
                    .with_position(position)
                    .with_search(&search);
                let view = self.app.board(&self.session, &query).await;
                render_board(
                    &view,
                    self.app.config.display.board_limit,
                    self.app.config.display.diff_clamp,
                    self.color,
                )
            }
            Command::Platform(id) => match Platform::from_id(&id) {
                Some(platform) => {
                    self.platform = platform;
                    format!("using {} ADP\n", platform)
                }
                None => format!("unknown platform '{id}' (sleeper or underdog)\n"),
            },
            Command::Draft(raw) => {
                let outcome = self.app.mark_drafted(&self.session, self.platform, &raw).await;
                match outcome {
                    MarkOutcome::Drafted { pick } => format!("pick {pick} recorded\n"),
                    MarkOutcome::AlreadyDrafted { pick } => {
                        format!("already drafted at pick {pick}\n")
                    }
                    MarkOutcome::Ignored => format!("no player at rank '{}'\n", raw.trim()),
                }
            }
            Command::Move { from, to } => {
                match self.app.move_player(self.platform, from, to).await {
                    Ok(_) => format!("moved rank {from} to {to}\n"),
                    Err(e) => format!("{e:#}\n"),
                }
            }
            Command::End => {
                self.app.end_draft(&self.session);
                "draft ended; all players are available again\n".to_string()
            }
            Command::Refresh => {
                self.app.refresh();
                "ADP will be refetched on the next board\n".to_string()
            }
        };
        Some(out)
    }

    /// Read commands line by line until `quit` or end of input.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("console started on {} ADP", self.platform);
        let mut lines = input.lines();
        output.write_all(b"draftboard ready; type 'help' for commands\n").await?;
        output.flush().await?;

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                // The bad bytes are consumed, so reading resumes at the next line.
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    warn!("skipping unreadable console line: {}", e);
                    output.write_all(b"could not read that line (not UTF-8)\n").await?;
                    output.flush().await?;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            match self.execute(parse_command(&line)).await {
                Some(text) => {
                    output.write_all(text.as_bytes()).await?;
                    output.flush().await?;
                }
                None => break,
            }
        }

        info!("console stopped");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render a board as two plain-text tables: available players (up to
/// `limit`) and drafted players, newest first.
pub fn render_board(view: &BoardView, limit: usize, diff_clamp: f64, color: bool) -> String {
    let mut out = String::new();

    if view.is_unavailable() {
        out.push_str(&format!(
            "No {} ADP data available. Check your connection or try 'refresh'.\n",
            view.platform
        ));
        return out;
    }

    out.push_str(&format!(
        "Draft Board ({} ADP): {} available, {} drafted\n",
        view.platform,
        view.available.len(),
        view.drafted.len()
    ));
    out.push_str(&header("Rank"));
    for record in view.available.iter().take(limit) {
        out.push_str(&row(&record.rank.to_string(), record, diff_clamp, color));
    }
    if view.available.len() > limit {
        out.push_str(&format!("  ... {} more\n", view.available.len() - limit));
    }

    if !view.drafted.is_empty() {
        out.push_str("\nPlayers Drafted\n");
        out.push_str(&header("Pick"));
        for drafted in &view.drafted {
            out.push_str(&row(
                &drafted.pick.to_string(),
                &drafted.record,
                diff_clamp,
                color,
            ));
        }
    }
    out
}

fn header(first: &str) -> String {
    format!(
        "{:>5}  {:<36} {:<4} {:<6} {:>7} {:>7}\n",
        first, "Player Team (Bye)", "POS", "Rank", "ADP", "Diff"
    )
}

fn row(first: &str, record: &PlayerRecord, diff_clamp: f64, color: bool) -> String {
    let pos_rank = record
        .position_rank
        .as_ref()
        .map(|p| p.to_string())
        .unwrap_or_default();
    let adp = record.adp.as_ref().map(|a| a.as_str()).unwrap_or("");
    let diff = format!(
        "{:>7}",
        record.diff.map(format_diff).unwrap_or_default()
    );
    let diff = match diff_color(record.diff, diff_clamp) {
        rgb if color && rgb != Rgb::NEUTRAL => shade(&diff, rgb),
        _ => diff,
    };

    format!(
        "{:>5}  {:<36} {:<4} {:<6} {:>7} {}\n",
        first, record.key.player, record.key.position, pos_rank, adp, diff
    )
}

fn format_diff(diff: f64) -> String {
    if diff.fract() == 0.0 {
        format!("{diff:+.0}")
    } else {
        format!("{diff:+.1}")
    }
}

fn shade(text: &str, rgb: Rgb) -> String {
    format!(
        "\x1b[48;2;{};{};{}m\x1b[30m{}\x1b[0m",
        rgb.r, rgb.g, rgb.b, text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::tracker::DraftedPlayer;
    use crate::player::{AdpValue, PlayerKey, PositionRank};

    fn record(name: &str, pos: &str, rank: u32, pos_rank: u32, adp: &str) -> PlayerRecord {
        let adp = AdpValue::new(adp);
        let diff = crate::metrics::differential(rank, adp.as_ref());
        PlayerRecord {
            key: PlayerKey::new(name, pos),
            adp,
            rank,
            position_rank: Some(PositionRank {
                position: pos.to_string(),
                rank: pos_rank,
            }),
            diff,
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_command("board WR lamb dal"),
            Command::Board {
                position: PositionFilter::Exact("WR".into()),
                search: "lamb dal".into()
            }
        );
        assert_eq!(
            parse_command("b qb"),
            Command::Board {
                position: PositionFilter::Exact("QB".into()),
                search: String::new()
            }
        );
        assert_eq!(
            parse_command("board"),
            Command::Board {
                position: PositionFilter::All,
                search: String::new()
            }
        );
        assert_eq!(parse_command("  d 12 "), Command::Draft("12".into()));
        assert_eq!(parse_command("draft"), Command::Draft(String::new()));
        assert_eq!(parse_command("move 3 1"), Command::Move { from: 3, to: 1 });
        assert_eq!(parse_command("QUIT"), Command::Quit);
        assert_eq!(parse_command(""), Command::Empty);
        assert!(matches!(parse_command("move x 1"), Command::Invalid(_)));
        assert!(matches!(parse_command("platform"), Command::Invalid(_)));
        assert!(matches!(parse_command("fly"), Command::Invalid(_)));
    }

    #[tokio::test]
    async fn invalid_utf8_line_is_skipped() {
        use crate::adp::source::{AdpSource, PlatformTable};
        use crate::config::parse_config;
        use std::sync::Arc;

        struct NoData;

        #[async_trait::async_trait]
        impl AdpSource for NoData {
            async fn fetch_table(&self, _platform: Platform) -> PlatformTable {
                PlatformTable::empty()
            }
        }

        let config = parse_config(
            r#"
[adp]
sleeper_url = "http://localhost/a"
underdog_url = "http://localhost/b"
request_timeout_secs = 5
cache_ttl_secs = 60

[rankings]
path = "draftboard_console_unused.csv"

[display]
board_limit = 10
"#,
        )
        .unwrap();
        let app = AppState::new(config, Arc::new(NoData));
        let input: &[u8] = b"help\n\xff\xfe board\nplatform underdog\nquit\n";
        let mut output = Vec::new();

        let mut console = Console::new(&app, SessionId::new("utf8"));
        console.run(input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("commands:"));
        assert!(text.contains("could not read that line"));
        assert!(text.contains("using Underdog ADP"));
        assert_eq!(console.platform(), Platform::Underdog);
    }

    #[test]
    fn diff_formatting() {
        assert_eq!(format_diff(-2.5), "-2.5");
        assert_eq!(format_diff(3.0), "+3");
        assert_eq!(format_diff(0.0), "+0");
    }

    #[test]
    fn renders_available_and_drafted() {
        let view = BoardView {
            platform: Platform::Sleeper,
            available: vec![
                record("Bijan Robinson ATL (5)", "RB", 2, 1, "2.4"),
                record("CeeDee Lamb DAL (10)", "WR", 3, 2, "N/A"),
            ],
            drafted: vec![DraftedPlayer {
                pick: 1,
                record: record("Ja'Marr Chase CIN (10)", "WR", 1, 1, "1.1"),
            }],
            total_players: 3,
        };
        let text = render_board(&view, 10, 15.0, false);
        assert!(text.starts_with("Draft Board (Sleeper ADP): 2 available, 1 drafted\n"));
        assert!(text.contains("Bijan Robinson ATL (5)"));
        assert!(text.contains("RB1"));
        assert!(text.contains("-0.4"));
        assert!(text.contains("Players Drafted"));
        assert!(!text.contains("\x1b["));
    }

    #[test]
    fn render_respects_limit() {
        let view = BoardView {
            platform: Platform::Underdog,
            available: (1..=5)
                .map(|i| record(&format!("P{i}"), "QB", i, i, ""))
                .collect(),
            drafted: vec![],
            total_players: 5,
        };
        let text = render_board(&view, 2, 15.0, false);
        assert!(text.contains("P2"));
        assert!(!text.contains("P3"));
        assert!(text.contains("... 3 more"));
        assert!(!text.contains("Players Drafted"));
    }

    #[test]
    fn render_shades_non_neutral_diffs() {
        let view = BoardView {
            platform: Platform::Sleeper,
            available: vec![record("Reach WR (1)", "WR", 1, 1, "20")],
            drafted: vec![],
            total_players: 1,
        };
        let text = render_board(&view, 10, 15.0, true);
        assert!(text.contains("\x1b[48;2;100;255;100m"));
    }

    #[test]
    fn render_unavailable_board() {
        let view = BoardView {
            platform: Platform::Underdog,
            available: vec![],
            drafted: vec![],
            total_players: 0,
        };
        assert!(render_board(&view, 10, 15.0, false).starts_with("No Underdog ADP data"));
    }
}
