//! `reflex`: inspect the local leaderboard file without opening a window.
//!
//! ```text
//! reflex [--path FILE] [--json] scores [N]
//! reflex [--path FILE] [--json] best
//! reflex [--path FILE] [--json] summary [N]
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use log::debug;
use reflex_core::ScoreRecord;
use reflex_leaderboard::{DEFAULT_TOP_N, JsonFileLeaderboard, LeaderboardStore};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reflex", version, about = "Inspect the local reaction-time leaderboard")]
struct Cli {
    /// Leaderboard file; defaults to scores.json in the platform data dir
    #[arg(long, global = true, env = "REFLEX_LEADERBOARD")]
    path: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// List the fastest scores
    Scores {
        #[arg(default_value_t = DEFAULT_TOP_N)]
        n: usize,
    },
    /// Show the single best score
    Best,
    /// Best, count and average over the fastest scores
    Summary {
        #[arg(default_value_t = DEFAULT_TOP_N)]
        n: usize,
    },
}

fn leaderboard_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| {
            ProjectDirs::from("", "", "reflex").map(|d| d.data_dir().join("scores.json"))
        })
        .unwrap_or_else(|| PathBuf::from("scores.json"))
}

fn format_row(rank: usize, rec: &ScoreRecord) -> String {
    format!(
        "{:>3}. {:>5} ms  {:<24} {}",
        rank,
        rec.score_ms,
        rec.display_name(),
        rec.created_at.format("%Y-%m-%d %H:%M")
    )
}

fn main() -> Result<()> {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .try_init();

    let cli = Cli::parse();
    let board = JsonFileLeaderboard::open(leaderboard_path(cli.path));
    debug!("Reading {:?}", board.path());

    match cli.command.unwrap_or(Command::Scores { n: DEFAULT_TOP_N }) {
        Command::Scores { n } => {
            let top = board.top_n(n)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&top)?);
            } else if top.is_empty() {
                println!("No scores yet.");
            } else {
                for (i, rec) in top.iter().enumerate() {
                    println!("{}", format_row(i + 1, rec));
                }
            }
        }
        Command::Best => match board.best()? {
            Some(rec) if cli.json => println!("{}", serde_json::to_string_pretty(&rec)?),
            Some(rec) => println!("{} ms by {}", rec.score_ms, rec.display_name()),
            None => println!("No scores yet."),
        },
        Command::Summary { n } => {
            let s = board.summary(n)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&s)?);
                return Ok(());
            }
            match (s.best_ms, s.average_ms) {
                (Some(best), Some(avg)) => {
                    println!("Best time:    {best} ms");
                    println!("Total scores: {}", s.count);
                    println!("Average:      {avg} ms");
                }
                _ => println!("No scores yet."),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use clap::CommandFactory;
    use reflex_core::NewScore;

    fn parse(list: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("reflex").chain(list.iter().copied()))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_lists_scores() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.command, None);
        assert!(!cli.json);
        let cli = parse(&["scores"]).unwrap();
        assert_eq!(cli.command, Some(Command::Scores { n: DEFAULT_TOP_N }));
    }

    #[test]
    fn parses_flags_and_counts() {
        let cli = parse(&["--path", "/tmp/s.json", "summary", "10", "--json"]).unwrap();
        assert_eq!(cli.command, Some(Command::Summary { n: 10 }));
        assert_eq!(cli.path, Some(PathBuf::from("/tmp/s.json")));
        assert!(cli.json);
        assert_eq!(parse(&["best"]).unwrap().command, Some(Command::Best));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["scores", "many"]).is_err());
        assert!(parse(&["purge"]).is_err());
        assert!(parse(&["--path"]).is_err());
    }

    #[test]
    fn explicit_path_wins() {
        let p = leaderboard_path(Some(PathBuf::from("board.json")));
        assert_eq!(p, PathBuf::from("board.json"));
    }

    #[test]
    fn rows_use_display_name() {
        let rec = ScoreRecord::from_new(
            "1",
            NewScore {
                score_ms: 212,
                player_name: " ".into(),
                player_email: None,
            },
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap(),
        );
        let row = format_row(1, &rec);
        assert!(row.contains("212 ms"));
        assert!(row.contains("Anonymous Player"));
        assert!(row.ends_with("2025-03-01 12:30"));
    }
}
