use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use vt_storage::StorageKind;

/// Duration written as `1h`, `30m`, `1d`, `1h15m30s` or plain seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut seen_number = false;

        for c in s.trim().chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
                seen_number = true;
                continue;
            }
            if c.is_whitespace() {
                continue;
            }
            let num: u64 = current_number
                .parse()
                .map_err(|_| format!("Unit {:?} without a number", c))?;
            let unit = match c {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                'd' => 86400,
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            total_seconds += num * unit;
            current_number.clear();
        }

        // Trailing number without unit counts as seconds
        if !current_number.is_empty() {
            total_seconds += current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
        }

        if !seen_number {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be positive".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(name = "vt", author, version, about = "German news ingestion, linking and keyword mining", long_about = None)]
pub struct Cli {
    /// Storage backend
    #[arg(long, value_enum, default_value_t = StorageKind::Sqlite, global = true)]
    pub storage: StorageKind,

    /// SQLite database file (defaults to ./veritas.db)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// JSON file overriding pipeline settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print Prometheus metrics after the command finishes
    #[arg(long, global = true)]
    pub print_metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run one ingestion cycle, optionally repeating
    Scrape {
        /// The source to scrape in format country[/source] (e.g. germany/zeit). If not specified, scrapes all sources.
        #[arg(required = false)]
        source: Option<String>,
        /// Run in periodic mode with the specified interval (e.g. 1h, 30m, 1d, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// List available scrapers
    List,
    /// Mine keywords from recent articles
    Keywords {
        /// Print the stored keywords instead of mining
        #[arg(long)]
        show: bool,
    },
    /// Delete articles older than the retention window
    Cleanup {
        /// Retention window in days (defaults to the configured one)
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..=36_500))]
        days: Option<i64>,
    },
    /// Long running scheduler: ingest periodically, clean up and mine daily
    Run,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration() {
        assert_eq!("1h".parse::<HumanDuration>().unwrap().0, Duration::from_secs(3600));
        assert_eq!("30m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(1800));
        assert_eq!("1h15m30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(4530));
        assert_eq!("2d".parse::<HumanDuration>().unwrap().0, Duration::from_secs(172800));
        assert_eq!("90".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
        assert!("".parse::<HumanDuration>().is_err());
        assert!("h".parse::<HumanDuration>().is_err());
        assert!("5w".parse::<HumanDuration>().is_err());
        assert!("0m".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_parse_scrape_with_source_and_interval() {
        let cli = Cli::try_parse_from(["vt", "--storage", "memory", "scrape", "germany/zeit", "--interval", "15m"]).unwrap();
        assert_eq!(cli.storage, StorageKind::Memory);
        assert_eq!(
            cli.command,
            Commands::Scrape {
                source: Some("germany/zeit".to_string()),
                interval: Some(HumanDuration(Duration::from_secs(900))),
            }
        );
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["vt", "cleanup", "--days", "3", "-v", "--database", "/tmp/x.db"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.storage, StorageKind::Sqlite);
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(cli.command, Commands::Cleanup { days: Some(3) });
    }

    #[test]
    fn test_cleanup_days_is_bounded() {
        assert!(Cli::try_parse_from(["vt", "cleanup", "--days", "-1"]).is_err());
        assert!(Cli::try_parse_from(["vt", "cleanup", "--days", "100000000"]).is_err());
        let cli = Cli::try_parse_from(["vt", "cleanup", "--days", "0"]).unwrap();
        assert_eq!(cli.command, Commands::Cleanup { days: Some(0) });
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
