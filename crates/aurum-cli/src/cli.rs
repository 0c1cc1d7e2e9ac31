//! CLI argument definitions for aurum.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `analyze` | Best buy/sell trade over a date range, with optional return projection |
//! | `prices` | Merged gold price series for a date range |
//! | `plan` | Sub-ranges a query would fetch, without fetching |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--mock` | `false` | Use the offline synthetic source |
//! | `--timeout-ms` | provider policy | Per sub-range fetch budget |
//! | `--max-concurrency` | provider policy | Concurrent sub-range fetches |
//! | `--base-url` | NBP endpoint | Gold price API base URL |
//! | `-v, --verbose` | `false` | Debug logging on stderr |
//!
//! # Examples
//!
//! ```bash
//! aurum analyze --start 2021-01-04 --end 2022-12-30 --amount 1000 --pretty
//! aurum prices --start 2024-01-01 --end 2024-03-31
//! aurum plan --start 2019-01-01 --end 2023-12-31
//! ```

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "aurum",
    author,
    version,
    about = "Gold price best-trade tracker",
    long_about = "Fetches NBP gold prices for a date range of up to five years and reports \
the single most profitable buy/sell pair.\n\
\n\
Use 'aurum <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Serve prices from the deterministic offline source instead of NBP.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Budget for one sub-range fetch in milliseconds, retries included.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Maximum number of sub-range fetches in flight.
    #[arg(long, global = true)]
    pub max_concurrency: Option<usize>,

    /// Gold price API base URL (overrides AURUM_BASE_URL).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log debug events to stderr.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find the most profitable buy/sell pair in a range.
    ///
    /// # Examples
    ///
    ///   aurum analyze --start 2023-01-02 --end 2023-12-29
    ///   aurum analyze --start 2021-01-04 --end 2022-12-30 --amount 2500.50
    Analyze(AnalyzeArgs),

    /// Fetch the merged price series for a range.
    Prices(RangeArgs),

    /// Show the sub-ranges a query would be split into.
    Plan(RangeArgs),
}

/// Inclusive query range.
#[derive(Debug, Clone, Args)]
pub struct RangeArgs {
    /// First day (YYYY-MM-DD).
    #[arg(long)]
    pub start: String,

    /// Last day (YYYY-MM-DD), inclusive.
    #[arg(long)]
    pub end: String,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Amount invested at the buy date; omit or pass 0 to skip return projection.
    #[arg(long)]
    pub amount: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_analyze_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "aurum",
            "analyze",
            "--start",
            "2023-01-02",
            "--end",
            "2023-12-29",
            "--amount",
            "1000",
            "--mock",
            "--pretty",
        ])
        .expect("valid arguments");

        assert!(cli.mock);
        assert!(cli.pretty);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.range.start, "2023-01-02");
                assert_eq!(args.amount.as_deref(), Some("1000"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn range_bounds_are_required() {
        assert!(Cli::try_parse_from(["aurum", "prices", "--start", "2024-01-01"]).is_err());
    }
}
