//! CLI commands and argument parsing

use crate::config::SearchJob;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Archive guild message search results
#[derive(Parser, Debug)]
#[command(name = "discord-search-archiver")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Retrieve all messages matching a search
    ///
    /// The credential is read from DISCORD_TOKEN.
    Search(SearchArgs),

    /// Convert a JSON-Lines archive to CSV (AuthorID,AuthorName,Content,DateTime)
    ToCsv {
        /// Archive to read
        input: PathBuf,

        /// CSV file to append to
        output: PathBuf,

        /// Write the column header first
        #[arg(long)]
        header: bool,
    },

    /// Convert a date to a snowflake, or a snowflake to its timestamp
    Snowflake {
        /// Snowflake id, RFC 3339 datetime, or YYYY-MM-DD
        value: String,
    },
}

/// Arguments for `search`
#[derive(Args, Debug, Default, Clone)]
pub struct SearchArgs {
    /// Job file (YAML or JSON); flags override its values
    #[arg(short, long)]
    pub job: Option<PathBuf>,

    /// Guild to search
    #[arg(short, long)]
    pub guild: Option<String>,

    /// Content filter
    #[arg(long)]
    pub content: Option<String>,

    /// Channel filter
    #[arg(long)]
    pub channel: Option<String>,

    /// Only messages after this snowflake or date
    #[arg(long)]
    pub after: Option<String>,

    /// Only messages before this snowflake or date
    #[arg(long)]
    pub before: Option<String>,

    /// Archive file to append to
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// API base URL (default: $DISCORD_API_BASE or https://discord.com/api/v9)
    #[arg(long)]
    pub api_base: Option<String>,

    /// Failures tolerated before aborting
    #[arg(long)]
    pub max_errors: Option<u32>,

    /// Seconds to wait after a failure
    #[arg(long)]
    pub error_delay: Option<f64>,

    /// Give up after this many consecutive rate limits on one page
    #[arg(long)]
    pub max_rate_limit_retries: Option<u32>,

    /// Drop the boundary message repeated after an offset-limit advance
    #[arg(long)]
    pub dedupe_boundary: bool,
}

impl SearchArgs {
    /// Flag values as a job overlay
    pub fn to_job(&self) -> SearchJob {
        SearchJob {
            guild_id: self.guild.clone(),
            content: self.content.clone(),
            channel_id: self.channel.clone(),
            after: self.after.clone(),
            before: self.before.clone(),
            output: self.output.clone(),
            api_base: self.api_base.clone(),
            max_errors: self.max_errors,
            error_delay_secs: self.error_delay,
            max_rate_limit_retries: self.max_rate_limit_retries,
            dedupe_boundary: self.dedupe_boundary.then_some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from([
            "discord-search-archiver",
            "search",
            "--guild",
            "558322816416743459",
            "--content",
            "TowaShrug",
            "--after",
            "2022-06-01",
            "-o",
            "towa.jsonl",
        ])
        .unwrap();

        let Commands::Search(args) = cli.command else {
            panic!("expected search");
        };
        let job = args.to_job();
        assert_eq!(job.guild_id.as_deref(), Some("558322816416743459"));
        assert_eq!(job.content.as_deref(), Some("TowaShrug"));
        assert_eq!(job.after.as_deref(), Some("2022-06-01"));
        assert_eq!(job.output, Some(PathBuf::from("towa.jsonl")));
        assert_eq!(job.dedupe_boundary, None);
    }

    #[test]
    fn test_parse_to_csv() {
        let cli = Cli::try_parse_from([
            "discord-search-archiver",
            "-v",
            "to-csv",
            "in.jsonl",
            "out.csv",
            "--header",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::ToCsv { header: true, .. }));
    }
}
