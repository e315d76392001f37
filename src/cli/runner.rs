//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, SearchArgs};
use crate::config::{token_from_env, SearchJob};
use crate::engine::{RetrievalOutcome, Retriever, RetrieverConfig};
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, SearchClient};
use crate::output::{CsvConverter, JsonlWriter};
use crate::query::Bound;
use crate::snowflake::snowflake_to_datetime;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Search(args) => self.search(args).await,
            Commands::ToCsv {
                input,
                output,
                header,
            } => self.to_csv(input, output, *header),
            Commands::Snowflake { value } => {
                println!("{}", convert_snowflake(value)?);
                Ok(())
            }
        }
    }

    /// Retrieve every result of a search into the archive
    async fn search(&self, args: &SearchArgs) -> Result<()> {
        let job = match &args.job {
            Some(path) => SearchJob::from_path(path)?,
            None => SearchJob::default(),
        }
        .merge(args.to_job());

        let token = token_from_env()?;
        let mut query = job.query_builder()?.build(&job.resolve_api_base())?;
        let client = SearchClient::new(client_config(&job, token)?)?;
        let output = job.output_path();

        info!(
            "Searching guild {} into {}",
            query.guild_id(),
            output.display()
        );

        let config =
            RetrieverConfig::new().with_dedupe_boundary(job.dedupe_boundary.unwrap_or(false));
        let mut retriever = Retriever::new(client, JsonlWriter::new(&output)).with_config(config);

        let report = retriever.retrieve_all(&mut query, interrupt_signal()).await;

        println!("Total requests made: {}", report.stats.requests);
        if self.cli.verbose {
            println!(
                "Messages written: {}, cursor advances: {}, rate limits: {}, errors: {}, took {}ms",
                report.stats.messages_written,
                report.stats.cursor_advances,
                report.stats.rate_limits,
                report.stats.errors,
                report.stats.duration_ms
            );
        }

        match report.outcome {
            RetrievalOutcome::Failed(e) => Err(e),
            RetrievalOutcome::Completed | RetrievalOutcome::Interrupted => Ok(()),
        }
    }

    /// Convert an archive to CSV
    fn to_csv(&self, input: &Path, output: &Path, header: bool) -> Result<()> {
        let rows = CsvConverter::new()
            .with_header(header)
            .convert_file(input, output)?;
        println!("Wrote {rows} rows to {}", output.display());
        Ok(())
    }
}

/// Build the client config for a job
pub fn client_config(job: &SearchJob, token: String) -> Result<HttpClientConfig> {
    let mut builder = HttpClientConfig::builder()
        .token(token)
        .max_rate_limit_retries(job.max_rate_limit_retries);

    if let Some(max_errors) = job.max_errors {
        if max_errors == 0 {
            return Err(Error::invalid_value("max_errors", "must be at least 1"));
        }
        builder = builder.max_errors(max_errors);
    }

    if let Some(secs) = job.error_delay_secs {
        let delay = Duration::try_from_secs_f64(secs)
            .map_err(|e| Error::invalid_value("error_delay", e.to_string()))?;
        builder = builder.error_delay(delay);
    }

    Ok(builder.build())
}

/// Render a snowflake/timestamp conversion for display
pub fn convert_snowflake(value: &str) -> Result<String> {
    match value.parse::<Bound>()? {
        Bound::Id(id) => {
            let at = snowflake_to_datetime(id)?;
            Ok(format!("{id} -> {}", at.to_rfc3339()))
        }
        Bound::Time(at) => {
            let id = Bound::Time(at).to_snowflake()?;
            Ok(format!("{} -> {id}", at.to_rfc3339()))
        }
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for interrupts: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_from_job() {
        let job = SearchJob {
            max_errors: Some(2),
            error_delay_secs: Some(0.5),
            max_rate_limit_retries: Some(7),
            ..Default::default()
        };
        let config = client_config(&job, "tok".to_string()).unwrap();
        assert_eq!(config.token, "tok");
        assert_eq!(config.max_errors, 2);
        assert_eq!(config.error_delay, Duration::from_millis(500));
        assert_eq!(config.max_rate_limit_retries, Some(7));
    }

    #[test]
    fn test_client_config_defaults() {
        let config = client_config(&SearchJob::default(), "tok".to_string()).unwrap();
        assert_eq!(config.max_errors, 5);
        assert_eq!(config.error_delay, Duration::from_secs(5));
        assert!(config.max_rate_limit_retries.is_none());
    }

    #[test]
    fn test_client_config_rejects_bad_values() {
        let job = SearchJob {
            error_delay_secs: Some(-1.0),
            ..Default::default()
        };
        assert!(client_config(&job, "t".to_string()).unwrap_err().is_config());

        let job = SearchJob {
            max_errors: Some(0),
            ..Default::default()
        };
        assert!(client_config(&job, "t".to_string()).unwrap_err().is_config());
    }

    #[test]
    fn test_convert_snowflake() {
        assert_eq!(
            convert_snowflake("2022-06-01").unwrap(),
            "2022-06-01T00:00:00+00:00 -> 981346340044800000"
        );
        assert_eq!(
            convert_snowflake("981346340044800000").unwrap(),
            "981346340044800000 -> 2022-06-01T00:00:00+00:00"
        );
        assert!(convert_snowflake("soon").is_err());
    }
}
