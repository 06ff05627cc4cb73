//! Query command implementation

use clap::Args;
use std::path::PathBuf;
use tracing::info;

use super::{connect, with_deadline, Cli, CliError};
use crate::client::config::{parse_size_limit, DEFAULT_SIZE_LIMIT};
use crate::client::ClientConfig;
use crate::decode::flatten_record_count;
use crate::output::csv::write_results;
use crate::query::{QuerySelection, Selection};
use crate::table::TablePath;
use crate::ResponseFormat;

/// Parse one `--select CODE=v1,v2` argument
fn parse_select(s: &str) -> Result<(String, Selection), String> {
    Selection::parse_assignment(s).map_err(|e| e.to_string())
}

/// Query subcommand
#[derive(Debug, Args)]
pub struct QueryCommand {
    /// Table path, e.g. BE/BE0101/BE0101A/BefolkningNy
    pub table: TablePath,

    /// Selection directive `CODE=v1,v2`; `CODE=*` keeps all values, `CODE=%` merges the variable
    #[arg(long = "select", value_parser = parse_select)]
    pub selections: Vec<(String, Selection)>,

    /// Only the latest N values of the time variable (0 disables)
    #[arg(long, default_value_t = 0)]
    pub time_top: usize,

    /// Response format requested from the server (json or csv)
    #[arg(long, default_value = "json")]
    pub response_format: ResponseFormat,

    /// Client-side cell quota (0 disables)
    #[arg(long, default_value_t = DEFAULT_SIZE_LIMIT, value_parser = parse_size_limit)]
    pub size_limit: u64,

    /// Variable to split oversized queries on
    #[arg(long)]
    pub partition_by: Option<String>,

    /// Give up after this many rate-limited retries per request (unbounded if omitted)
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Print the estimated cell count without fetching data
    #[arg(long, default_value_t = false)]
    pub estimate_only: bool,

    /// Write results to this CSV file instead of printing JSON
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Overall deadline in seconds (0 disables)
    #[arg(long, default_value_t = 0)]
    pub timeout_secs: u64,

    /// Skip walking the endpoint hierarchy before querying
    #[arg(long, default_value_t = false)]
    pub no_validate: bool,
}

impl QueryCommand {
    /// Execute the query command
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        with_deadline(self.timeout_secs, self.run(cli)).await
    }

    /// Selection built from the `--select` arguments; `None` when there are none
    pub fn selection(&self) -> Result<Option<QuerySelection>, CliError> {
        if self.selections.is_empty() {
            return Ok(None);
        }

        let mut selection = QuerySelection::new();
        for (code, directive) in &self.selections {
            if selection.contains(code) {
                return Err(CliError::InvalidArgument(format!(
                    "variable {code} selected more than once"
                )));
            }
            selection.insert(code.clone(), directive.clone());
        }
        Ok(Some(selection))
    }

    fn config(&self, cli: &Cli) -> ClientConfig {
        let config = ClientConfig::default()
            .with_base_url(cli.base_url.clone())
            .with_size_limit(self.size_limit);
        match self.max_retries {
            Some(max) => config.with_max_rate_limit_retries(max),
            None => config,
        }
    }

    async fn run(&self, cli: &Cli) -> Result<(), CliError> {
        let selection = self.selection()?;
        let mut client = connect(self.table.clone(), self.config(cli), !self.no_validate).await?;

        if let Some(code) = &self.partition_by {
            client.set_preferred_partition_variable(code).await?;
        }

        let query = client
            .create_query(selection.as_ref(), self.response_format, self.time_top)
            .await?;
        let cells = client.estimate_cell_count(&query);
        println!("Estimated cells: {cells}");

        if self.estimate_only {
            return Ok(());
        }

        let results = client.execute(&query).await?;
        let records = flatten_record_count(&results);
        info!(
            table = %self.table,
            requests = results.len(),
            records,
            "Query completed"
        );

        match &self.output {
            Some(path) => {
                let rows = write_results(path, &results)?;
                println!("Wrote {rows} rows to {}", path.display());
            }
            None => println!("{}", serde_json::to_string_pretty(&results)?),
        }
        Ok(())
    }
}
