//! CLI command for listing the variables of a table

use clap::Args;
use tracing::info;

use super::{connect, with_deadline, Cli, CliError};
use crate::client::ClientConfig;
use crate::table::TablePath;
use crate::Variable;

/// Variables subcommand
#[derive(Debug, Args)]
pub struct VariablesCommand {
    /// Table path, e.g. BE/BE0101/BE0101A/BefolkningNy
    pub table: TablePath,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub format: ListFormat,

    /// Skip walking the endpoint hierarchy before fetching metadata
    #[arg(long, default_value_t = false)]
    pub no_validate: bool,

    /// Overall deadline in seconds (0 disables)
    #[arg(long, default_value_t = 0)]
    pub timeout_secs: u64,
}

/// Output format for the variables listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ListFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

impl VariablesCommand {
    /// Execute the variables command
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        with_deadline(self.timeout_secs, self.run(cli)).await
    }

    async fn run(&self, cli: &Cli) -> Result<(), CliError> {
        let config = ClientConfig::default().with_base_url(cli.base_url.clone());
        let client = connect(self.table.clone(), config, !self.no_validate).await?;
        let variables = client.variables().await?;
        info!(table = %self.table, count = variables.len(), "Fetched table variables");

        match self.format {
            ListFormat::Json => println!("{}", serde_json::to_string_pretty(variables)?),
            ListFormat::Human => print!("{}", render_human(variables)),
        }
        Ok(())
    }
}

/// One block per variable: header line, then `value  text` pairs
fn render_human(variables: &[Variable]) -> String {
    let mut out = String::new();
    for var in variables {
        let mut flags = Vec::new();
        if var.is_time {
            flags.push("time");
        }
        if var.is_elimination {
            flags.push("eliminable");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };

        out.push_str(&format!(
            "{} - {} ({} values){}\n",
            var.code,
            var.text,
            var.values.len(),
            flags
        ));
        for (i, value) in var.values.iter().enumerate() {
            let text = var.value_texts.get(i).unwrap_or(value);
            out.push_str(&format!("  {value:<12} {text}\n"));
        }
    }
    out
}
