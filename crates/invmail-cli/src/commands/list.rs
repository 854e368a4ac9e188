//! List command - show stored invoices.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use invmail_core::InvoiceStore;

use super::process::{format_records, OutputFormat};
use super::{load_config, open_store};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: ListArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let invoices = store.list().await?;
    info!("Fetched {} invoices", invoices.len());

    let output = format_records(&invoices, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} {} invoices written to {}",
            style("✓").green(),
            invoices.len(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}
