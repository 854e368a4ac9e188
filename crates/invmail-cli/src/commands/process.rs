//! Process command - extract invoice data from a single email file.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{build_pipeline, load_config, open_store, read_document};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (.txt, .eml or .msg)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Save the extracted invoice to the store
    #[arg(long)]
    save: bool,

    /// Skip the remote model and use text rules only
    #[arg(long)]
    offline: bool,

    /// Sender address to use when none is found in the email
    #[arg(long)]
    sender: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Field order for text output.
const TEXT_FIELDS: &[(&str, &str)] = &[
    ("vendor", "Vendor"),
    ("total", "Total"),
    ("currency", "Currency"),
    ("invoice_date", "Date"),
    ("sender_email", "Sender"),
    ("created_at", "Saved at"),
];

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let document = read_document(&args.input, args.sender.as_deref())?;
    info!("Processing file: {}", args.input.display());

    let pipeline = build_pipeline(&config, args.offline);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Extracting invoice data...");

    let output = if args.save {
        let store = open_store(&config)?;
        pb.set_message("Extracting and saving invoice...");
        let stored = pipeline.process_and_save(&document, &store).await?;
        format_record(&stored, args.format)?
    } else {
        let record = pipeline.process(&document).await;
        format_record(&record, args.format)?
    };

    pb.finish_and_clear();

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.save {
        eprintln!("{} Invoice saved", style("✓").green());
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Render one record.
pub fn format_record<T: Serialize>(record: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
        OutputFormat::Csv => format_csv(std::slice::from_ref(record)),
        OutputFormat::Text => format_text(record),
    }
}

/// Render several records.
pub fn format_records<T: Serialize>(records: &[T], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(records)?),
        OutputFormat::Csv => format_csv(records),
        OutputFormat::Text => {
            let blocks = records
                .iter()
                .map(format_text)
                .collect::<anyhow::Result<Vec<_>>>()?;
            Ok(blocks.join("\n"))
        }
    }
}

fn format_csv<T: Serialize>(records: &[T]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    for record in records {
        wtr.serialize(record)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text<T: Serialize>(record: &T) -> anyhow::Result<String> {
    let value = serde_json::to_value(record)?;
    let mut output = String::new();

    for (key, label) in TEXT_FIELDS {
        let Some(field) = value.get(key) else {
            continue;
        };
        let shown = match field {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        output.push_str(&format!("{:<10}{}\n", format!("{}:", label), shown));
    }

    Ok(output)
}
