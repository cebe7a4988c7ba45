use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use ch_xbrl_pipeline::{run, CsvSink, LocalDirectorySource, PipelineConfig};

/// Extracts XBRL facts from a directory of Companies House bulk accounts
/// filings into a single CSV file.
#[derive(Parser, Debug)]
#[command(name = "ch-xbrl-extract", version, about)]
struct Cli {
    /// Directory containing .html/.xml filing files. Overrides CH_XBRL_INPUT_DIR.
    #[arg(long)]
    input_dir: Option<String>,

    /// Output CSV path. Overrides CH_XBRL_OUTPUT_CSV.
    #[arg(long)]
    output_csv: Option<String>,

    /// Max filings processed concurrently. Overrides CH_XBRL_CONCURRENCY.
    #[arg(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = PipelineConfig::load().unwrap_or(PipelineConfig {
        input_dir: String::new(),
        output_csv: String::new(),
        concurrency: 8,
    });

    if let Some(input_dir) = cli.input_dir {
        config.input_dir = input_dir;
    }
    if let Some(output_csv) = cli.output_csv {
        config.output_csv = output_csv;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }

    anyhow::ensure!(!config.input_dir.is_empty(), "no input directory given (--input-dir or CH_XBRL_INPUT_DIR)");
    anyhow::ensure!(!config.output_csv.is_empty(), "no output CSV path given (--output-csv or CH_XBRL_OUTPUT_CSV)");

    info!(input_dir = %config.input_dir, output_csv = %config.output_csv, concurrency = config.concurrency, "starting extraction run");

    let source = Arc::new(LocalDirectorySource::new(config.input_dir.clone()));
    let sink = Arc::new(CsvSink::create(std::path::Path::new(&config.output_csv))?);

    let summary = run(source, sink, config.concurrency).await?;

    info!(
        filings_seen = summary.filings_seen,
        filings_ok = summary.filings_ok,
        filings_failed = summary.filings_failed,
        rows_written = summary.rows_written,
        "extraction run complete"
    );

    Ok(())
}
