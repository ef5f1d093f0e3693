//! Stenosis Feature Extraction - Batch Entry Point

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use stenosis_batch::{init_logging, load_cases, BatchConfig, BatchRunner, FeatureTable};
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "stenosis-batch",
    version,
    about = "Stenosis features from IVUS pullback area signals"
)]
struct Cli {
    #[arg(long, help = "JSON case file")]
    input: Option<PathBuf>,

    #[arg(long, help = "CSV feature table to write")]
    output: Option<PathBuf>,

    #[arg(long, help = "Configuration file (TOML or JSON)")]
    config: Option<PathBuf>,

    #[arg(long, help = "Number of threads (0 = auto)")]
    threads: Option<usize>,

    #[arg(long, default_value_t = false, help = "Print the feature names and exit")]
    list_features: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = BatchConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }

    if cli.list_features {
        let runner = BatchRunner::new(&config);
        for name in runner.catalog().names() {
            println!("{name}");
        }
        return Ok(());
    }

    init_logging(&config.log_level, config.log_json)?;
    info!("=== Stenosis Batch v{} ===", env!("CARGO_PKG_VERSION"));

    let (Some(input), Some(output)) = (cli.input, cli.output) else {
        bail!("--input and --output are required unless --list-features is given");
    };

    let cases = load_cases(&input).with_context(|| format!("reading {}", input.display()))?;
    let runner = BatchRunner::new(&config);
    let report = runner.run(&cases)?;

    let mut table = FeatureTable::create(&output, runner.catalog())
        .with_context(|| format!("creating {}", output.display()))?;
    for row in &report.rows {
        table.write_row(row)?;
    }
    let rows = table.rows();
    table.finish()?;

    info!(
        "Wrote {} rows to {} ({} cases rejected)",
        rows,
        output.display(),
        report.rejected.len()
    );
    Ok(())
}
