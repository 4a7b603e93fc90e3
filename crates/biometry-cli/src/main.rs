mod commands;
mod output;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "biometry",
    version,
    about = "Export IOLMaster biometry PDF reports (IOL calculations, MMT-Full) to a spreadsheet"
)]
struct Cli {
    /// Glob pattern matching the PDF reports, e.g. 'reports/*.pdf' (quote it)
    pattern: String,

    /// Spreadsheet to write, one sheet per report title
    #[arg(short, long, default_value = "parsed_results.xlsx")]
    output: PathBuf,

    /// Also write the nested records as JSON
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// JSON extraction options file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keep the reconstructed region lines in MMT records
    #[arg(long)]
    dump_regions: bool,

    /// Log per-file and per-region details
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let result = commands::export::run(
        &cli.pattern,
        &cli.output,
        cli.json.as_deref(),
        cli.config.as_deref(),
        cli.dump_regions,
    );

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
