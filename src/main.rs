use anyhow::Result;
use clap::Parser;
use flowcrab::{analyzer, logging, parser, report};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Reconstruct TCP/UDP flows, traffic totals, and connection chains from a
/// packet capture.
#[derive(Parser)]
#[command(name = "flowcrab", version)]
struct Cli {
    /// PCAPNG capture file to analyze
    capture: PathBuf,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let _guard = logging::init_logging(cli.log_file.as_deref(), level)?;

    let packets = parser::parse_capture(&cli.capture)?;
    let analysis = analyzer::analyze(packets);
    print!("{}", report::render(&analysis));

    Ok(())
}
