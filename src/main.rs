mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use pdf_slurp::commands::{self, Request};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout may carry PNG bytes, so logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let request = Request::from_options(&cli.options())?;

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    commands::run(&cli.pdf_path, &request, &mut stdout.lock(), &mut stderr.lock())
        .with_context(|| format!("Failed to process {}", cli.pdf_path.display()))?;

    Ok(())
}
