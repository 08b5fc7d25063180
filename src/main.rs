mod console;
// Only compile the browser when the TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use clap::Parser;
use console::Console;
use library_inventory::{Library, LibraryConfig, DEFAULT_LOAN_PERIOD_DAYS, MAX_LOAN_PERIOD_DAYS};
use std::io;
use tracing_subscriber::EnvFilter;

/// Interactive library inventory: admin and student menus over an in-memory catalogue
#[derive(Parser, Debug)]
#[command(name = "library-inventory")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Days a borrowed book may be kept
    #[arg(
        long,
        default_value_t = DEFAULT_LOAN_PERIOD_DAYS,
        value_parser = clap::value_parser!(i64).range(1..=MAX_LOAN_PERIOD_DAYS)
    )]
    loan_days: i64,

    /// Log filter for diagnostics on stderr (e.g. "info", "library_inventory=debug")
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Browse "Display All" in a full-screen table (needs the `tui` feature)
    #[arg(long)]
    tui: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    if cli.tui && !cfg!(feature = "tui") {
        tracing::warn!("--tui ignored: built without the `tui` feature");
    }

    let config = LibraryConfig {
        loan_period_days: cli.loan_days,
    };
    let mut library = Library::with_config(&config);
    tracing::info!(loan_days = config.loan_period_days, "library ready");

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout()).with_browser(cli.tui);
    console.run(&mut library)?;

    tracing::info!(books = library.inventory().len(), "session ended");
    Ok(())
}

/// Diagnostics go to stderr so they never mix with the menus
fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
    Ok(())
}
