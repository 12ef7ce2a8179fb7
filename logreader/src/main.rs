//! Log file validation tool.
//!
//! Validates each record of a JSON-lines log file against a field schema
//! and reports accepted records per file extension.

use clap::Parser;
use logreader::{Cli, run};
use logreader_core::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    let stdout = std::io::stdout();
    run(&cli, &mut stdout.lock())
}
