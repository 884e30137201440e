//! Strauss CLI - command-line interface for the grounded-theory pipeline.

use clap::Parser;
use strauss_cli::{commands, Cli, Command, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    // Log to stderr so tables and status lines stay clean on stdout.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let formatter = Formatter::new(!cli.no_color);

    if let Err(e) = run(cli, &formatter) {
        eprintln!("{}", formatter.error(&e.to_string()));
        std::process::exit(1);
    }
}

fn run(cli: Cli, formatter: &Formatter) -> strauss_cli::Result<()> {
    match cli.command {
        Command::Segment(args) => commands::execute_segment(args, formatter),
        Command::RunAll(args) => commands::execute_run_all(args, formatter),
    }
}
