mod bands;
mod cli;
mod commands;
mod mcp;
mod messages;
mod package;
mod page_range;
mod pdf;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use page_range::PageRangeError;
use tracing_subscriber::EnvFilter;

/// Exit status for a page selection the user has to correct.
const EXIT_BAD_SELECTION: i32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout belongs to command output and the MCP transport
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pdfbands=warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Mcp => mcp::run_server().await,
        Commands::Info { path } => commands::info::run(&path),
        Commands::Select { path, pages } => commands::select::run(&path, &pages),
        Commands::Parts {
            path,
            pages,
            output_dir,
            slice,
        } => commands::parts::run(&path, &pages, &output_dir, &slice),
        Commands::Zip {
            path,
            pages,
            output,
            naming,
            slice,
        } => commands::bundle::run(&path, pages.as_deref(), &output, naming, &slice),
    };

    if let Err(err) = &result {
        if let Some(range_err) = err.downcast_ref::<PageRangeError>() {
            eprintln!("{}", messages::describe(range_err, cli.lang));
            std::process::exit(EXIT_BAD_SELECTION);
        }
    }

    result
}
