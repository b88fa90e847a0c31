//! apidocs-from-source - command-line tool for generating API documentation listings.
//!
//! Reads the Rust sources of a web service, discovers its routed handlers and
//! writes a resource listing with a deduplicated model dictionary.
//!
//! # Usage
//!
//! ```bash
//! apidocs-from-source [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! ```bash
//! apidocs-from-source ./my-service -f json -o api-docs.json
//! apidocs-from-source ./my-service -c docs.yaml --lowercase-routes -v
//! ```

use anyhow::Result;
use apidocs_from_source::cli;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("apidocs-from-source starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Documentation generation completed successfully");

    Ok(())
}
