use crate::config::GeneratorConfig;
use crate::listing::generate_listing;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::source::SourceSet;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// API docs from source - Generate API documentation listings from Rust web service sources
#[derive(Parser, Debug)]
#[command(name = "apidocs-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short = 'c', long = "config", value_name = "CONFIG")]
    pub config_path: Option<PathBuf>,

    /// API version reported in the listing
    #[arg(long = "api-version", value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Base URL reported in the listing
    #[arg(long = "base-path", value_name = "URL")]
    pub base_path: Option<String>,

    /// Lowercase every route path
    #[arg(long = "lowercase-routes")]
    pub lowercase_routes: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        anyhow::bail!("Project path does not exist: {}", args.project_path.display());
    }
    if !args.project_path.is_dir() {
        anyhow::bail!("Project path is not a directory: {}", args.project_path.display());
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Load the configuration file (if any) and apply command line overrides
pub fn load_config(args: &CliArgs) -> Result<GeneratorConfig> {
    let mut config = match &args.config_path {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(version) = &args.api_version {
        config.api_version = version.clone();
    }
    if let Some(base_path) = &args.base_path {
        config.base_path = base_path.clone();
    }
    if args.lowercase_routes {
        config.lowercase_routes = true;
    }
    Ok(config)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting documentation generation...");

    // Step 1: Load configuration
    let config = load_config(&args)?;
    debug!("Configuration: {:?}", config);

    // Step 2: Scan and parse the sources
    info!("Scanning project directory...");
    let sources = SourceSet::load(&args.project_path, &config.exclude_dirs)?;
    info!("Parsed {} Rust files", sources.files.len());
    if sources.files.is_empty() {
        anyhow::bail!("No Rust files could be parsed in the project directory");
    }

    // Step 3: Discover operations and build the listing
    info!("Building resource listing...");
    let generated = generate_listing(&sources.files, &config);
    if generated.discovered == 0 {
        warn!("No routes found in the project");
    }

    // Step 4: Serialize to requested format
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&generated.listing)?,
        OutputFormat::Json => serialize_json(&generated.listing)?,
    };

    // Step 5: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files parsed: {}", sources.files.len());
    info!("  - Files skipped: {}", sources.warnings.len());
    info!("  - Operations found: {}", generated.discovered);
    info!("  - Operations documented: {}", generated.documented);
    info!("  - Operations failed: {}", generated.failures.len());
    info!("  - Models: {}", generated.listing.models.len());

    Ok(())
}
