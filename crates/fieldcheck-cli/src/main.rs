use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;

use fieldcheck::settings::{apply_overrides, load_config};
use fieldcheck::validate::{run_check, run_convert, run_validate};
use fieldcheck_core::Format;

#[derive(Parser)]
#[command(name = "fieldcheck")]
#[command(about = "Validate and normalize records against declarative field schemas", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Engine configuration file (defaults to ./fieldcheck.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reject malformed schema definitions instead of skipping them
    #[arg(long, global = true, env = "FIELDCHECK_STRICT_SCHEMA")]
    strict_schema: bool,

    /// Fail conversion on values that cannot become numbers
    #[arg(long, global = true, env = "FIELDCHECK_STRICT_COERCION")]
    strict_coercion: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a schema and list its fields
    Check {
        /// Schema file (JSON, YAML or TOML)
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Validate a record against a schema
    Validate {
        /// Schema file (JSON, YAML or TOML)
        #[arg(short, long)]
        schema: PathBuf,

        /// Record file (reads JSON from stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Record format, overriding the file extension
        #[arg(short, long)]
        format: Option<Format>,
    },

    /// Convert a record to the schema's types
    Convert {
        /// Schema file (JSON, YAML or TOML)
        #[arg(short, long)]
        schema: PathBuf,

        /// Record file (reads JSON from stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Record format, overriding the file extension
        #[arg(short, long)]
        format: Option<Format>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.debug {
        tracing::Level::TRACE
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(cli.debug) // Show target module in debug mode
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    let config = load_config(cli.config.as_deref(), &cwd)?;
    let config = apply_overrides(config, cli.strict_schema, cli.strict_coercion);
    debug!(?config, "engine configuration");

    match cli.command {
        Commands::Check { schema } => {
            let fields = run_check(&schema, &config)?;
            print_json(&fields)
        }
        Commands::Validate {
            schema,
            input,
            format,
        } => {
            let report = run_validate(&schema, input.as_deref(), format, &config)?;
            print_json(&report)?;
            if !report.valid {
                anyhow::bail!(
                    "{} failed validation against {}",
                    describe_input(input.as_deref()),
                    schema.display()
                );
            }
            Ok(())
        }
        Commands::Convert {
            schema,
            input,
            format,
        } => {
            let converted = run_convert(&schema, input.as_deref(), format, &config)?;
            print_json(&converted)
        }
    }
}

fn describe_input(input: Option<&Path>) -> String {
    match input {
        Some(path) => path.display().to_string(),
        None => "stdin".to_string(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", output);
    Ok(())
}
