//! treegen CLI — the main entry point.
//!
//! Commands:
//! - `generate`    — Plan every bus and write the `.svh` and `.hpp` artifacts
//! - `plan`        — Print the merge tree of each bus
//! - `decode`      — Show what the packed records decode to
//! - `strategies`  — List the divide strategies
//! - `config`      — Show, validate, or initialize the configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::BusSource;

#[derive(Parser)]
#[command(
    name = "treegen",
    about = "treegen — merge tree configuration generator for FPGA bus packing",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Config file (defaults to TREEGEN_CONFIG, then ./treegen.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan every bus and write the SystemVerilog and C++ artifacts
    Generate {
        #[command(flatten)]
        source: BusSource,

        /// Divide strategy: give none, one for every bus, or one per bus
        #[arg(short = 'p', long = "plan", value_name = "STRATEGY", value_delimiter = ',')]
        plans: Vec<String>,

        /// Override the SystemVerilog output path
        #[arg(long, value_name = "FILE")]
        svh_output: Option<PathBuf>,

        /// Override the C++ header output path
        #[arg(long, value_name = "FILE")]
        hpp_output: Option<PathBuf>,
    },

    /// Print the merge tree of each bus
    Plan {
        #[command(flatten)]
        source: BusSource,

        /// Divide strategy: give none, one for every bus, or one per bus
        #[arg(short = 'p', long = "plan", value_name = "STRATEGY", value_delimiter = ',')]
        plans: Vec<String>,

        /// Print the plan tables as JSON instead of the trace
        #[arg(long)]
        json: bool,
    },

    /// Show what the packed records decode to
    Decode {
        #[command(flatten)]
        source: BusSource,

        /// Print the decoded buses as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the divide strategies
    Strategies,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Load and check the configuration and its records
    Validate,
    /// Print the config file path
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Generate {
            source,
            plans,
            svh_output,
            hpp_output,
        } => commands::generate::run(config, &source, &plans, svh_output, hpp_output)?,
        Commands::Plan {
            source,
            plans,
            json,
        } => commands::plan::run(config, &source, &plans, json)?,
        Commands::Decode { source, json } => commands::decode::run(config, &source, json)?,
        Commands::Strategies => commands::strategies::run(),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(config)?,
            ConfigAction::Validate => commands::config_cmd::validate(config)?,
            ConfigAction::Path => commands::config_cmd::path(config),
            ConfigAction::Init { force } => commands::config_cmd::init(config, force)?,
        },
    }

    Ok(())
}
