//! Subcommand implementations and the bus loading they share.

pub mod config_cmd;
pub mod decode;
pub mod generate;
pub mod plan;
pub mod strategies;

use clap::Args;
use std::path::{Path, PathBuf};
use treegen_config::{AppConfig, parse_strategies, resolve_strategies};
use treegen_core::{BusConfig, PlanOutcome, Planner, PlannerOptions, Strategy};

/// Where the buses come from. Flags win over the config file.
#[derive(Args, Debug, Default)]
pub struct BusSource {
    /// File with one packed record per line
    #[arg(long, value_name = "FILE", conflicts_with = "cw")]
    pub records: Option<PathBuf>,

    /// Plan one ad-hoc bus from comma-separated channel widths
    #[arg(long, value_name = "WIDTHS", value_delimiter = ',')]
    pub cw: Vec<u32>,

    /// Name of the ad-hoc bus
    #[arg(long, default_value = "adhoc")]
    pub name: String,

    /// Offset width of the ad-hoc bus
    #[arg(long, default_value_t = 0)]
    pub offset_width: u32,
}

/// Load the config file named by `--config`, or the default one.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) if !path.exists() => {
            Err(format!("Config file not found: {}", path.display()).into())
        }
        Some(path) => Ok(AppConfig::load_at(path)?),
        None => Ok(AppConfig::load()?),
    }
}

/// Decode the buses selected by `source`, falling back to the config.
pub fn load_buses(
    config: &AppConfig,
    source: &BusSource,
) -> Result<Vec<BusConfig>, Box<dyn std::error::Error>> {
    if !source.cw.is_empty() {
        return Ok(vec![BusConfig::from_widths(
            source.name.as_str(),
            &source.cw,
            source.offset_width,
        )]);
    }

    let mut config = config.clone();
    if let Some(path) = &source.records {
        config.records_file = Some(path.clone());
    }
    Ok(config.buses()?)
}

/// The strategies named on the command line, else those of the config.
pub fn requested_strategies(
    config: &AppConfig,
    plans: &[String],
) -> Result<Vec<Strategy>, Box<dyn std::error::Error>> {
    if plans.is_empty() {
        Ok(config.strategies.clone())
    } else {
        Ok(parse_strategies(plans)?)
    }
}

/// Plan every bus. Strategies are resolved before the first tree is built.
pub fn plan_buses(
    buses: &[BusConfig],
    requested: &[Strategy],
    trace: bool,
) -> Result<Vec<PlanOutcome>, Box<dyn std::error::Error>> {
    let strategies = resolve_strategies(requested, buses.len())?;
    let outcomes = buses
        .iter()
        .zip(strategies)
        .map(|(bus, strategy)| Planner::new(PlannerOptions { strategy, trace }).plan_bus(bus))
        .collect::<treegen_core::Result<Vec<_>>>()?;
    Ok(outcomes)
}

/// Banner printed above the trace of each bus.
pub fn bus_banner(bus: &BusConfig, strategy: Strategy) -> String {
    format!(
        "{}\nname: {}, using divide_plan {}, CW_int: {:?}",
        "#".repeat(80),
        bus.name,
        strategy,
        bus.weights()
    )
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> treegen_core::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
