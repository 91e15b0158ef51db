//! `treegen generate` — Plan every bus and write both artifacts.

use std::path::{Path, PathBuf};

use treegen_codegen::{PlannedBus, generate_buscfg_header, generate_packing_cfg};
use treegen_config::AppConfig;
use treegen_core::PlanTable;

use super::{BusSource, bus_banner, load_buses, load_config, plan_buses, requested_strategies};

/// Both artifacts, fully rendered.
#[derive(Debug)]
pub struct Artifacts {
    pub svh: String,
    pub hpp: String,
    /// Trace of every bus, each under its banner.
    pub report: String,
    pub buses: usize,
}

pub fn run(
    config_path: Option<&Path>,
    source: &BusSource,
    plans: &[String],
    svh_output: Option<PathBuf>,
    hpp_output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path)?;
    if let Some(path) = svh_output {
        config.svh_output = path;
    }
    if let Some(path) = hpp_output {
        config.hpp_output = path;
    }
    config.validate_outputs()?;

    let generated_by = std::env::args().collect::<Vec<_>>().join(" ");
    let artifacts = render(&config, source, plans, &generated_by)?;
    print!("{}", artifacts.report);

    write_artifact(&config.svh_output, &artifacts.svh)?;
    write_artifact(&config.hpp_output, &artifacts.hpp)?;

    println!();
    println!("✅ Generated {} bus configuration(s)", artifacts.buses);
    println!("   SystemVerilog: {}", config.svh_output.display());
    println!("   C++ header:    {}", config.hpp_output.display());
    Ok(())
}

/// Decode, plan, and render everything in memory.
///
/// Nothing is written here, so a bad record or strategy list leaves any
/// previous artifacts untouched.
pub fn render(
    config: &AppConfig,
    source: &BusSource,
    plans: &[String],
    generated_by: &str,
) -> Result<Artifacts, Box<dyn std::error::Error>> {
    let requested = requested_strategies(config, plans)?;
    let buses = load_buses(config, source)?;
    let outcomes = plan_buses(&buses, &requested, true)?;

    let mut report = String::new();
    let planned: Vec<PlannedBus> = buses
        .into_iter()
        .zip(&outcomes)
        .map(|(bus, outcome)| {
            report.push_str(&bus_banner(&bus, outcome.strategy));
            report.push('\n');
            report.push_str(&outcome.trace_text());
            PlannedBus {
                table: PlanTable::from_tree(&outcome.tree),
                bus,
            }
        })
        .collect();

    Ok(Artifacts {
        svh: generate_packing_cfg(generated_by, &planned),
        hpp: generate_buscfg_header(generated_by, &planned)?,
        report,
        buses: planned.len(),
    })
}

fn write_artifact(path: &Path, content: &str) -> treegen_core::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), bytes = content.len(), "Wrote artifact");
    Ok(())
}
