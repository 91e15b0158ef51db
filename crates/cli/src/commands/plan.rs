//! `treegen plan` — Print the merge tree of each bus without writing files.

use std::path::Path;

use serde::Serialize;
use treegen_core::{PlanTable, Strategy};

use super::{
    BusSource, bus_banner, load_buses, load_config, plan_buses, print_json, requested_strategies,
};

/// One bus of the `--json` report.
#[derive(Debug, Serialize)]
struct BusPlan<'a> {
    bus: &'a str,
    strategy: Strategy,
    shuffle_order: Vec<usize>,
    #[serde(flatten)]
    table: PlanTable,
}

pub fn run(
    config_path: Option<&Path>,
    source: &BusSource,
    plans: &[String],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let requested = requested_strategies(&config, plans)?;
    let buses = load_buses(&config, source)?;
    let outcomes = plan_buses(&buses, &requested, !json)?;

    if json {
        let report: Vec<BusPlan<'_>> = buses
            .iter()
            .zip(&outcomes)
            .map(|(bus, outcome)| {
                let table = PlanTable::from_tree(&outcome.tree);
                BusPlan {
                    bus: &bus.name,
                    strategy: outcome.strategy,
                    shuffle_order: table.shuffle_order(),
                    table,
                }
            })
            .collect();
        print_json(&report)?;
        return Ok(());
    }

    for (bus, outcome) in buses.iter().zip(&outcomes) {
        println!("{}", bus_banner(bus, outcome.strategy));
        print!("{}", outcome.trace_text());
        let tree = &outcome.tree;
        println!(
            "🌲 {}: height {}, {} merges, {} queues, nodes per layer {:?}",
            bus.name,
            tree.height(),
            tree.merge_count(),
            tree.queue_count(),
            tree.nodes_per_layer()
        );
    }

    Ok(())
}
