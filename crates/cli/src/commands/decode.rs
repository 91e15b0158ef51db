//! `treegen decode` — Show what the packed records decode to.

use std::path::Path;

use super::{BusSource, load_buses, load_config, print_json};

pub fn run(
    config_path: Option<&Path>,
    source: &BusSource,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let buses = load_buses(&config, source)?;

    if json {
        print_json(&buses)?;
        return Ok(());
    }

    for bus in &buses {
        println!("🚌 {} ({} bits total)", bus.name, bus.total_width());
        println!("{:-<72}", "");
        println!("  logb channels: {}", bus.logb_count);
        println!("  loge channels: {}", bus.loge_count);
        println!("  offset width:  {}", bus.offset_width);
        for leaf in &bus.leaves {
            println!("  {:>3}. {:<16} {:>5} bits", leaf.index, leaf.name, leaf.weight);
        }
        if !bus.loge_names.is_empty() {
            println!("  loge: {}", bus.loge_names.join(", "));
        }
        println!();
    }

    Ok(())
}
