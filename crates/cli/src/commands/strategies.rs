//! `treegen strategies` — List the divide strategies.

use treegen_core::Strategy;

pub fn run() {
    println!("🧩 Divide strategies ({}):", Strategy::ALL.len());
    for strategy in Strategy::ALL {
        let marker = if strategy == Strategy::default() {
            " (default)"
        } else {
            ""
        };
        println!("  {:<12} {}{marker}", strategy.name(), strategy.description());
    }
}
