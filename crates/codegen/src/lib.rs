//! Artifact writers for planned buses.
//!
//! Two files are generated from the same plans:
//! - a SystemVerilog include with one `<bus>_pkg` package of merge tree
//!   parameters per bus ([`systemverilog`]),
//! - a C++ header with one `<bus>_bus_t` struct per bus, describing the
//!   channels in the order the packing hardware emits them ([`cpp_header`]).
//!
//! Both writers render into a `String`; writing files is left to the caller
//! so a failure on one bus never leaves a half-written artifact behind.

pub mod cpp_header;
pub mod systemverilog;

use treegen_core::{BusConfig, PlanTable};

pub use cpp_header::generate_buscfg_header;
pub use systemverilog::{generate_package, generate_packing_cfg};

/// A decoded bus together with its serialized merge plan.
#[derive(Debug, Clone)]
pub struct PlannedBus {
    pub bus: BusConfig,
    pub table: PlanTable,
}

/// Errors raised while rendering artifacts.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error("bus '{bus}': shuffle plan has {found} entries for {expected} channels")]
    ShuffleSize {
        bus: String,
        expected: usize,
        found: usize,
    },

    #[error("bus '{bus}': shuffle slot {slot} is not a queue of a valid channel ({left}, {right})")]
    ShuffleEntry {
        bus: String,
        slot: usize,
        left: usize,
        right: usize,
    },
}
