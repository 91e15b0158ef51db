//! # treegen core
//!
//! Builds the static merge-tree configuration of a bus packing module.
//!
//! A bus is a set of logging channels ("logb" channels) with fixed bit
//! widths. The hardware merges them pairwise, layer by layer, into one wide
//! stream. This crate decides the shape of that tree:
//!
//! ```text
//! packed record ──▶ BusConfig ──▶ Planner(Strategy) ──▶ MergeTree ──▶ PlanTable
//!   (codec, bus)      (leaves)      (strategy, plan)     (layers)      (table)
//! ```
//!
//! Layer 0 of every tree only holds queue nodes and expresses the order in
//! which leaves enter the tree (the shuffle plan). Every higher layer holds
//! merge nodes and the queue nodes needed to keep both inputs of a merge at
//! the same height.

pub mod bus;
pub mod codec;
pub mod error;
pub mod plan;
pub mod strategy;
pub mod table;

// Re-export key types at crate root for ergonomics
pub use bus::{BusConfig, Leaf};
pub use error::{DecodeError, Error, Result};
pub use plan::{MergeTree, NodeKind, PlanNode, PlanOutcome, Planner, PlannerOptions, TraceLine};
pub use strategy::{Split, Strategy};
pub use table::PlanTable;
