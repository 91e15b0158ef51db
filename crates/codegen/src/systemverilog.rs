//! SystemVerilog parameter packages.
//!
//! Each bus becomes a package consumed by the packing module's generate
//! loops:
//!
//! ```text
//! package record_pkg;
//!   parameter MERGE_TREE_HEIGHT=6;
//!   parameter MERGE_TREE_MAX_NODES=14;
//!   parameter int NODES_PER_LAYER [0:MERGE_TREE_HEIGHT-1] = '{ 14, 9, 6, 4, 2, 1 };
//!   parameter int MERGE_PLAN [0:MERGE_TREE_HEIGHT-1] [0:MERGE_TREE_MAX_NODES-1] [0:1] = '{ ... };
//!   parameter int SHUFFLE_PLAN [0:MERGE_TREE_MAX_NODES-1] [0:1] = MERGE_PLAN[0];
//! endpackage
//! ```

use crate::PlannedBus;
use treegen_core::PlanTable;

const GUARD: &str = "CL_FPGARR_PACKING_CFG_H";
const INDENT: &str = "  ";

/// Generate the whole `.svh` include for all buses.
pub fn generate_packing_cfg(generated_by: &str, buses: &[PlannedBus]) -> String {
    let mut sv = String::new();
    sv.push_str(&format!("// automatically generated by {generated_by}\n"));
    sv.push_str(&format!("`ifndef {GUARD}\n"));
    sv.push_str(&format!("`define {GUARD}\n"));
    for planned in buses {
        sv.push_str(&generate_package(&planned.bus.name, &planned.table));
    }
    sv.push_str(&format!("`endif // {GUARD}\n"));
    tracing::debug!(buses = buses.len(), bytes = sv.len(), "Rendered SystemVerilog packages");
    sv
}

/// Generate the parameter package of one bus.
pub fn generate_package(name: &str, table: &PlanTable) -> String {
    let mut sv = String::new();

    sv.push_str(&format!("package {name}_pkg;\n"));
    sv.push_str(&format!(
        "{INDENT}// height of the merge tree, layer 0 is for reorder input\n"
    ));
    sv.push_str(&format!(
        "{INDENT}parameter MERGE_TREE_HEIGHT={};\n",
        table.height
    ));
    sv.push_str(&format!(
        "{INDENT}// max number of nodes across all layers/height\n"
    ));
    sv.push_str(&format!(
        "{INDENT}parameter MERGE_TREE_MAX_NODES={};\n",
        table.max_nodes
    ));
    sv.push_str(&format!(
        "{INDENT}// number of nodes inside each layer, used to terminate generate for-loop\n"
    ));
    let nodes_per_layer: Vec<String> = table.nodes_per_layer.iter().map(|n| n.to_string()).collect();
    sv.push_str(&format!(
        "{INDENT}parameter int NODES_PER_LAYER [0:MERGE_TREE_HEIGHT-1] = '{{ {} }};\n",
        nodes_per_layer.join(", ")
    ));

    sv.push_str(&format!(
        "{INDENT}// actual merge plan [layer][node][plan], each plan is a two-integer tuple, \
         meaning the idx of nodes to merge or queue in the previous layer. \
         Equal idx means queue, else means merge.\n\
         // Height 0 is to shuffle the init channel width.\n"
    ));
    let layers: Vec<String> = table.merge_plan.iter().map(|row| format_layer(row)).collect();
    sv.push_str(&format!(
        "{INDENT}parameter int MERGE_PLAN [0:MERGE_TREE_HEIGHT-1] [0:MERGE_TREE_MAX_NODES-1] [0:1] = '{{\n{}\n}};\n",
        layers.join(", \n")
    ));

    sv.push_str(&format!(
        "{INDENT}// a shortcut to the shuffling plan (MERGE_PLAN[0])\n"
    ));
    sv.push_str(&format!(
        "{INDENT}parameter int SHUFFLE_PLAN [0:MERGE_TREE_MAX_NODES-1] [0:1] = MERGE_PLAN[0];\n"
    ));
    sv.push_str("endpackage\n");

    sv
}

/// One padded layer as an assignment pattern: `'{'{l, r}, '{l, r}}`.
fn format_layer(row: &[[usize; 2]]) -> String {
    let nodes: Vec<String> = row
        .iter()
        .map(|[left, right]| format!("'{{{left}, {right}}}"))
        .collect();
    format!("'{{{}}}", nodes.join(", "))
}
