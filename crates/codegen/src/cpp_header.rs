//! C++ bus description header for the trace decoder.
//!
//! The decoder sees logb channels in the order the packing module receives
//! them, so widths and names are written in shuffle-plan order. loge
//! channels bypass the merge tree and keep their record order.

use crate::{CodegenError, PlannedBus};
use treegen_core::{BusConfig, PlanTable};

const GUARD: &str = "CL_FPGARR_BUSCFG_H";

/// Generate the whole `.hpp` header for all buses.
pub fn generate_buscfg_header(
    generated_by: &str,
    buses: &[PlannedBus],
) -> Result<String, CodegenError> {
    let mut cpp = String::new();
    cpp.push_str(&format!("// automatically generated by {generated_by}\n"));
    cpp.push_str(&format!("#ifndef {GUARD}\n"));
    cpp.push_str(&format!("#define {GUARD}\n"));
    cpp.push_str("#include <array>\n");
    for planned in buses {
        cpp.push_str(&generate_bus_struct(&planned.bus, &planned.table)?);
    }
    cpp.push_str(&format!("#endif // {GUARD}\n"));
    tracing::debug!(buses = buses.len(), bytes = cpp.len(), "Rendered C++ bus header");
    Ok(cpp)
}

/// Generate the `<name>_bus_t` struct of one bus.
pub fn generate_bus_struct(bus: &BusConfig, table: &PlanTable) -> Result<String, CodegenError> {
    let order = shuffle_order(bus, table)?;
    let widths: Vec<String> = bus.shuffled(&order).map(|l| l.weight.to_string()).collect();
    let logb_names: Vec<String> = bus.shuffled(&order).map(|l| quote(&l.name)).collect();
    let loge_names: Vec<String> = bus.loge_names.iter().map(|n| quote(n)).collect();

    let busname = format!("{}_bus", bus.name);
    let mut cpp = String::new();
    cpp.push_str(&format!("struct {busname}_t {{\n"));
    cpp.push_str(&format!(
        "  static constexpr const char NAME[]=\"{busname}\";\n"
    ));
    cpp.push_str(&format!(
        "  static constexpr const int LOGB_CNT={};\n",
        bus.logb_count
    ));
    cpp.push_str(&format!(
        "  static constexpr const int LOGE_CNT={};\n",
        bus.loge_count
    ));
    cpp.push_str(&format!(
        "  static constexpr const int OFFSET_WIDTH={};\n",
        bus.offset_width
    ));
    cpp.push_str(&format!(
        "  static constexpr const std::array<int, LOGB_CNT> CW={{{}}};\n",
        widths.join(", ")
    ));
    cpp.push_str(&format!(
        "  static constexpr const std::array<const char*, LOGB_CNT> LOGB_NAMES={{{}}};\n",
        logb_names.join(", ")
    ));
    cpp.push_str(&format!(
        "  static constexpr const std::array<const char*, LOGE_CNT> LOGE_NAMES={{{}}};\n",
        loge_names.join(", ")
    ));
    cpp.push_str("};\n");
    Ok(cpp)
}

/// Read the leaf order out of the shuffle plan, checking it matches the bus.
fn shuffle_order(bus: &BusConfig, table: &PlanTable) -> Result<Vec<usize>, CodegenError> {
    let found = table.nodes_per_layer.first().copied().unwrap_or(0);
    if found != bus.leaves.len() {
        return Err(CodegenError::ShuffleSize {
            bus: bus.name.clone(),
            expected: bus.leaves.len(),
            found,
        });
    }

    table.shuffle_plan()[..found]
        .iter()
        .enumerate()
        .map(|(slot, &[left, right])| {
            if left != right || left >= bus.leaves.len() {
                return Err(CodegenError::ShuffleEntry {
                    bus: bus.name.clone(),
                    slot,
                    left,
                    right,
                });
            }
            Ok(left)
        })
        .collect()
}

/// A C string literal.
///
/// Other bytes become three-digit octal escapes; unlike `\x`, an octal
/// escape never swallows the digits that follow it.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if c.is_ascii_graphic() || c == ' ' => out.push(c),
            c => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("\\{byte:03o}"));
                }
            }
        }
    }
    out.push('"');
    out
}
