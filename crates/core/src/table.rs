//! Rectangular merge plan table.
//!
//! Hardware parameters need fixed array bounds, so every layer is padded to
//! the widest layer with the sentinel pair `(0, 0)`. `nodes_per_layer`
//! keeps the true sizes so consumers can stop before the padding.

use serde::{Deserialize, Serialize};

use crate::plan::MergeTree;

/// Filler entry for slots past the end of a layer.
pub const SENTINEL: [usize; 2] = [0, 0];

/// A merge tree flattened into `height × max_nodes × 2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTable {
    pub height: usize,
    pub max_nodes: usize,
    pub nodes_per_layer: Vec<usize>,
    /// `merge_plan[layer][slot] = [left, right]`, in registration order.
    pub merge_plan: Vec<Vec<[usize; 2]>>,
}

impl PlanTable {
    pub fn from_tree(tree: &MergeTree) -> Self {
        let max_nodes = tree.max_nodes();
        let merge_plan = tree
            .layers()
            .iter()
            .map(|layer| {
                let mut row: Vec<[usize; 2]> =
                    layer.iter().map(|n| [n.left, n.right]).collect();
                row.resize(max_nodes, SENTINEL);
                row
            })
            .collect();

        Self {
            height: tree.height(),
            max_nodes,
            nodes_per_layer: tree.nodes_per_layer(),
            merge_plan,
        }
    }

    /// Layer 0, padded like every other layer.
    pub fn shuffle_plan(&self) -> &[[usize; 2]] {
        self.merge_plan.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Leaf indices of the shuffle plan without padding.
    pub fn shuffle_order(&self) -> Vec<usize> {
        let leaves = self.nodes_per_layer.first().copied().unwrap_or(0);
        self.shuffle_plan()
            .iter()
            .take(leaves)
            .map(|&[leaf, _]| leaf)
            .collect()
    }
}

impl From<&MergeTree> for PlanTable {
    fn from(tree: &MergeTree) -> Self {
        Self::from_tree(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Planner, PlannerOptions};
    use crate::strategy::Strategy;

    const CW: [u32; 14] = [32, 36, 32, 32, 36, 32, 32, 36, 32, 531, 18, 91, 593, 91];
    const VALIDATE_CW: [u32; 11] = [34, 2, 34, 2, 34, 2, 91, 593, 91, 531, 18];

    fn table(strategy: Strategy, weights: &[u32]) -> PlanTable {
        let outcome = Planner::new(PlannerOptions {
            strategy,
            trace: false,
        })
        .plan("t", weights)
        .unwrap();
        PlanTable::from_tree(&outcome.tree)
    }

    /// Re-derive node heights bottom-up from the table alone and check
    /// every merge sits one above its (equal-height) inputs.
    fn assert_heights_consistent(t: &PlanTable) {
        let mut heights: Vec<Vec<usize>> = vec![vec![0; t.nodes_per_layer[0]]];
        for layer in 1..t.height {
            let below = &heights[layer - 1];
            let mut consumed = vec![0usize; below.len()];
            let mut row = Vec::new();
            for &[l, r] in &t.merge_plan[layer][..t.nodes_per_layer[layer]] {
                assert!(l < below.len() && r < below.len(), "layer {layer}: ({l}, {r})");
                assert_eq!(below[l], below[r], "unequal inputs at layer {layer}");
                consumed[l] += 1;
                if l != r {
                    consumed[r] += 1;
                }
                row.push(below[l].max(below[r]) + 1);
            }
            assert!(
                consumed.iter().all(|&c| c == 1),
                "layer {} not consumed exactly once: {consumed:?}",
                layer - 1
            );
            assert!(row.iter().all(|&h| h == layer));
            heights.push(row);
        }
        assert_eq!(t.nodes_per_layer.last(), Some(&1));
    }

    fn assert_permutation(order: &[usize], n: usize) {
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn rows_are_padded_with_sentinel() {
        let t = table(Strategy::SumBalance, &[8, 4, 2]);
        assert_eq!(t.max_nodes, 3);
        assert_eq!(t.merge_plan[1], vec![[1, 2], [0, 0], SENTINEL]);
        assert_eq!(t.merge_plan[2], vec![[1, 0], SENTINEL, SENTINEL]);
        assert!(t.merge_plan.iter().all(|row| row.len() == t.max_nodes));
    }

    #[test]
    fn degenerate_bus() {
        let t = table(Strategy::SumBalance, &[40]);
        assert_eq!(t.height, 1);
        assert_eq!(t.max_nodes, 1);
        assert_eq!(t.nodes_per_layer, vec![1]);
        assert_eq!(t.shuffle_plan(), &[[0, 0]]);
    }

    #[test]
    fn every_strategy_conserves_leaves_and_heights() {
        let buses: [&[u32]; 5] = [&CW, &VALIDATE_CW, &[5, 5], &[1, 2, 3], &[9; 17]];
        for strategy in Strategy::ALL {
            for weights in buses {
                let t = table(strategy, weights);
                assert_eq!(t.nodes_per_layer[0], weights.len(), "{strategy}");
                assert!(
                    t.shuffle_plan()[..weights.len()]
                        .iter()
                        .all(|&[l, r]| l == r)
                );
                assert_permutation(&t.shuffle_order(), weights.len());
                assert_heights_consistent(&t);
            }
        }
    }

    #[test]
    fn tree_height_within_bounds() {
        for strategy in Strategy::ALL {
            let t = table(strategy, &CW);
            let merge_height = t.height - 1;
            assert!((4..=CW.len()).contains(&merge_height), "{strategy}: {merge_height}");
        }
    }

    #[test]
    fn serializes_to_json() {
        let t = table(Strategy::Greedy, &[3, 3]);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["height"], 2);
        assert_eq!(json["merge_plan"][1][0], serde_json::json!([0, 1]));
    }
}
