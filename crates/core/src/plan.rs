//! Merge tree planning.
//!
//! The planner turns leaf widths into a [`MergeTree`]: an arena of layers
//! indexed by height. Adding a node to a layer returns its layer-local id,
//! and nodes of height `h` refer to ids of height `h - 1`.
//!
//! ```text
//! height 2         M(0, 1)
//!                 /       \
//! height 1    M(0, 1)    Q(2)        queue keeps leaf 0 level with the merge
//!             /    \       |
//! height 0  Q(3)  Q(1)   Q(0)        shuffle plan: leaves 3, 1, 0
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bus::BusConfig;
use crate::error::{Error, Result};
use crate::strategy::{Divide, KnapsackDp, Pair, Strategy, SumBalance, greedy, weight_of};

/// Whether a node merges two inputs or passes one through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Queue,
    Merge,
}

/// One node of the merge tree.
///
/// `left` and `right` are ids in the layer below; at height 0 they are the
/// leaf index. `left == right` marks a queue node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanNode {
    pub id: usize,
    pub height: usize,
    pub left: usize,
    pub right: usize,
    /// Total width of the leaves below this node.
    pub weight: u64,
}

impl PlanNode {
    pub fn kind(&self) -> NodeKind {
        if self.left == self.right {
            NodeKind::Queue
        } else {
            NodeKind::Merge
        }
    }

    pub fn is_queue(&self) -> bool {
        self.kind() == NodeKind::Queue
    }
}

/// Layers of plan nodes, indexed by height. Layer 0 is the shuffle plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeTree {
    layers: Vec<Vec<PlanNode>>,
}

impl MergeTree {
    /// Append a node at `height` and return its id within that layer.
    fn push(&mut self, height: usize, left: usize, right: usize, weight: u64) -> usize {
        while self.layers.len() <= height {
            self.layers.push(Vec::new());
        }
        let layer = &mut self.layers[height];
        let id = layer.len();
        layer.push(PlanNode {
            id,
            height,
            left,
            right,
            weight,
        });
        id
    }

    pub fn layers(&self) -> &[Vec<PlanNode>] {
        &self.layers
    }

    pub fn layer(&self, height: usize) -> &[PlanNode] {
        self.layers.get(height).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of layers, including the shuffle layer.
    pub fn height(&self) -> usize {
        self.layers.len()
    }

    pub fn nodes_per_layer(&self) -> Vec<usize> {
        self.layers.iter().map(Vec::len).collect()
    }

    pub fn max_nodes(&self) -> usize {
        self.layers.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// The single node of the top layer.
    pub fn root(&self) -> Option<&PlanNode> {
        match self.layers.last().map(Vec::as_slice) {
            Some([root]) => Some(root),
            _ => None,
        }
    }

    /// Leaf indices in the order the hardware receives them.
    pub fn shuffle_order(&self) -> Vec<usize> {
        self.layer(0).iter().map(|n| n.left).collect()
    }

    pub fn merge_count(&self) -> usize {
        self.layers.iter().flatten().filter(|n| !n.is_queue()).count()
    }

    pub fn queue_count(&self) -> usize {
        self.layers.iter().flatten().filter(|n| n.is_queue()).count()
    }
}

/// One human-readable registration step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceLine {
    pub height: usize,
    pub node: usize,
    pub kind: NodeKind,
    pub left: usize,
    pub right: usize,
    pub weight: u64,
}

const TRACE_SEP: &str = "------";

impl fmt::Display for TraceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.height > 0 {
            write!(f, "{}> ", TRACE_SEP.repeat(self.height))?;
        }
        match self.kind {
            NodeKind::Queue => write!(f, "ID({}) Q({}) W{}", self.node, self.left, self.weight),
            NodeKind::Merge => write!(
                f,
                "ID({}) M({}, {}) W{}",
                self.node, self.left, self.right, self.weight
            ),
        }
    }
}

/// Planner settings, fixed at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerOptions {
    pub strategy: Strategy,
    /// Record a [`TraceLine`] for every registered node.
    pub trace: bool,
}

/// A finished plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOutcome {
    pub strategy: Strategy,
    pub tree: MergeTree,
    /// Registration trace; empty unless tracing was requested.
    ///
    /// Lines are grouped by subtree: a merge follows both of its inputs,
    /// including the queues that leveled them.
    pub trace: Vec<TraceLine>,
}

impl PlanOutcome {
    pub fn trace_text(&self) -> String {
        self.trace.iter().map(|l| format!("{l}\n")).collect()
    }
}

/// Builds merge trees with one strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Planner {
    options: PlannerOptions,
}

impl Planner {
    pub fn new(options: PlannerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> PlannerOptions {
        self.options
    }

    /// Plan the merge tree of a decoded bus.
    pub fn plan_bus(&self, bus: &BusConfig) -> Result<PlanOutcome> {
        self.plan(&bus.name, &bus.weights())
    }

    /// Plan the merge tree of the leaves with the given widths.
    pub fn plan(&self, name: &str, weights: &[u32]) -> Result<PlanOutcome> {
        if weights.is_empty() {
            return Err(Error::EmptyBus(name.to_string()));
        }
        if let Some(index) = weights.iter().position(|&w| w == 0) {
            return Err(Error::ZeroWidth {
                bus: name.to_string(),
                index,
            });
        }
        if self.options.strategy == Strategy::KnapsackDp {
            let cells = KnapsackDp::table_cells(weights);
            if cells > KnapsackDp::MAX_TABLE_CELLS {
                return Err(Error::TableTooLarge {
                    bus: name.to_string(),
                    cells,
                    limit: KnapsackDp::MAX_TABLE_CELLS,
                });
            }
        }

        let mut build = Build {
            weights,
            tree: MergeTree::default(),
            trace: self.options.trace,
        };
        let (_, trace) = match self.options.strategy {
            Strategy::SumBalance => build.divide(&SumBalance, &all_leaves(weights)),
            Strategy::KnapsackDp => build.divide(&KnapsackDp, &all_leaves(weights)),
            Strategy::Greedy => build.layered(),
        };

        let tree = build.tree;
        tracing::info!(
            bus = %name,
            strategy = %self.options.strategy,
            leaves = weights.len(),
            height = tree.height(),
            max_nodes = tree.max_nodes(),
            merges = tree.merge_count(),
            queues = tree.queue_count(),
            "Planned merge tree"
        );

        Ok(PlanOutcome {
            strategy: self.options.strategy,
            tree,
            trace,
        })
    }
}

fn all_leaves(weights: &[u32]) -> Vec<usize> {
    (0..weights.len()).collect()
}

/// Mutable state of one planning run.
struct Build<'a> {
    weights: &'a [u32],
    tree: MergeTree,
    trace: bool,
}

impl Build<'_> {
    fn register(
        &mut self,
        height: usize,
        left: usize,
        right: usize,
        weight: u64,
        lines: &mut Vec<TraceLine>,
    ) -> usize {
        let node = self.tree.push(height, left, right, weight);
        if self.trace {
            lines.push(TraceLine {
                height,
                node,
                kind: if left == right {
                    NodeKind::Queue
                } else {
                    NodeKind::Merge
                },
                left,
                right,
                weight,
            });
        }
        node
    }

    /// Plan `indices` recursively. Returns `((height, node id), trace)`.
    fn divide<D: Divide>(
        &mut self,
        rule: &D,
        indices: &[usize],
    ) -> ((usize, usize), Vec<TraceLine>) {
        if let [leaf] = indices {
            let mut lines = Vec::new();
            let id = self.register(0, *leaf, *leaf, u64::from(self.weights[*leaf]), &mut lines);
            return ((0, id), lines);
        }

        let split = rule.split(self.weights, indices);
        tracing::debug!(
            heavier = ?split.heavier,
            lighter = ?split.lighter,
            "Divided {} leaves",
            indices.len()
        );
        let lw = weight_of(self.weights, &split.heavier);
        let rw = weight_of(self.weights, &split.lighter);

        let ((lh, mut lid), mut lines) = self.divide(rule, &split.heavier);
        let ((rh, mut rid), mut r_lines) = self.divide(rule, &split.lighter);
        let h = lh.max(rh);

        for height in lh + 1..=h {
            lid = self.register(height, lid, lid, lw, &mut lines);
        }
        for height in rh + 1..=h {
            rid = self.register(height, rid, rid, rw, &mut r_lines);
        }

        lines.append(&mut r_lines);
        let id = self.register(h + 1, lid, rid, lw + rw, &mut lines);
        ((h + 1, id), lines)
    }

    /// Pair all layers greedily, then register them top-down.
    fn layered(&mut self) -> ((usize, usize), Vec<TraceLine>) {
        let layers = greedy::build_layers(self.weights);
        let height = layers.len();
        let (id, lines) = self.register_pair(&layers, height, 0);
        ((height, id), lines)
    }

    /// Register node `position` of tree height `height` and everything below it.
    fn register_pair(
        &mut self,
        layers: &[Vec<Pair>],
        height: usize,
        position: usize,
    ) -> (usize, Vec<TraceLine>) {
        let mut lines = Vec::new();
        if height == 0 {
            let weight = u64::from(self.weights[position]);
            let id = self.register(0, position, position, weight, &mut lines);
            return (id, lines);
        }

        let pair = layers[height - 1][position];
        if pair.is_single() {
            let (child, mut lines) = self.register_pair(layers, height - 1, pair.first);
            let id = self.register(height, child, child, pair.weight, &mut lines);
            (id, lines)
        } else {
            let (left, mut lines) = self.register_pair(layers, height - 1, pair.first);
            let (right, mut r_lines) = self.register_pair(layers, height - 1, pair.second);
            lines.append(&mut r_lines);
            let id = self.register(height, left, right, pair.weight, &mut lines);
            (id, lines)
        }
    }
}
