//! Greedy layered pairing.
//!
//! Each layer is sorted by weight and its heaviest node is paired with its
//! lightest, the second heaviest with the second lightest, and so on. An
//! odd layer carries its heaviest node up alone. The pair weights form the
//! next layer; pairing stops once a single node is left.

use serde::{Deserialize, Serialize};

/// Two nodes of one layer combined into a node of the next layer.
///
/// `first == second` marks a node carried up alone (a queue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub weight: u64,
    pub first: usize,
    pub second: usize,
}

impl Pair {
    fn single(index: usize, weight: u64) -> Self {
        Self {
            weight,
            first: index,
            second: index,
        }
    }

    pub fn is_single(&self) -> bool {
        self.first == self.second
    }
}

/// Pair the nodes of one layer; `weights` is indexed by node position.
pub fn pair_layer(weights: &[u64]) -> Vec<Pair> {
    let mut sorted: Vec<usize> = (0..weights.len()).collect();
    sorted.sort_by_key(|&i| weights[i]);
    pair_sorted(sorted, |i| weights[i])
}

/// Pair indices already sorted by ascending weight.
///
/// The heaviest index is popped first when the count is odd, so it always
/// leads the result.
pub(crate) fn pair_sorted(mut sorted: Vec<usize>, weight: impl Fn(usize) -> u64) -> Vec<Pair> {
    let mut pairs = Vec::with_capacity(sorted.len() / 2 + 1);
    if sorted.len() % 2 == 1 {
        if let Some(odd) = sorted.pop() {
            pairs.push(Pair::single(odd, weight(odd)));
        }
    }
    let n = sorted.len();
    for i in 0..n / 2 {
        let first = sorted[n - 1 - i];
        let second = sorted[i];
        pairs.push(Pair {
            weight: weight(first) + weight(second),
            first,
            second,
        });
    }
    pairs
}

/// Pair layer after layer, starting from the leaf widths.
///
/// `layers[k]` pairs the nodes of tree height `k` into height `k + 1`. The
/// last entry holds exactly one pair. A single leaf yields no layers.
pub fn build_layers(leaf_weights: &[u32]) -> Vec<Vec<Pair>> {
    let mut layers = Vec::new();
    let mut current: Vec<u64> = leaf_weights.iter().map(|&w| u64::from(w)).collect();
    while current.len() > 1 {
        let pairs = pair_layer(&current);
        tracing::debug!(
            height = layers.len(),
            nodes = current.len(),
            pairs = pairs.len(),
            "Paired layer"
        );
        current = pairs.iter().map(|p| p.weight).collect();
        layers.push(pairs);
    }
    layers
}
