//! Partition strategies — how a set of leaves is divided at each tree node.
//!
//! Two strategies are recursive: they implement [`Divide`] and the planner
//! asks them to split the leaves below every merge node. The greedy
//! strategy instead pairs whole layers bottom-up (see [`greedy`]).

pub mod greedy;
pub mod knapsack;
pub mod sum_balance;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use greedy::{Pair, pair_layer};
pub use knapsack::KnapsackDp;
pub use sum_balance::SumBalance;

/// The result of dividing a leaf index set into two subsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// The subset with the larger total weight; planned first.
    pub heavier: Vec<usize>,
    /// The remaining subset.
    pub lighter: Vec<usize>,
}

/// A recursive partition rule.
///
/// `weights` holds every leaf weight of the bus indexed by leaf index;
/// `indices` is the subset to divide. Callers pass at least two indices and
/// both returned subsets are non-empty.
pub trait Divide {
    fn split(&self, weights: &[u32], indices: &[usize]) -> Split;
}

/// Selectable partition strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Greedy sum-balance split, favoring a heavier left side.
    #[default]
    #[serde(rename = "dividebysum")]
    SumBalance,
    /// Max/min pairing followed by a 0/1 subset-sum split.
    #[serde(rename = "divdp")]
    KnapsackDp,
    /// Layer-by-layer max/min pairing without recursive splits.
    #[serde(rename = "greedy")]
    Greedy,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::SumBalance, Strategy::KnapsackDp, Strategy::Greedy];

    /// The configuration name of this strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::SumBalance => "dividebysum",
            Strategy::KnapsackDp => "divdp",
            Strategy::Greedy => "greedy",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Strategy::SumBalance => {
                "split by running sums, wider channels on the left (saves merge resources)"
            }
            Strategy::KnapsackDp => "pair max with min, then split the pairs by 0/1 subset-sum",
            Strategy::Greedy => "pair max with min layer by layer, bottom-up",
        }
    }

    /// Comma-separated list of all strategy names.
    pub fn choices() -> String {
        Self::ALL
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name() == wanted)
            .ok_or_else(|| crate::Error::UnknownStrategy {
                name: wanted.to_string(),
                choices: Self::choices(),
            })
    }
}

/// Sum of the weights of `indices`.
pub(crate) fn weight_of(weights: &[u32], indices: &[usize]) -> u64 {
    indices.iter().map(|&i| u64::from(weights[i])).sum()
}
