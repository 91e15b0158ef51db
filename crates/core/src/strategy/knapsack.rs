//! Subset-sum split over max/min pairs.
//!
//! The leaves are first grouped into units: the heaviest leaf alone when
//! the count is odd, then (heaviest, lightest), (second heaviest, second
//! lightest), ... Units have a smaller spread of widths than raw leaves,
//! which gives the 0/1 subset-sum pass better splits. The units that fill
//! half of the total width most closely form the lighter side.

use std::collections::BTreeSet;

use super::greedy::{Pair, pair_sorted};
use super::{Divide, Split, weight_of};

/// Pairing plus 0/1 subset-sum partition rule (`divdp`).
#[derive(Debug, Clone, Copy, Default)]
pub struct KnapsackDp;

impl KnapsackDp {
    /// Largest keep table the planner will build for one split.
    pub const MAX_TABLE_CELLS: u64 = 1 << 26;

    /// Keep-table cells needed to split all of `weights` at once.
    ///
    /// Every deeper split covers fewer units and a smaller half, so this
    /// bounds the whole plan.
    pub fn table_cells(weights: &[u32]) -> u64 {
        let units = weights.len().div_ceil(2) as u64;
        let half = weights.iter().map(|&w| u64::from(w)).sum::<u64>() / 2;
        units.saturating_mul(half + 1)
    }

    /// The pairing units considered by the subset-sum pass.
    pub fn units(weights: &[u32], indices: &[usize]) -> Vec<Pair> {
        pair_sorted(sorted_ascending(weights, indices), |i| u64::from(weights[i]))
    }
}

impl Divide for KnapsackDp {
    fn split(&self, weights: &[u32], indices: &[usize]) -> Split {
        assert!(
            indices.len() >= 2,
            "subset-sum split needs at least two leaves, got {}",
            indices.len()
        );

        let sorted = sorted_ascending(weights, indices);
        if let [lighter, heavier] = sorted[..] {
            return Split {
                heavier: vec![heavier],
                lighter: vec![lighter],
            };
        }

        let units = Self::units(weights, indices);
        let unit_weights: Vec<u64> = units.iter().map(|u| u.weight).collect();
        let half = weight_of(weights, indices) / 2;
        let chosen = subset_sum(&unit_weights, half);

        let lighter: BTreeSet<usize> = chosen
            .iter()
            .flat_map(|&u| [units[u].first, units[u].second])
            .collect();
        let heavier: BTreeSet<usize> = indices
            .iter()
            .copied()
            .filter(|i| !lighter.contains(i))
            .collect();

        tracing::debug!(
            leaves = indices.len(),
            units = units.len(),
            half,
            "Subset-sum split"
        );

        Split {
            heavier: heavier.into_iter().collect(),
            lighter: lighter.into_iter().collect(),
        }
    }
}

fn sorted_ascending(weights: &[u32], indices: &[usize]) -> Vec<usize> {
    let mut sorted = indices.to_vec();
    sorted.sort_by_key(|&i| weights[i]);
    sorted
}

/// 0/1 subset-sum: pick items whose total is as large as possible without
/// exceeding `capacity`. Returns the chosen item positions, last item first.
///
/// A cell only changes on a strict improvement, so among equal sums the
/// earliest found selection wins.
fn subset_sum(items: &[u64], capacity: u64) -> Vec<usize> {
    let cap = capacity as usize;
    let mut best = vec![0u64; cap + 1];
    let mut keep = vec![vec![false; cap + 1]; items.len()];

    for (item, &weight) in items.iter().enumerate() {
        let w = weight as usize;
        if w > cap {
            continue;
        }
        for j in (w..=cap).rev() {
            let candidate = best[j - w] + weight;
            if best[j] < candidate {
                best[j] = candidate;
                keep[item][j] = true;
            }
        }
    }

    let mut chosen = Vec::new();
    let mut j = cap;
    for item in (0..items.len()).rev() {
        if keep[item][j] {
            chosen.push(item);
            j -= items[item] as usize;
        }
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(weights: &[u32], indices: &[usize]) -> u64 {
        weight_of(weights, indices)
    }

    #[test]
    fn table_cells_cover_units_and_half() {
        // 3 units, half of 46 is 23.
        assert_eq!(KnapsackDp::table_cells(&[4, 10, 1, 7, 2, 22]), 3 * 24);
        assert!(KnapsackDp::table_cells(&[u32::MAX; 3]) > KnapsackDp::MAX_TABLE_CELLS);
    }

    #[test]
    fn two_leaves_short_circuit() {
        let split = KnapsackDp.split(&[9, 3], &[0, 1]);
        assert_eq!(split.heavier, vec![0]);
        assert_eq!(split.lighter, vec![1]);
    }

    #[test]
    fn two_equal_leaves_put_the_later_one_first() {
        let split = KnapsackDp.split(&[8, 8], &[0, 1]);
        assert_eq!(split.heavier, vec![1]);
        assert_eq!(split.lighter, vec![0]);
    }

    #[test]
    fn units_pop_heaviest_when_odd() {
        let units = KnapsackDp::units(&[4, 10, 1, 7, 2], &[0, 1, 2, 3, 4]);
        let shape: Vec<(usize, usize, u64)> =
            units.iter().map(|u| (u.first, u.second, u.weight)).collect();
        assert_eq!(shape, vec![(1, 1, 10), (3, 2, 8), (0, 4, 6)]);
    }

    #[test]
    fn subset_sum_fills_capacity_exactly_when_possible() {
        let mut chosen = subset_sum(&[10, 8, 6], 12);
        chosen.sort();
        assert_eq!(chosen, vec![0]);
        let mut chosen = subset_sum(&[5, 8, 6], 11);
        chosen.sort();
        assert_eq!(chosen, vec![0, 2]);
    }

    #[test]
    fn subset_sum_skips_items_over_capacity() {
        assert!(subset_sum(&[20, 30], 10).is_empty());
    }

    #[test]
    fn lighter_side_never_exceeds_half() {
        let weights = [32, 36, 32, 32, 36, 32, 32, 36, 32, 531, 18, 91, 593, 91];
        let indices: Vec<usize> = (0..weights.len()).collect();
        let split = KnapsackDp.split(&weights, &indices);
        let total = sum(&weights, &indices);
        assert!(sum(&weights, &split.lighter) <= total / 2);
        assert_eq!(
            sum(&weights, &split.lighter) + sum(&weights, &split.heavier),
            total
        );
        assert_eq!(split.lighter.len() + split.heavier.len(), weights.len());
    }

    #[test]
    fn difference_is_optimal_over_units() {
        let cases: [&[u32]; 4] = [
            &[32, 36, 32, 32, 36, 32, 32, 36, 32, 531, 18, 91, 593, 91],
            &[18, 531, 91, 593, 91, 2, 34, 2, 34, 2, 34],
            &[1, 2, 3, 4, 5, 6, 7],
            &[100, 1, 1, 1],
        ];
        for weights in cases {
            let indices: Vec<usize> = (0..weights.len()).collect();
            let split = KnapsackDp.split(weights, &indices);
            let achieved = sum(weights, &split.heavier) - sum(weights, &split.lighter);

            let units = KnapsackDp::units(weights, &indices);
            let total: u64 = units.iter().map(|u| u.weight).sum();
            let best = (0u32..1 << units.len())
                .map(|mask| {
                    let picked: u64 = units
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| mask & (1 << i) != 0)
                        .map(|(_, u)| u.weight)
                        .sum();
                    picked.abs_diff(total - picked)
                })
                .min()
                .unwrap();
            assert_eq!(achieved, best, "weights {weights:?}");
        }
    }

    #[test]
    fn subsets_are_in_index_order() {
        let weights = [7, 1, 6, 2, 5, 3];
        let split = KnapsackDp.split(&weights, &[0, 1, 2, 3, 4, 5]);
        assert!(split.heavier.windows(2).all(|w| w[0] < w[1]));
        assert!(split.lighter.windows(2).all(|w| w[0] < w[1]));
        assert!(!split.lighter.is_empty());
        assert!(!split.heavier.is_empty());
    }
}
