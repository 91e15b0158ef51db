//! Sum-balance split.
//!
//! Leaves are visited widest first. A leaf goes right only while the left
//! side is ahead in total width and either the left side also has more
//! leaves or the leaf is wider than 1% of the whole bus; everything else
//! piles up on the left. Keeping more bits on one side of each merge uses
//! fewer merge resources than a perfectly balanced split, and the count
//! guard keeps narrow channels from all landing on one side.

use super::{Divide, Split, weight_of};

/// Running-sum partition rule (`dividebysum`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SumBalance;

impl Divide for SumBalance {
    fn split(&self, weights: &[u32], indices: &[usize]) -> Split {
        assert!(
            indices.len() >= 2,
            "sum-balance split needs at least two leaves, got {}",
            indices.len()
        );

        let bus_total: u64 = weights.iter().map(|&w| u64::from(w)).sum();

        let mut sorted = indices.to_vec();
        sorted.sort_by(|&a, &b| weights[b].cmp(&weights[a]));

        let (mut left, mut right) = (Vec::new(), Vec::new());
        let (mut suml, mut sumr) = (0u64, 0u64);
        for index in sorted {
            let width = u64::from(weights[index]);
            if suml > sumr && (left.len() > right.len() || width * 100 > bus_total) {
                right.push(index);
                sumr += width;
            } else {
                left.push(index);
                suml += width;
            }
        }

        debug_assert_eq!(suml, weight_of(weights, &left));
        tracing::debug!(
            leaves = indices.len(),
            left = suml,
            right = sumr,
            "Sum-balance split"
        );

        if suml > sumr {
            Split {
                heavier: left,
                lighter: right,
            }
        } else {
            Split {
                heavier: right,
                lighter: left,
            }
        }
    }
}
