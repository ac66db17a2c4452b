//! Bit-sliced comparison.
//!
//! Every predicate is answered by one sweep from the most significant slice
//! down to the least, partitioning the candidate rows into three disjoint
//! bitmaps:
//!
//! - `gt`: rows whose prefix already exceeds the target's prefix
//! - `lt`: rows whose prefix is already below it
//! - `eq`: rows still tied, carried to the next lower slice
//!
//! Rows left in `eq` after the last slice hold exactly the target value. The
//! sweep stops early once nothing is tied.

use crate::bsi::{bits_required, MAX_BITS};
use crate::{parallel, Bitmap, Bsi};
use tracing::warn;

/// Comparison predicate for [`Bsi::compare_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `value == a`
    Eq,
    /// `value != a`
    Ne,
    /// `value < a`
    Lt,
    /// `value <= a`
    Le,
    /// `value > a`
    Gt,
    /// `value >= a`
    Ge,
    /// `a <= value <= b`
    Range,
}

/// Which extremum [`Bsi::min_max`] looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinMax {
    Min,
    Max,
}

struct Sweep {
    eq: Bitmap,
    gt: Bitmap,
    lt: Bitmap,
}

impl Bsi {
    /// Rows whose value satisfies `op` against `a` (and `b` for
    /// [`Operation::Range`]).
    ///
    /// Only rows holding a value can match; when `filter` is given the result
    /// is further restricted to it. With `parallelism > 1` the candidate rows
    /// are split into that many shards swept concurrently.
    pub fn compare_value(
        &self,
        parallelism: usize,
        op: Operation,
        a: i64,
        b: i64,
        filter: Option<&Bitmap>,
    ) -> Bitmap {
        if op == Operation::Range && a > b {
            warn!("empty range comparison: lower bound {} exceeds upper bound {}", a, b);
            return Bitmap::new();
        }

        parallel::fan_out(
            self.candidates(filter),
            parallelism,
            |shard| self.compare_shard(op, a, b, shard),
            |acc, part| acc | part,
        )
    }

    /// Rows whose value equals any of `values`.
    ///
    /// Equivalent to the union of [`Operation::Eq`] queries, but every shard
    /// intersects each slice with its rows once and reuses that for all
    /// values.
    pub fn batch_equal(&self, parallelism: usize, values: &[i64]) -> Bitmap {
        let mut targets: Vec<i64> = values
            .iter()
            .copied()
            .filter(|&value| bits_required(value) <= self.bit_count())
            .collect();
        targets.sort_unstable();
        targets.dedup();

        if targets.is_empty() {
            return Bitmap::new();
        }

        parallel::fan_out(
            self.existence.clone(),
            parallelism,
            |shard| self.batch_equal_shard(&targets, shard),
            |acc, part| acc | part,
        )
    }

    /// Smallest or largest value among the rows with a value (restricted to
    /// `filter` when given), or `None` when there are no such rows.
    ///
    /// Found by narrowing the candidate set slice by slice, never by reading
    /// individual values.
    pub fn min_max(&self, parallelism: usize, op: MinMax, filter: Option<&Bitmap>) -> Option<i64> {
        parallel::fan_out(
            self.candidates(filter),
            parallelism,
            |shard| self.extremum(op, shard),
            |acc, part| {
                acc.into_iter().chain(part).reduce(|x, y| match op {
                    MinMax::Min => x.min(y),
                    MinMax::Max => x.max(y),
                })
            },
        )
    }

    fn compare_shard(&self, op: Operation, a: i64, b: i64, candidates: Bitmap) -> Bitmap {
        let Sweep { eq, gt, lt } = self.sweep(candidates, a);
        match op {
            Operation::Eq => eq,
            Operation::Ne => gt | lt,
            Operation::Lt => lt,
            Operation::Le => lt | eq,
            Operation::Gt => gt,
            Operation::Ge => gt | eq,
            Operation::Range => {
                // Second sweep only over rows already >= a.
                let upper = self.sweep(gt | eq, b);
                upper.lt | upper.eq
            }
        }
    }

    fn sweep(&self, candidates: Bitmap, target: i64) -> Sweep {
        let width = self.bit_count().max(bits_required(target));
        let pattern = target as u64;
        let empty = Bitmap::new();

        let mut eq = candidates;
        let mut gt = Bitmap::new();
        let mut lt = Bitmap::new();

        for i in (0..width).rev() {
            if eq.is_empty() {
                break;
            }

            let slice = self.slices.get(i).unwrap_or(&empty);
            let ones = &eq & slice;
            let zeros = eq - &ones;

            // A set sign bit means a smaller value.
            let (above, below) = if i == MAX_BITS - 1 {
                (&mut lt, &mut gt)
            } else {
                (&mut gt, &mut lt)
            };

            if (pattern >> i) & 1 == 1 {
                *below |= zeros;
                eq = ones;
            } else {
                *above |= ones;
                eq = zeros;
            }
        }

        Sweep { eq, gt, lt }
    }

    fn batch_equal_shard(&self, targets: &[i64], shard: Bitmap) -> Bitmap {
        let masked: Vec<Bitmap> = self.slices.iter().map(|slice| slice & &shard).collect();
        let mut result = Bitmap::new();

        for &target in targets {
            let pattern = target as u64;
            let mut eq = shard.clone();

            for (i, slice) in masked.iter().enumerate().rev() {
                if (pattern >> i) & 1 == 1 {
                    eq &= slice;
                } else {
                    eq -= slice;
                }
                if eq.is_empty() {
                    break;
                }
            }

            result |= eq;
        }

        result
    }

    fn extremum(&self, op: MinMax, candidates: Bitmap) -> Option<i64> {
        if candidates.is_empty() {
            return None;
        }

        let mut remaining = candidates;
        let mut pattern = 0u64;

        for (i, slice) in self.slices.iter().enumerate().rev() {
            // Max keeps rows with the bit set, Min keeps rows without it; the
            // sign slice inverts the preference.
            let prefer_set = (op == MinMax::Max) != (i == MAX_BITS - 1);
            let ones = &remaining & slice;

            if prefer_set {
                if !ones.is_empty() {
                    remaining = ones;
                    pattern |= 1 << i;
                }
            } else {
                let zeros = &remaining - &ones;
                if zeros.is_empty() {
                    pattern |= 1 << i;
                } else {
                    remaining = zeros;
                }
            }
        }

        Some(pattern as i64)
    }
}
