use crate::bsi::MAX_BITS;
use crate::{parallel, Bitmap, Bsi};
use std::collections::BTreeMap;

impl Bsi {
    /// Sum and count of the values of rows in `filter` (or of all rows).
    ///
    /// Computed as a weighted popcount: slice `i` contributes `2^i` per
    /// matching row, except the sign slice of a 64-slice index which
    /// contributes `-2^63`. The sum wraps if it does not fit in an `i64`.
    pub fn sum(&self, filter: Option<&Bitmap>) -> (i64, u64) {
        let candidates = self.candidates(filter);

        let total = self
            .slices
            .iter()
            .enumerate()
            .fold(0i128, |acc, (i, slice)| {
                let weight = if i == MAX_BITS - 1 {
                    -(1i128 << i)
                } else {
                    1i128 << i
                };
                acc + weight * (slice & &candidates).len() as i128
            });

        (total as i64, candidates.len())
    }

    /// The set of distinct values held by the index.
    ///
    /// Values are reported as row IDs of the result, negative values as their
    /// two's-complement bit pattern.
    pub fn transpose(&self) -> Bitmap {
        self.iter().map(|(_, value)| value as u64).collect()
    }

    /// Histogram of the values held by rows in `filter` (or by all rows).
    ///
    /// The returned index maps each distinct value (as a row ID, negative
    /// values by their bit pattern) to the number of rows holding it. Partial
    /// histograms of the shards are combined with [`add`](Self::add).
    pub fn transpose_with_counts(&self, parallelism: usize, filter: Option<&Bitmap>) -> Bsi {
        parallel::fan_out(
            self.candidates(filter),
            parallelism,
            |shard| self.histogram(&shard),
            |mut acc, part| {
                acc.add(&part);
                acc
            },
        )
    }

    fn histogram(&self, rows: &Bitmap) -> Bsi {
        let mut counts: BTreeMap<u64, i64> = BTreeMap::new();
        for row in rows {
            if let Some(value) = self.get_value(row) {
                *counts.entry(value as u64).or_default() += 1;
            }
        }

        let mut histogram = Bsi::new_default();
        histogram.set_values(counts);
        histogram
    }
}
