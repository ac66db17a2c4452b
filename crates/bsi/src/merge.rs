use crate::Bsi;
use rayon::prelude::*;
use tracing::trace;

impl Bsi {
    /// Merge `other` into this index by OR-ing slices and existence bitmaps.
    ///
    /// Intended for indexes over disjoint rows. A row present in both ends up
    /// with the bitwise OR of its two bit patterns, not their sum; use
    /// [`add`](Self::add) for arithmetic merging. With `parallelism > 1` the
    /// slices are OR-ed in that many concurrent groups.
    pub fn par_or(&mut self, parallelism: usize, other: &Bsi) {
        let width = other.bit_count();
        self.grow_to(width);

        let mine = &mut self.slices[..width];
        let theirs = &other.slices[..];

        if parallelism <= 1 || width < 2 {
            for (slice, addend) in mine.iter_mut().zip(theirs) {
                *slice |= addend;
            }
        } else {
            let group = width.div_ceil(parallelism);
            trace!("or-ing {} slices in groups of {}", width, group);

            mine.par_chunks_mut(group)
                .zip(theirs.par_chunks(group))
                .for_each(|(slices, addends)| {
                    for (slice, addend) in slices.iter_mut().zip(addends) {
                        *slice |= addend;
                    }
                });
        }

        self.existence |= &other.existence;
    }
}
