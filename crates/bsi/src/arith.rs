//! In-place arithmetic built on a ripple-carry adder over bit slices.

use crate::bsi::MAX_BITS;
use crate::{Bitmap, Bsi};
use tracing::trace;

impl Bsi {
    /// Add `other` to this index row by row.
    ///
    /// The row domain becomes the union of both existence bitmaps; a row
    /// missing from one side contributes 0. The sum is computed for all rows at
    /// once by a full adder per slice, least significant first:
    ///
    /// ```text
    /// sum[i]     = a[i] ^ b[i] ^ carry[i]
    /// carry[i+1] = (a[i] & b[i]) | (carry[i] & (a[i] ^ b[i]))
    /// ```
    ///
    /// A carry out of the top slice appends a new slice. At 64 slices the
    /// carry out of the sign slice is dropped, matching wrapping `i64`
    /// addition.
    pub fn add(&mut self, other: &Bsi) {
        let width = self.bit_count().max(other.bit_count());
        self.grow_to(width);

        let empty = Bitmap::new();
        let mut carry = Bitmap::new();

        for i in 0..width {
            if i >= other.bit_count() && carry.is_empty() {
                break;
            }

            let addend = other.slices.get(i).unwrap_or(&empty);
            let slice = &mut self.slices[i];

            let half = &*slice ^ addend;
            let next_carry = (&*slice & addend) | (&carry & &half);
            *slice = half ^ &carry;
            carry = next_carry;
        }

        if !carry.is_empty() {
            if width < MAX_BITS {
                trace!("carry overflow into slice {} ({} rows)", width, carry.len());
                self.slices.push(carry);
            } else {
                trace!("dropping carry out of sign slice ({} rows)", carry.len());
            }
        }

        self.existence |= &other.existence;
    }

    /// Add 1 to the value of every row in `filter`.
    ///
    /// Rows of `filter` without a value are inserted with value 1.
    pub fn increment(&mut self, filter: &Bitmap) {
        let one = Bsi {
            max_value: 1,
            min_value: 0,
            existence: filter.clone(),
            slices: vec![filter.clone()],
        };
        self.add(&one);
    }

    /// Add 1 to the value of every row.
    pub fn increment_all(&mut self) {
        let rows = self.existence.clone();
        self.increment(&rows);
    }
}
