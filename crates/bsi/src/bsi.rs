use crate::Bitmap;
use tracing::trace;

/// Number of slices needed to encode any `i64` in two's complement.
///
/// Once an index reaches this width its top slice is the sign slice.
pub(crate) const MAX_BITS: usize = 64;

/// Number of slices needed to encode `value`.
///
/// Non-negative values use their unsigned bit length; negative values need
/// the full two's-complement width.
pub(crate) fn bits_required(value: i64) -> usize {
    if value < 0 {
        MAX_BITS
    } else {
        (u64::BITS - (value as u64).leading_zeros()) as usize
    }
}

/// A bit-sliced index over signed 64-bit values.
///
/// Row `r` holds value `v` when `r` is in the existence bitmap and, for every
/// bit position `i`, `r` is in `slices[i]` exactly when bit `i` of `v` is set.
/// Slice 0 is the least significant bit.
///
/// Values are kept in two's complement over [`bit_count`](Self::bit_count)
/// slices. While the index is narrower than 64 slices every stored value is
/// non-negative; storing a negative value widens it to 64 slices, making the
/// top slice the sign slice.
///
/// All mutation goes through `&mut self`, so callers serialize writers; shared
/// references may be used for concurrent reads.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "crate::codec::BsiParts")
)]
pub struct Bsi {
    // Advisory domain bounds supplied at construction
    pub(crate) max_value: i64,
    pub(crate) min_value: i64,
    // Rows that currently hold a value
    pub(crate) existence: Bitmap,
    // One bitmap per value bit, least significant first
    pub(crate) slices: Vec<Bitmap>,
}

impl Bsi {
    /// Create an empty index pre-sized for values in `min_value..=max_value`.
    ///
    /// The bounds are advisory: the width still grows when a wider value is
    /// stored.
    pub fn new(max_value: i64, min_value: i64) -> Self {
        let width = bits_required(max_value).max(bits_required(min_value));

        Self {
            max_value,
            min_value,
            existence: Bitmap::new(),
            slices: vec![Bitmap::new(); width],
        }
    }

    /// Create an empty index whose width is derived purely from stored data.
    pub fn new_default() -> Self {
        Self::default()
    }

    /// The upper bound supplied at construction.
    pub fn max_value(&self) -> i64 {
        self.max_value
    }

    /// The lower bound supplied at construction.
    pub fn min_value(&self) -> i64 {
        self.min_value
    }

    /// Current number of value slices.
    pub fn bit_count(&self) -> usize {
        self.slices.len()
    }

    /// Number of rows holding a value.
    pub fn get_cardinality(&self) -> u64 {
        self.existence.len()
    }

    /// Rows holding a value.
    pub fn get_existence_bitmap(&self) -> &Bitmap {
        &self.existence
    }

    /// The value slices, least significant first.
    pub fn slices(&self) -> &[Bitmap] {
        &self.slices
    }

    /// Whether `row` holds a value.
    pub fn value_exists(&self, row: u64) -> bool {
        self.existence.contains(row)
    }

    /// Store `value` for `row`, replacing any previous value.
    ///
    /// Membership of `row` is recomputed in every slice, so switching sign or
    /// magnitude never leaves stale bits behind.
    pub fn set_value(&mut self, row: u64, value: i64) {
        self.grow_to(bits_required(value));
        self.write_pattern(row, value as u64);
    }

    /// Store a batch of `(row, value)` pairs, growing the index once.
    ///
    /// Later pairs win when a row appears more than once.
    pub fn set_values<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (u64, i64)>,
    {
        let values: Vec<(u64, i64)> = values.into_iter().collect();

        let width = values
            .iter()
            .map(|&(_, value)| bits_required(value))
            .max()
            .unwrap_or(0);
        self.grow_to(width);

        for (row, value) in values {
            self.write_pattern(row, value as u64);
        }
    }

    /// Read the value stored for `row`, or `None` if the row has no value.
    pub fn get_value(&self, row: u64) -> Option<i64> {
        if !self.existence.contains(row) {
            return None;
        }

        let pattern = self
            .slices
            .iter()
            .enumerate()
            .filter(|(_, slice)| slice.contains(row))
            .fold(0u64, |acc, (i, _)| acc | (1 << i));

        // Below 64 slices the pattern is non-negative; at 64 the cast
        // reinterprets the sign slice.
        Some(pattern as i64)
    }

    /// Iterate over `(row, value)` pairs in ascending row order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, i64)> + '_ {
        self.existence
            .iter()
            .filter_map(|row| self.get_value(row).map(|value| (row, value)))
    }

    /// Erase every row of `filter` from the index.
    pub fn clear_values(&mut self, filter: &Bitmap) {
        self.existence -= filter;
        for slice in &mut self.slices {
            *slice -= filter;
        }
    }

    /// Deep copy holding only the rows present in both the index and `found`.
    pub fn new_bsi_retain_set(&self, found: &Bitmap) -> Bsi {
        let existence = &self.existence & found;
        let slices = self
            .slices
            .iter()
            .map(|slice| slice & &existence)
            .collect();

        Bsi {
            max_value: self.max_value,
            min_value: self.min_value,
            existence,
            slices,
        }
    }

    /// Rows with a value, restricted to `filter` when given.
    pub(crate) fn candidates(&self, filter: Option<&Bitmap>) -> Bitmap {
        match filter {
            Some(filter) => &self.existence & filter,
            None => self.existence.clone(),
        }
    }

    /// Append empty slices until the index is at least `width` wide.
    pub(crate) fn grow_to(&mut self, width: usize) {
        if width > self.slices.len() {
            trace!("growing bit slices from {} to {}", self.slices.len(), width);
            self.slices.resize_with(width, Bitmap::new);
        }
    }

    fn write_pattern(&mut self, row: u64, pattern: u64) {
        for (i, slice) in self.slices.iter_mut().enumerate() {
            if (pattern >> i) & 1 == 1 {
                slice.insert(row);
            } else {
                slice.remove(row);
            }
        }
        self.existence.insert(row);
    }
}
