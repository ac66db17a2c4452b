//! Compressed bitmap of 64-bit row identifiers.

use roaring::RoaringTreemap;
use std::io;
use std::ops::{
    BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, RangeBounds, Sub,
    SubAssign,
};

/// A compressed set of row identifiers.
///
/// Wraps [`RoaringTreemap`] so that every bit slice, the existence bitmap and
/// every query result share one type. Supports AND/OR/XOR/difference in all
/// owned and borrowed combinations.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Bitmap(pub RoaringTreemap);

impl Bitmap {
    /// Create an empty bitmap.
    pub fn new() -> Self {
        Self(RoaringTreemap::new())
    }

    /// Create a bitmap holding exactly `values`, in any order.
    pub fn of(values: &[u64]) -> Self {
        values.iter().copied().collect()
    }

    /// Add `value`; returns `true` if it was not already present.
    pub fn insert(&mut self, value: u64) -> bool {
        self.0.insert(value)
    }

    /// Remove `value`; returns `true` if it was present.
    pub fn remove(&mut self, value: u64) -> bool {
        self.0.remove(value)
    }

    /// Test whether `value` is in the bitmap.
    pub fn contains(&self, value: u64) -> bool {
        self.0.contains(value)
    }

    /// Count set bits (population count).
    pub fn len(&self) -> u64 {
        self.0.len()
    }

    /// Returns `true` if no bits are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Smallest member, if any.
    pub fn min(&self) -> Option<u64> {
        self.0.min()
    }

    /// Largest member, if any.
    pub fn max(&self) -> Option<u64> {
        self.0.max()
    }

    /// Iterate over set bits in ascending order.
    pub fn iter(&self) -> roaring::treemap::Iter<'_> {
        self.0.iter()
    }

    /// Number of bytes [`serialize_into`](Self::serialize_into) will write.
    pub fn serialized_size(&self) -> usize {
        self.0.serialized_size()
    }

    /// Write the portable roaring encoding of this bitmap.
    pub fn serialize_into<W: io::Write>(&self, writer: W) -> io::Result<()> {
        self.0.serialize_into(writer)
    }

    /// Read a bitmap previously written by [`serialize_into`](Self::serialize_into).
    pub fn deserialize_from<R: io::Read>(reader: R) -> io::Result<Self> {
        RoaringTreemap::deserialize_from(reader).map(Self)
    }

    /// The `n`th smallest row (0-based), or `None` if `n >= len()`.
    pub fn select(&self, n: u64) -> Option<u64> {
        self.0.select(n)
    }

    /// Remove every row in `range`, returning how many were removed.
    pub fn remove_range<R: RangeBounds<u64>>(&mut self, range: R) -> u64 {
        self.0.remove_range(range)
    }
}

impl FromIterator<u64> for Bitmap {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self(RoaringTreemap::from_iter(iter))
    }
}

impl<'a> IntoIterator for &'a Bitmap {
    type Item = u64;
    type IntoIter = roaring::treemap::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

macro_rules! bitmap_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident) => {
        impl $assign_trait<&Bitmap> for Bitmap {
            fn $assign_method(&mut self, rhs: &Bitmap) {
                $assign_trait::$assign_method(&mut self.0, &rhs.0);
            }
        }

        impl $assign_trait<Bitmap> for Bitmap {
            fn $assign_method(&mut self, rhs: Bitmap) {
                $assign_trait::$assign_method(&mut self.0, rhs.0);
            }
        }

        impl $trait for &Bitmap {
            type Output = Bitmap;

            fn $method(self, rhs: &Bitmap) -> Bitmap {
                Bitmap($trait::$method(&self.0, &rhs.0))
            }
        }

        impl $trait<Bitmap> for &Bitmap {
            type Output = Bitmap;

            fn $method(self, rhs: Bitmap) -> Bitmap {
                Bitmap($trait::$method(&self.0, rhs.0))
            }
        }

        impl $trait<&Bitmap> for Bitmap {
            type Output = Bitmap;

            fn $method(self, rhs: &Bitmap) -> Bitmap {
                Bitmap($trait::$method(self.0, &rhs.0))
            }
        }

        impl $trait for Bitmap {
            type Output = Bitmap;

            fn $method(self, rhs: Bitmap) -> Bitmap {
                Bitmap($trait::$method(self.0, rhs.0))
            }
        }
    };
}

bitmap_op!(BitAnd, bitand, BitAndAssign, bitand_assign);
bitmap_op!(BitOr, bitor, BitOrAssign, bitor_assign);
bitmap_op!(BitXor, bitxor, BitXorAssign, bitxor_assign);
bitmap_op!(Sub, sub, SubAssign, sub_assign);
