//! Bit-sliced index of signed 64-bit values keyed by 64-bit row IDs.
//!
//! A [`Bsi`] stores one compressed [`Bitmap`] per value bit plus an
//! existence bitmap. Comparisons, sums, min/max and addition run directly on
//! the bitmaps with boolean algebra; integers are only materialized at the
//! edges ([`Bsi::get_value`], [`Bsi::transpose`]).
//!
//! # Example
//!
//! ```
//! use bsi::{Bitmap, Bsi, Operation};
//!
//! let mut ages = Bsi::new_default();
//! for (row, age) in [(1, 34), (2, 17), (3, 52), (4, 34)] {
//!     ages.set_value(row, age);
//! }
//!
//! let adults = ages.compare_value(0, Operation::Ge, 18, 0, None);
//! assert_eq!(adults, Bitmap::of(&[1, 3, 4]));
//!
//! let (sum, count) = ages.sum(Some(&adults));
//! assert_eq!((sum, count), (120, 3));
//!
//! let buffers = ages.marshal_binary().unwrap();
//! let restored = Bsi::from_buffers(&buffers).unwrap();
//! assert_eq!(restored.get_value(3), Some(52));
//! ```
//!
//! # Parallelism
//!
//! Bulk operations take a `parallelism` argument. `0` or `1` runs inline;
//! larger values split the work into that many disjoint shards executed on
//! the rayon thread pool, and combine the partial results.

mod aggregate;
mod arith;
mod bitmap;
mod bsi;
mod codec;
mod compare;
mod error;
mod merge;
mod parallel;

#[cfg(test)]
mod tests_model;

pub use bitmap::Bitmap;
pub use bsi::Bsi;
pub use compare::{MinMax, Operation};
pub use error::{BsiError, Result};
