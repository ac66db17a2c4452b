//! Flat binary layout of a [`Bsi`].
//!
//! ```text
//! buffer 0        existence bitmap
//! buffer 1        value slice 0 (least significant bit)
//! ...
//! buffer n        value slice n-1
//! ```
//!
//! Every buffer is an independent portable roaring treemap encoding.

use crate::bsi::MAX_BITS;
use crate::error::{BsiError, Result};
use crate::{Bitmap, Bsi};
use tracing::{debug, warn};

impl Bsi {
    /// Encode the index as one buffer per bitmap, existence first.
    pub fn marshal_binary(&self) -> Result<Vec<Vec<u8>>> {
        std::iter::once(&self.existence)
            .chain(&self.slices)
            .map(|bitmap| -> Result<Vec<u8>> {
                let mut buf = Vec::with_capacity(bitmap.serialized_size());
                bitmap.serialize_into(&mut buf)?;
                Ok(buf)
            })
            .collect()
    }

    /// Replace the contents of this index with the decoded `buffers`.
    ///
    /// The bit count becomes `buffers.len() - 1`. Every buffer is decoded
    /// before anything is replaced, so on error the index is left unchanged.
    /// The construction bounds are kept.
    pub fn unmarshal_binary<B: AsRef<[u8]>>(&mut self, buffers: &[B]) -> Result<()> {
        let (existence, slices) = decode(buffers)?;

        self.existence = existence;
        self.slices = slices;

        debug!(
            "decoded bit-sliced index: bit_count={}, cardinality={}",
            self.bit_count(),
            self.get_cardinality()
        );
        Ok(())
    }

    /// Decode an auto-sized index from `buffers`.
    pub fn from_buffers<B: AsRef<[u8]>>(buffers: &[B]) -> Result<Self> {
        let mut bsi = Self::new_default();
        bsi.unmarshal_binary(buffers)?;
        Ok(bsi)
    }

    /// Total number of bytes [`marshal_binary`](Self::marshal_binary) produces.
    pub fn serialized_size(&self) -> usize {
        std::iter::once(&self.existence)
            .chain(&self.slices)
            .map(Bitmap::serialized_size)
            .sum()
    }
}

fn decode<B: AsRef<[u8]>>(buffers: &[B]) -> Result<(Bitmap, Vec<Bitmap>)> {
    if buffers.is_empty() {
        return Err(BsiError::MissingExistence);
    }
    if buffers.len() - 1 > MAX_BITS {
        return Err(BsiError::TooManySlices(buffers.len() - 1));
    }

    let mut bitmaps = buffers
        .iter()
        .enumerate()
        .map(|(index, buf)| {
            Bitmap::deserialize_from(buf.as_ref()).map_err(|source| {
                warn!("bitmap buffer {} failed to decode: {}", index, source);
                BsiError::Decode { index, source }
            })
        })
        .collect::<Result<Vec<Bitmap>>>()?;

    let existence = bitmaps.remove(0);
    Ok((existence, bitmaps))
}

/// Deserialization shape of a [`Bsi`], validated before conversion.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
pub(crate) struct BsiParts {
    max_value: i64,
    min_value: i64,
    existence: Bitmap,
    slices: Vec<Bitmap>,
}

#[cfg(feature = "serde")]
impl TryFrom<BsiParts> for Bsi {
    type Error = BsiError;

    fn try_from(parts: BsiParts) -> Result<Self> {
        if parts.slices.len() > MAX_BITS {
            return Err(BsiError::TooManySlices(parts.slices.len()));
        }

        Ok(Bsi {
            max_value: parts.max_value,
            min_value: parts.min_value,
            existence: parts.existence,
            slices: parts.slices,
        })
    }
}
