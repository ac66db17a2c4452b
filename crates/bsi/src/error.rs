use thiserror::Error;

/// Errors raised while encoding or decoding a [`Bsi`](crate::Bsi).
#[derive(Debug, Error)]
pub enum BsiError {
    /// The buffer list did not contain the existence bitmap.
    #[error("missing existence bitmap (expected at least one buffer)")]
    MissingExistence,

    /// A buffer failed the bitmap codec. Index 0 is the existence bitmap,
    /// index `i > 0` is value slice `i - 1`.
    #[error("failed to decode buffer {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    /// More value slices than a signed 64-bit value can use.
    #[error("{0} value slices exceed the 64-bit value domain")]
    TooManySlices(usize),

    #[error("failed to encode bitmap: {0}")]
    Encode(#[from] std::io::Error),
}

/// A specialized Result type for bit-sliced index operations
pub type Result<T> = std::result::Result<T, BsiError>;
