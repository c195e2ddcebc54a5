//! Error types for spriteforge.

use thiserror::Error;

/// Errors produced by packing, layout, and pixel processing operations.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// Width or height was zero, or the RGBA byte length overflowed `usize`.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// No sprites were supplied to a packing or layout operation.
    #[error("empty input: at least one sprite is required")]
    EmptyInput,

    /// An argument was outside the range the operation can work with.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An RGBA buffer did not have `width * height * 4` bytes.
    #[error("buffer size mismatch: expected {expected} bytes, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },

    /// No candidate surface up to the maximum size fits every sprite.
    #[error("{sprites} sprite(s) do not fit within maximum atlas size {max_size}x{max_size}")]
    PackingInfeasible { sprites: usize, max_size: u32 },

    /// Metadata could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Encoding, decoding, or file I/O failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for ForgeError {
    fn from(e: serde_json::Error) -> Self {
        ForgeError::Serialization(e.to_string())
    }
}
