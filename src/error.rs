//! Error types for palette extraction and manipulation.

use thiserror::Error;

/// Errors surfaced by [`PaletteEngine`](crate::PaletteEngine) operations.
///
/// Every failing operation leaves the engine exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PaletteError {
    /// A color count or brightness threshold was out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The pixel set has fewer distinct colors than the requested cluster count.
    #[error("only {distinct} distinct colors available, cannot extract {requested}")]
    InsufficientData { distinct: usize, requested: usize },

    /// Filtering would leave too few pixels to cluster.
    #[error("filter would leave {remaining} pixels, at least {required} are needed")]
    InsufficientSamples { remaining: usize, required: usize },
}

/// Result alias for palette operations.
pub type Result<T> = std::result::Result<T, PaletteError>;
