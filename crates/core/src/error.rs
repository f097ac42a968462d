//! Error types for slide-deck segmentation.
//!
//! Segmentation itself never fails; these cover the edges around it.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur around segmentation.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input document.
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),

    /// An alignment name other than `center` or `left`.
    #[error("Unknown alignment '{0}' (expected 'center' or 'left')")]
    InvalidAlignment(String),

    /// Failed to encode the deck.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
