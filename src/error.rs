//! Error types for element and material construction.

use thiserror::Error;

/// Result type alias using the crate Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building materials or elements.
///
/// The evaluation paths themselves are total functions over well-formed
/// numeric buffers and never fail; validation happens at construction.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid material parameters.
    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    /// Degenerate element geometry (singular rest shape).
    #[error("degenerate element: {0}")]
    DegenerateElement(String),
}
