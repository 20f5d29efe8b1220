//! # Render Errors
//!
//! Failures while producing an export. The API maps every variant to a
//! generic 500 and logs the detail.

use thiserror::Error;

/// Export rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The PDF backend rejected a font, page or the final serialization.
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    /// The summary could not be encoded as a QR symbol.
    #[error("QR encoding failed: {0}")]
    Qr(String),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
