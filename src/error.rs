//! Error types for slicepdf library.

use std::io;
use thiserror::Error;

/// Result type alias for slicepdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during pagination and export.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A content block could not be rasterized. Fatal to the whole run.
    #[error("Failed to rasterize block {index}: {source}")]
    Rasterization {
        /// Zero-based position of the block in the input sequence
        index: usize,
        /// Underlying adapter failure
        #[source]
        source: RasterizeError,
    },

    /// Pagination was cancelled through a cancellation token.
    #[error("Pagination cancelled")]
    Cancelled,

    /// Page geometry or scaling options are unusable.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// A bitmap does not match its declared dimensions.
    #[error("Invalid bitmap: {0}")]
    InvalidBitmap(String),

    /// An overlay was attached to a page it does not belong to.
    #[error("Invalid overlay: {0}")]
    InvalidOverlay(String),

    /// Error assembling the PDF structure.
    #[error("PDF writing error: {0}")]
    Pdf(String),

    /// Error compressing page image data.
    #[error("Encoding error: {0}")]
    Encode(String),
}

/// Failure reported by a rasterization adapter.
#[derive(Error, Debug)]
pub enum RasterizeError {
    /// The source could not be read.
    #[error("unreadable source: {0}")]
    Unreadable(#[from] io::Error),

    /// The source was read but could not be decoded into pixels.
    #[error("undecodable image: {0}")]
    Decode(String),

    /// The render capability refused to produce pixels (e.g. a blocked resource).
    #[error("render refused: {0}")]
    Refused(String),

    /// The adapter produced pixels that fail validation.
    #[error("malformed output: {0}")]
    Malformed(String),
}

impl From<image::ImageError> for RasterizeError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => RasterizeError::Unreadable(e),
            other => RasterizeError::Decode(other.to_string()),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Pdf(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Cancelled;
        assert_eq!(err.to_string(), "Pagination cancelled");

        let err = Error::Rasterization {
            index: 3,
            source: RasterizeError::Refused("cross-origin image".into()),
        };
        assert_eq!(
            err.to_string(),
            "Failed to rasterize block 3: render refused: cross-origin image"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));

        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: RasterizeError = io_err.into();
        assert!(matches!(err, RasterizeError::Unreadable(_)));
    }
}
