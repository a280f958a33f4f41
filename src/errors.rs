/*!
 * Error types for the wordgaze library.
 *
 * This module contains custom error types for different parts of the library,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur while extracting text from a document
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The file extension (or declared format) is not a supported document format
    #[error("Unsupported document format: {extension}")]
    UnsupportedFormat {
        /// The offending extension or format tag
        extension: String,
    },

    /// The document is a supported format but could not be opened or parsed
    #[error("Failed to extract text: {0}")]
    Extraction(String),

    /// Error from a raw file operation
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when driving the RSVP player
#[derive(Error, Debug)]
pub enum PlayerError {
    /// The requested words-per-minute rate is not positive
    #[error("Invalid rate: {0} wpm (rate must be positive)")]
    InvalidRate(u32),
}

/// Main library error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from document text extraction
    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// Error from the RSVP player
    #[error("Player error: {0}")]
    Player(#[from] PlayerError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
