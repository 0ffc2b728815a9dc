//! Error types for conversion operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while turning a saved page into Markdown
///
/// The conversion core itself is infallible; these errors come from the
/// strict parser and from file I/O at the edges of the pipeline.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Character encoding error
    #[error("Encoding error: {0}")]
    EncodingError(String),
    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Reading the source or writing the destination failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File that could not be read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ConversionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConversionError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ConversionError::EncodingError("bad byte".to_string());
        assert_eq!(err.to_string(), "Encoding error: bad byte");

        let err = ConversionError::InvalidInput("HTML input is empty".to_string());
        assert_eq!(err.to_string(), "Invalid input: HTML input is empty");
    }

    #[test]
    fn test_io_error_names_path() {
        let err = ConversionError::io(
            "/tmp/missing.html",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        let message = err.to_string();
        assert!(message.contains("/tmp/missing.html"), "got: {message}");
        assert!(message.contains("no such file"), "got: {message}");
        assert!(std::error::Error::source(&err).is_some());
    }
}
