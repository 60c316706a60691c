use std::fmt;

/// Universal error type for COS parsing and serialization.
///
/// Parse-level entry points swallow `ParseFailure` into `None` results so
/// that partially-valid documents still open; serialization errors always
/// propagate to the caller.
#[derive(Debug, Clone)]
pub enum PDFError {
    /// The byte buffer violates the COS grammar in a required location,
    /// or a reader was constructed over an empty buffer
    InvalidInput { message: String },

    /// A recognized keyword was missing or a typed property could not be decoded
    ParseFailure { message: String },

    /// The resolver returned nothing for an indirect reference
    MissingReference { id: u32 },

    /// A child object required to be indirect has no reference, or an
    /// emission step could not produce bytes
    SerializationFailure { message: String },

    /// Recognized but unimplemented feature (e.g. an exotic stream filter)
    Unsupported { feature: String },
}

impl fmt::Display for PDFError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PDFError::InvalidInput { message } => {
                write!(f, "Invalid input: {}", message)
            }
            PDFError::ParseFailure { message } => {
                write!(f, "Parse failure: {}", message)
            }
            PDFError::MissingReference { id } => {
                write!(f, "Missing indirect object {}", id)
            }
            PDFError::SerializationFailure { message } => {
                write!(f, "Serialization failure: {}", message)
            }
            PDFError::Unsupported { feature } => {
                write!(f, "Unsupported feature: {}", feature)
            }
        }
    }
}

impl PDFError {
    /// Creates an invalid input error.
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        PDFError::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a parse failure.
    pub fn parse_failure<S: Into<String>>(message: S) -> Self {
        PDFError::ParseFailure {
            message: message.into(),
        }
    }

    /// Creates a missing reference error.
    pub fn missing_reference(id: u32) -> Self {
        PDFError::MissingReference { id }
    }

    /// Creates a serialization failure.
    pub fn serialization_failure<S: Into<String>>(message: S) -> Self {
        PDFError::SerializationFailure {
            message: message.into(),
        }
    }

    /// Creates an unsupported feature error.
    pub fn unsupported<S: Into<String>>(feature: S) -> Self {
        PDFError::Unsupported {
            feature: feature.into(),
        }
    }
}

impl std::error::Error for PDFError {}

/// Result type alias for COS operations
pub type PDFResult<T> = Result<T, PDFError>;
