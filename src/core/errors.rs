//! Custom error types for extraction and translation operations

use thiserror::Error;

/// Errors raised while turning an uploaded file into plain text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Suffix is not one of .txt, .pdf, .docx
    #[error("Unsupported file format. Only .txt, .pdf, and .docx are allowed.")]
    UnsupportedFormat {
        filename: String,
    },

    /// Legacy Word binary format, rejected without attempting a parse
    #[error(".doc format is not supported. Please convert to .docx.")]
    LegacyFormatUnsupported,

    /// PDF could not be parsed
    #[error("Failed to read PDF file.")]
    MalformedPdf {
        message: String,
    },

    /// DOCX container or document part could not be parsed
    #[error("Failed to read DOCX file.")]
    MalformedDocx {
        message: String,
    },

    /// Plain text file is not valid UTF-8
    #[error("Failed to read text file: {message}")]
    InvalidText {
        message: String,
    },
}

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Source and target language are identical
    #[error("Source and target languages must be different.")]
    SameLanguage,

    /// Language value outside the supported set
    #[error("Invalid language: {value}. Expected one of: English, Japanese")]
    InvalidLanguage {
        value: String,
    },

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField {
        field: String,
    },

    /// Extraction failure, surfaced unchanged
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// API request failed
    #[error("API error: {status} - {message}")]
    ApiError {
        status: u16,
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded. Retry after {retry_after:?} seconds")]
    RateLimitError {
        retry_after: Option<u64>,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
    },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TranslationError {
    /// Whether the caller, not the service, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TranslationError::SameLanguage
                | TranslationError::InvalidLanguage { .. }
                | TranslationError::MissingField { .. }
                | TranslationError::Extraction(_)
        )
    }

    /// Whether a retry of the same LLM call may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            TranslationError::RateLimitError { .. } | TranslationError::NetworkError { .. } => true,
            TranslationError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        TranslationError::InternalError(err.to_string())
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_messages_are_human_readable() {
        assert_eq!(
            ExtractionError::LegacyFormatUnsupported.to_string(),
            ".doc format is not supported. Please convert to .docx."
        );
        assert_eq!(
            ExtractionError::MalformedPdf { message: "bad xref".into() }.to_string(),
            "Failed to read PDF file."
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(TranslationError::SameLanguage.is_client_error());
        assert!(TranslationError::from(ExtractionError::LegacyFormatUnsupported).is_client_error());
        assert!(!TranslationError::NetworkError { message: "reset".into() }.is_client_error());
        assert!(!TranslationError::InternalError("boom".into()).is_client_error());
    }

    #[test]
    fn test_transient_classification() {
        assert!(TranslationError::RateLimitError { retry_after: None }.is_transient());
        assert!(TranslationError::ApiError { status: 503, message: String::new() }.is_transient());
        assert!(!TranslationError::ApiError { status: 400, message: String::new() }.is_transient());
    }
}
