//! Error types for Rezka Core

use thiserror::Error;

use crate::types::TranslatorId;

/// Result type alias for stream resolution operations
pub type Result<T> = std::result::Result<T, Error>;

/// Stream resolution error types
#[derive(Error, Debug)]
pub enum Error {
    // Catalog errors
    #[error("No results found for \"{0}\"")]
    NoSearchResults(String),

    #[error("Failed to parse media page: {0}")]
    PageParse(String),

    // Translator errors
    #[error("No translators available for this media")]
    NoTranslators,

    #[error("Translator \"{requested}\" not found (available: {available:?})")]
    TranslatorNotFound {
        requested: String,
        available: Vec<TranslatorId>,
    },

    // Stream errors
    #[error("Season and episode are required for a TV series")]
    MissingSeasonEpisode,

    #[error("Empty response from upstream")]
    EmptyUpstreamResponse,

    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    #[error("Stream not available")]
    StreamNotAvailable,

    // Network errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error code used for log tagging
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::NoSearchResults(_) => "NO_SEARCH_RESULTS",
            Error::PageParse(_) => "PAGE_PARSE",
            Error::NoTranslators => "NO_TRANSLATORS",
            Error::TranslatorNotFound { .. } => "TRANSLATOR_NOT_FOUND",
            Error::MissingSeasonEpisode => "MISSING_SEASON_EPISODE",
            Error::EmptyUpstreamResponse => "EMPTY_UPSTREAM",
            Error::MalformedUpstreamResponse(_) => "MALFORMED_UPSTREAM",
            Error::StreamNotAvailable => "STREAM_NOT_AVAILABLE",
            Error::Network(_) => "NETWORK",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Internal(_) => "INTERNAL",
        }
    }

    /// Returns true if this error should surface as a generic internal
    /// fault rather than a descriptive payload error
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::PageParse(_) | Error::InvalidConfig(_) | Error::Internal(_)
        )
    }
}
