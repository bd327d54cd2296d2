//! Explorer error types with user-facing categories.
//!
//! [`ExplorerError`] is the central error type for the client. Each variant
//! maps to a numeric code and an [`ErrorKind`] that decides how the
//! controller surfaces it: a local message, a blocking alert, or a redirect.

use reqwest::StatusCode;

/// How an error is surfaced to the user.
///
/// | Kind             | Code range | Surfaced as                          |
/// |------------------|------------|--------------------------------------|
/// | `Validation`     | 1000–1999  | Message, request never sent          |
/// | `Network`        | 2000–2999  | Blocking alert, busy state restored  |
/// | `PartialData`    | 3000–3999  | Logged, item skipped                 |
/// | `Authentication` | 4000–4999  | Page redirect to the auth URL        |
/// | `Internal`       | 5000–5999  | Blocking alert                       |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User input rejected locally.
    Validation,
    /// Transport failure, non-2xx status or undecodable body.
    Network,
    /// Malformed item inside an otherwise valid batch.
    PartialData,
    /// Backend asked for authentication.
    Authentication,
    /// Anything else (configuration, encoding).
    Internal,
}

/// Client-side error enum.
#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    /// User input failed validation; the message is shown verbatim.
    #[error("{0}")]
    Validation(String),

    /// Imported text or file could not be parsed into a geometry.
    #[error("could not parse geometry: {0}")]
    GeometryParse(String),

    /// The import format is declared unsupported.
    #[error("{0}")]
    UnsupportedImport(String),

    /// Transport-level failure from the HTTP client.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Response status code.
        status: StatusCode,
        /// Requested URL.
        url: String,
    },

    /// Response body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Backend requires authentication before searching.
    #[error("authentication required")]
    AuthenticationRequired {
        /// Where the page should be redirected.
        auth_url: String,
    },

    /// Item inside a batch was malformed and skipped.
    #[error("skipped {item}: {reason}")]
    PartialData {
        /// Identifier of the skipped item.
        item: String,
        /// Why it was skipped.
        reason: String,
    },

    /// The export drain hit its iteration guard.
    #[error("export stopped after {max_pages} pages without reaching the last page")]
    ExportPageLimit {
        /// Configured page guard.
        max_pages: u32,
    },

    /// The user declined the export confirmation.
    #[error("export cancelled")]
    ExportCancelled,

    /// CSV encoding failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ExplorerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::GeometryParse(_) => 1002,
            Self::UnsupportedImport(_) => 1003,
            Self::ExportCancelled => 1004,
            Self::Transport(_) => 2001,
            Self::HttpStatus { .. } => 2002,
            Self::Decode(_) => 2003,
            Self::ExportPageLimit { .. } => 2004,
            Self::PartialData { .. } => 3001,
            Self::AuthenticationRequired { .. } => 4001,
            Self::Csv(_) => 5001,
            Self::Config(_) => 5002,
        }
    }

    /// Returns the category deciding how the error reaches the user.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_)
            | Self::GeometryParse(_)
            | Self::UnsupportedImport(_)
            | Self::ExportCancelled => ErrorKind::Validation,
            Self::Transport(_)
            | Self::HttpStatus { .. }
            | Self::Decode(_)
            | Self::ExportPageLimit { .. } => ErrorKind::Network,
            Self::PartialData { .. } => ErrorKind::PartialData,
            Self::AuthenticationRequired { .. } => ErrorKind::Authentication,
            Self::Csv(_) | Self::Config(_) => ErrorKind::Internal,
        }
    }

    /// Shorthand for a [`ExplorerError::Validation`] error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result alias for explorer operations.
pub type Result<T> = std::result::Result<T, ExplorerError>;
