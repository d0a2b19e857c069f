//! Error types for the imgnorm pipeline.
//!
//! Errors are split by blast radius: [`ItemError`] is local to one input item
//! and never stops a batch, while [`ConfigError`] is raised before any item is
//! dispatched and fails the whole call.

use thiserror::Error;

/// Top-level error type for imgnorm operations.
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The logo image could not be decoded
    #[error("Logo error: {0}")]
    Logo(ItemError),

    /// Archive packaging failed
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Logo overlay was requested but no logo image was supplied
    #[error("Logo overlay is enabled but no logo image was supplied")]
    MissingLogo,
}

/// Per-item processing errors.
///
/// Each of these is recorded against the failing item; siblings keep going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// Content is not any of the registered image encodings
    #[error("Unsupported format for {name}: {format}")]
    UnsupportedFormat { name: String, format: String },

    /// Format was identified but the data is corrupt or truncated
    #[error("Decode error for {name}: {message}")]
    Decode { name: String, message: String },

    /// Final bitmap could not be serialized
    #[error("Encode error for {name}: {message}")]
    Encode { name: String, message: String },

    /// Blob or decoded image exceeds configured limits
    #[error("Too large: {name} ({detail})")]
    TooLarge { name: String, detail: String },

    /// Batch was cancelled before this item started
    #[error("Cancelled before processing: {0}")]
    Cancelled(String),

    /// Worker failed unexpectedly (panic or join failure)
    #[error("Internal error for {name}: {message}")]
    Internal { name: String, message: String },
}

impl ItemError {
    /// Short machine-friendly label for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ItemError::UnsupportedFormat { .. } => "unsupported_format",
            ItemError::Decode { .. } => "decode",
            ItemError::Encode { .. } => "encode",
            ItemError::TooLarge { .. } => "too_large",
            ItemError::Cancelled(_) => "cancelled",
            ItemError::Internal { .. } => "internal",
        }
    }
}

/// Convenience type alias for imgnorm results.
pub type Result<T> = std::result::Result<T, NormalizeError>;

/// Convenience type alias for per-item results.
pub type ItemResult<T> = std::result::Result<T, ItemError>;
