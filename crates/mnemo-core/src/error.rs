//! Error types for mnemo operations.
//!
//! Every failure surfaced by the core carries a structured [`ErrorCode`] so
//! transports (HTTP, console) can map it without string matching.

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for mnemo operations.
pub type MnemoResult<T> = Result<T, MnemoError>;

/// Which external collaborator failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    /// Chat-completion model (equivalence, feedback, generators).
    Llm,
    /// Embedding model (similarity scoring).
    Embedder,
}

impl std::fmt::Display for Collaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collaborator::Llm => write!(f, "llm"),
            Collaborator::Embedder => write!(f, "embedder"),
        }
    }
}

/// Main error type for all mnemo operations.
#[derive(Error, Debug)]
pub enum MnemoError {
    /// Malformed concept, answer or card type.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
    },

    /// Unknown card id.
    #[error("Card not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        card_id: Option<String>,
    },

    /// Similarity / LLM collaborator failed. Never converted into a verdict.
    #[error("Oracle unavailable ({collaborator}): {message}")]
    OracleUnavailable {
        message: String,
        code: ErrorCode,
        collaborator: Collaborator,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network error outside the oracle (webhook delivery, etc.).
    #[error("Network error: {message}")]
    Network {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Provider not supported.
    #[error("Provider not supported: {provider}")]
    UnsupportedProvider { provider: String },

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,
    ValEmptyField,
    ValTooLong,
    ValInvalidCardType,
    ValInvalidStage,

    // Cards (CARD_xxx)
    CardNotFound,

    // Oracle (ORC_xxx)
    OrcLlmFailed,
    OrcEmbeddingFailed,
    OrcInvalidResponse,

    // Database (DB_xxx)
    DbConnectionFailed,
    DbOperationFailed,

    // Network (NET_xxx)
    NetTimeout,
    NetConnectionFailed,

    // Parse (PARSE_xxx)
    ParseInvalidJson,
    ParseInvalidTimestamp,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValEmptyField => "VAL_002",
            ErrorCode::ValTooLong => "VAL_003",
            ErrorCode::ValInvalidCardType => "VAL_004",
            ErrorCode::ValInvalidStage => "VAL_005",
            ErrorCode::CardNotFound => "CARD_001",
            ErrorCode::OrcLlmFailed => "ORC_001",
            ErrorCode::OrcEmbeddingFailed => "ORC_002",
            ErrorCode::OrcInvalidResponse => "ORC_003",
            ErrorCode::DbConnectionFailed => "DB_001",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::NetTimeout => "NET_001",
            ErrorCode::NetConnectionFailed => "NET_002",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::ParseInvalidTimestamp => "PARSE_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl MnemoError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::validation_with_code(message, ErrorCode::ValInvalidInput)
    }

    /// Create a validation error with a specific code.
    pub fn validation_with_code(message: impl Into<String>, code: ErrorCode) -> Self {
        Self::Validation {
            message: message.into(),
            code,
            details: HashMap::new(),
        }
    }

    /// Create a validation error naming the offending field.
    pub fn invalid_field(field: &str, message: impl Into<String>, code: ErrorCode) -> Self {
        let mut details = HashMap::new();
        details.insert("field".to_string(), field.to_string());
        Self::Validation {
            message: message.into(),
            code,
            details,
        }
    }

    /// Create a not found error.
    pub fn not_found(card_id: impl Into<String>) -> Self {
        let id = card_id.into();
        Self::NotFound {
            message: format!("Card with id '{}' not found", id),
            code: ErrorCode::CardNotFound,
            card_id: Some(id),
        }
    }

    /// Create an LLM failure.
    pub fn llm(message: impl Into<String>) -> Self {
        Self::OracleUnavailable {
            message: message.into(),
            code: ErrorCode::OrcLlmFailed,
            collaborator: Collaborator::Llm,
            source: None,
        }
    }

    /// Create an embedding failure.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::OracleUnavailable {
            message: message.into(),
            code: ErrorCode::OrcEmbeddingFailed,
            collaborator: Collaborator::Embedder,
            source: None,
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidJson,
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            code: ErrorCode::NetConnectionFailed,
            source: None,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::OracleUnavailable { code, .. } => *code,
            Self::Database { code, .. } => *code,
            Self::Network { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// True for failures of the similarity / LLM collaborators.
    pub fn is_oracle_unavailable(&self) -> bool {
        matches!(self, Self::OracleUnavailable { .. })
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Validation { .. } => Some(
                "Concept must be 1-100 characters, answer 1-200 characters, type 'word' or 'concept'",
            ),
            Self::NotFound { .. } => Some("Please check the card ID and ensure it exists"),
            Self::OracleUnavailable {
                collaborator: Collaborator::Llm,
                ..
            } => Some("Please check your LLM provider configuration"),
            Self::OracleUnavailable {
                collaborator: Collaborator::Embedder,
                ..
            } => Some("Please check your embedding provider configuration"),
            Self::Database { .. } => Some("Please check the card database path and permissions"),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for MnemoError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for MnemoError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Internal(format!("Lock poisoned: {}", err))
    }
}
