//! Error types for Homegraph

use thiserror::Error;

/// Result type alias using Homegraph's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Homegraph error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Dependency errors (E100-E199)
    #[error("Record store unavailable while loading {entity}: {message}")]
    DependencyUnavailable { entity: String, message: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Language model errors (E200-E299)
    #[error("Network error: {0}. Check your internet connection.")]
    NetworkError(#[from] reqwest::Error),

    #[error("LLM API error: {0}. Check that HOMEGRAPH_API_KEY or OPENROUTER_API_KEY is set.")]
    LLMError(String),

    #[error("Answer degraded to rule-based fallback: {0}")]
    AnswerDegraded(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a store failure for one entity type
    pub fn dependency(entity: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::DependencyUnavailable {
            entity: entity.into(),
            message: cause.to_string(),
        }
    }

    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::DependencyUnavailable { .. } => "E100",
            Self::DatabaseError(_) => "E101",
            Self::NetworkError(_) => "E200",
            Self::LLMError(_) => "E201",
            Self::AnswerDegraded(_) => "E202",
            Self::ConfigError(_) => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Serialization(_) => "E801",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Whether the error is fatal to the call that produced it
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::AnswerDegraded(_))
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::DependencyUnavailable { .. } | Self::DatabaseError(_) => {
                Some("homegraph config get storage.database_path".to_string())
            }
            Self::NetworkError(_) => Some("Check internet connection".to_string()),
            Self::LLMError(_) => Some("homegraph config get llm.api_key".to_string()),
            Self::ConfigError(_) => Some("homegraph config list".to_string()),
            _ => None,
        }
    }
}
