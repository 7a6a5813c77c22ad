//! Error types for nlsql
//!
//! This module defines the error types used throughout the application.

use thiserror::Error;

/// Result type alias for nlsql
pub type Result<T> = std::result::Result<T, NlSqlError>;

/// Main error type for nlsql
#[derive(Error, Debug)]
pub enum NlSqlError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure to open or reach a database
    #[error("Failed to connect to {target}: {source}")]
    DatabaseConnection {
        /// Redacted description of what we tried to reach
        target: String,
        #[source]
        source: sqlx::Error,
    },

    /// A statement failed to execute
    #[error("Query failed: {source}")]
    DatabaseQuery {
        /// The statement text
        query: String,
        #[source]
        source: sqlx::Error,
    },

    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP-related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid HTTP header name or value
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Non-success answer from an LLM API
    #[error("{provider} API error (status {status}): {message}")]
    LLMApiError {
        provider: String,
        message: String,
        status: u16,
    },

    /// LLM provider errors
    #[error("LLM provider error: {0}")]
    LLMProvider(String),

    /// A tool was called with bad input or failed
    #[error("Tool {tool} failed: {message}")]
    Tool { tool: String, message: String },

    /// The model asked for a tool the toolkit does not have
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The agent did not produce an answer in time
    #[error("Agent stopped after {0} iterations without a final answer")]
    MaxIterationsExceeded(u32),

    /// Line editor failures
    #[error("Input error: {0}")]
    Readline(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),
}

impl NlSqlError {
    /// Wrap a driver error raised while connecting
    pub fn db_connection(target: impl Into<String>, source: sqlx::Error) -> Self {
        Self::DatabaseConnection {
            target: target.into(),
            source,
        }
    }

    /// Wrap a driver error raised while running `query`
    pub fn db_query(query: impl Into<String>, source: sqlx::Error) -> Self {
        Self::DatabaseQuery {
            query: query.into(),
            source,
        }
    }

    /// Build a tool failure
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}
