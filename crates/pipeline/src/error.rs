// ABOUTME: Error types for the curio pipeline including the ErrorCode enum and WikiError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing the categories of pipeline failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Network failure or non-2xx status from the upstream API.
    ContentUnavailable,
    /// Upstream reported the page as missing.
    NotFound,
    /// Upstream answered with a body that could not be decoded.
    InvalidResponse,
    /// Cache store read or write failure.
    Cache,
    /// Invalid client configuration.
    Config,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ContentUnavailable => "content unavailable",
            ErrorCode::NotFound => "not found",
            ErrorCode::InvalidResponse => "invalid response",
            ErrorCode::Cache => "cache error",
            ErrorCode::Config => "configuration error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for pipeline operations.
#[derive(Debug, thiserror::Error)]
pub struct WikiError {
    pub code: ErrorCode,
    pub page_id: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for WikiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "curio: {}", self.op)?;
        if !self.page_id.is_empty() {
            write!(f, " {}", self.page_id)?;
        }
        write!(f, ": {}", self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

/// Result alias used throughout the pipeline.
pub type Result<T> = std::result::Result<T, WikiError>;

impl WikiError {
    fn new(
        code: ErrorCode,
        page_id: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            page_id: page_id.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a ContentUnavailable error.
    pub fn content_unavailable(
        page_id: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::ContentUnavailable, page_id, op, source)
    }

    /// Create a NotFound error.
    pub fn not_found(
        page_id: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::NotFound, page_id, op, source)
    }

    /// Create an InvalidResponse error.
    pub fn invalid_response(
        page_id: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidResponse, page_id, op, source)
    }

    /// Create a Cache error.
    pub fn cache(
        page_id: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Cache, page_id, op, source)
    }

    /// Create a Config error (no page involved).
    pub fn config(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::Config, String::new(), op, source)
    }

    /// Returns true if this is a ContentUnavailable error.
    pub fn is_content_unavailable(&self) -> bool {
        self.code == ErrorCode::ContentUnavailable
    }

    /// Returns true if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }

    /// Returns true if this is an InvalidResponse error.
    pub fn is_invalid_response(&self) -> bool {
        self.code == ErrorCode::InvalidResponse
    }

    /// Returns true if this is a Cache error.
    pub fn is_cache(&self) -> bool {
        self.code == ErrorCode::Cache
    }

    /// Returns true if this is a Config error.
    pub fn is_config(&self) -> bool {
        self.code == ErrorCode::Config
    }
}
