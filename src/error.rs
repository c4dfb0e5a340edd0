//! Host-facing error types
//!
//! Hosted exceptions travel the engine's failure channel as plain values and
//! only become a [`JsError`] at the embedding boundary.

use std::path::PathBuf;

use thiserror::Error;

use crate::value::JsValue;

/// Source location information for error messages
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLocation {
    pub file: Option<PathBuf>,
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}:{}", file.display(), self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Main error type for the interpreter
#[derive(Debug, Error)]
pub enum JsError {
    #[error("SyntaxError: {message} at {location}")]
    SyntaxError {
        message: String,
        location: SourceLocation,
    },

    /// A hosted exception nobody caught
    #[error("Uncaught {message}")]
    Thrown { message: String, value: JsValue },

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl JsError {
    pub fn syntax_error(message: impl Into<String>, line: u32, column: u32) -> Self {
        JsError::SyntaxError {
            message: message.into(),
            location: SourceLocation {
                file: None,
                line,
                column,
            },
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        JsError::Internal(message.into())
    }

    /// The thrown value, if this error carries one
    pub fn thrown_value(&self) -> Option<&JsValue> {
        match self {
            JsError::Thrown { value, .. } => Some(value),
            _ => None,
        }
    }
}
