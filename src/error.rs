//! Error types for the Frontdesk console

use thiserror::Error;

use crate::validation::FieldErrors;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unexpected response shape: {0}")]
    Schema(String),

    #[error("Decoding error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut parts: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let detail = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}: {}", field, detail)
            })
            .collect();
        parts.sort();
        AppError::InvalidInput(parts.join("; "))
    }
}

impl AppError {
    /// HTTP status reported by the back end, if the error came from one
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Api { status, .. } => Some(*status),
            AppError::NotFound(_) => Some(404),
            AppError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Message to show to an operator: the back end's own message when it sent one,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            AppError::NotFound(message) if !message.trim().is_empty() => message.clone(),
            AppError::InvalidInput(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
