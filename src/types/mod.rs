use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============= Tool Types =============

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

// ============= Pipeline Types =============

/// Immutable output of one completed stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageResult {
    /// Name of the stage that produced this result
    pub stage: String,
    /// Role that actually executed the stage (may differ after delegation)
    pub role: String,
    /// The text returned by the executor
    pub text: String,
    /// When the first attempt started
    pub started_at: DateTime<Utc>,
    /// Wall time across all attempts in milliseconds
    pub duration_ms: u64,
    /// Number of attempts made (1 unless retries were configured)
    pub attempts: u32,
}

/// Everything a run produced, returned by `Pipeline::run_detailed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub run_id: String,
    pub answer: String,
    pub stages: Vec<StageResult>,
    pub duration_ms: u64,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("{0}")]
    Io(String),

    #[error("Stage '{stage}' failed: {cause}")]
    StageExecutionFailed { stage: String, cause: String },

    #[error("Stage '{stage}' timed out")]
    StageTimeout { stage: String },

    #[error("Stage '{stage}' requires '{upstream}', which has not produced a result")]
    MissingUpstream { stage: String, upstream: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Errors that point at credentials or settings rather than at a stage.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AppError::Configuration(_) | AppError::Auth(_))
    }

    /// Errors a stage-level retry may recover from.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::StageExecutionFailed { .. } | AppError::StageTimeout { .. }
        )
    }
}

impl AppError {
    /// HTTP status used when the error reaches the web form.
    ///
    /// `Auth` means the model provider rejected our credentials, which is a
    /// server-side problem rather than the visitor's.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::EmptyQuery => StatusCode::BAD_REQUEST,
            AppError::StageTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::StageExecutionFailed { .. } | AppError::LLM(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_)
            | AppError::Io(_)
            | AppError::MissingUpstream { .. }
            | AppError::Auth(_)
            | AppError::Cancelled
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.to_string()
        });

        (self.status_code(), Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
