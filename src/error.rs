use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Classifier or feature-list artifact missing or corrupt
    #[error("Failed to load {artifact} artifact: {reason}")]
    ArtifactLoad { artifact: String, reason: String },

    /// Classifier input dimensionality disagrees with the feature list
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Inputs for which the derived features are undefined
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// Form validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Categorical value outside the known option table
    #[error("Unknown {attribute} option: {value:?}")]
    UnknownCategory { attribute: String, value: String },

    /// Categorical options that the feature list never consults
    #[error("Categorical coverage check failed: {0}")]
    CategoricalCoverage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn artifact_load(artifact: impl Into<String>, reason: impl ToString) -> Self {
        AppError::ArtifactLoad {
            artifact: artifact.into(),
            reason: reason.to_string(),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownCategory { .. } => StatusCode::BAD_REQUEST,
            AppError::DegenerateInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ArtifactLoad { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::SchemaMismatch(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::CategoricalCoverage(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::ArtifactLoad { .. } => "ARTIFACT_LOAD_FAILURE",
            AppError::SchemaMismatch(_) => "SCHEMA_MISMATCH",
            AppError::DegenerateInput(_) => "DEGENERATE_INPUT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::UnknownCategory { .. } => "UNKNOWN_CATEGORY",
            AppError::CategoricalCoverage(_) => "CATEGORICAL_COVERAGE",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Convert AppError to HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(
                error_code = error_code,
                status_code = status.as_u16(),
                message = %message,
                "Request error"
            );
        } else {
            tracing::warn!(
                error_code = error_code,
                status_code = status.as_u16(),
                message = %message,
                "Rejected request"
            );
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for AppError {
    fn from(err: bincode::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::Validation("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UnknownCategory {
                attribute: "loan_type".to_string(),
                value: "Boat Loan".to_string(),
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DegenerateInput("test".to_string()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::artifact_load("model", "missing").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::SchemaMismatch("test".to_string()).error_code(),
            "SCHEMA_MISMATCH"
        );
        assert_eq!(
            AppError::DegenerateInput("test".to_string()).error_code(),
            "DEGENERATE_INPUT"
        );
        assert_eq!(
            AppError::artifact_load("model", "missing").error_code(),
            "ARTIFACT_LOAD_FAILURE"
        );
    }

    #[test]
    fn test_artifact_load_message() {
        let err = AppError::artifact_load("feature list", "file not found");
        assert_eq!(
            err.to_string(),
            "Failed to load feature list artifact: file not found"
        );
    }
}
