use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use entity::application::ApplicationStatus;
use sea_orm::SqlErr;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Forbidden")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    #[error("Permit office not found")]
    PermitOfficeNotFound,

    #[error("Review not found or access denied")]
    ReviewNotFound,

    #[error("Application not found or access denied")]
    ApplicationNotFound,

    #[error("Document not found")]
    DocumentNotFound,

    #[error("You have already reviewed this permit office")]
    ReviewAlreadyExists,

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("Can only modify draft applications")]
    ApplicationNotDraft,

    #[error("Webhook secret not configured")]
    WebhookNotConfigured,

    #[error("Missing svix headers")]
    MissingWebhookHeaders,

    #[error("Invalid webhook signature")]
    InvalidWebhookSignature,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Error syncing user data: {0}")]
    IdentitySync(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl AppError {
    /// Maps a unique-index violation on review insert to the duplicate-review
    /// error; everything else stays a database error.
    pub fn from_review_insert(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::ReviewAlreadyExists,
            _ => AppError::Database(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string())
            }
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "invalid_token", self.to_string())
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            AppError::UserNotFound => {
                (StatusCode::NOT_FOUND, "user_not_found", self.to_string())
            }
            AppError::PermitOfficeNotFound => {
                (StatusCode::NOT_FOUND, "permit_office_not_found", self.to_string())
            }
            AppError::ReviewNotFound => {
                (StatusCode::NOT_FOUND, "review_not_found", self.to_string())
            }
            AppError::ApplicationNotFound => {
                (StatusCode::NOT_FOUND, "application_not_found", self.to_string())
            }
            AppError::DocumentNotFound => {
                (StatusCode::NOT_FOUND, "document_not_found", self.to_string())
            }
            AppError::ReviewAlreadyExists => {
                (StatusCode::CONFLICT, "review_already_exists", self.to_string())
            }
            AppError::InvalidStatusTransition { .. } => {
                (StatusCode::BAD_REQUEST, "invalid_status_transition", self.to_string())
            }
            AppError::ApplicationNotDraft => {
                (StatusCode::BAD_REQUEST, "application_not_draft", self.to_string())
            }
            AppError::WebhookNotConfigured => {
                tracing::error!("Webhook received but WEBHOOK_SECRET is not configured");
                (StatusCode::INTERNAL_SERVER_ERROR, "webhook_not_configured", self.to_string())
            }
            AppError::MissingWebhookHeaders => {
                (StatusCode::BAD_REQUEST, "missing_webhook_headers", self.to_string())
            }
            AppError::InvalidWebhookSignature => {
                (StatusCode::BAD_REQUEST, "invalid_webhook_signature", self.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::IdentitySync(e) => {
                tracing::error!("Identity sync error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "identity_sync_error",
                    "Error syncing user data".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
            AppError::Jwt(_) => {
                (StatusCode::UNAUTHORIZED, "invalid_token", "Invalid token".to_string())
            }
            AppError::HttpClient(e) => {
                tracing::error!("HTTP client error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "provider_error",
                    "External provider error".to_string(),
                )
            }
        };

        let body = json!({
            "error": error_type,
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
