use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::auth::identity::ProviderUser;
use crate::auth::webhook::WebhookHeaders;
use crate::db::queries;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

#[derive(Debug, Serialize)]
pub struct WebhookHealth {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
}

/// Receives user lifecycle events from the identity provider.
pub async fn identity_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let verifier = state.webhooks.as_ref().ok_or(AppError::WebhookNotConfigured)?;
    let signed = WebhookHeaders::from_headers(&headers)?;
    verifier.verify(&signed, &body, chrono::Utc::now().timestamp())?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {e}")))?;
    tracing::info!(event_type = %event.event_type, delivery = %signed.id, "Webhook received");

    match event.event_type.as_str() {
        "user.created" | "user.updated" => {
            let provider_user: ProviderUser = serde_json::from_value(event.data)
                .map_err(|e| AppError::BadRequest(format!("Invalid user payload: {e}")))?;
            let user = queries::users::upsert_profile(&state.db, provider_user.into_profile()).await?;
            tracing::info!(user_id = %user.id, external_id = %user.external_id, "User synced");
        }
        "user.deleted" => {
            let external_id = event
                .data
                .get("id")
                .and_then(|v| v.as_str())
                .ok_or_else(|| AppError::BadRequest("Deleted user id missing".into()))?;
            match queries::users::find_by_external_id(&state.db, external_id).await? {
                Some(user) => {
                    queries::users::delete_with_data(&state.db, &user.id).await?;
                    tracing::info!(external_id, "User deleted");
                }
                None => tracing::info!(external_id, "Deleted user was never synced"),
            }
        }
        other => tracing::info!(event_type = other, "Ignoring webhook event"),
    }

    Ok(Json(WebhookAck { received: true }))
}

pub async fn health() -> Json<WebhookHealth> {
    Json(WebhookHealth {
        status: "ok",
        service: "webhooks",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
