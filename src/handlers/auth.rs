use axum::Json;
use serde::Serialize;

use crate::auth::middleware::{OptionalSession, Session};
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub authenticated: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub success: bool,
    pub authenticated: bool,
}

/// Echoes the provider identity behind the bearer token.
pub async fn me(Session(claims): Session) -> Result<Json<SessionResponse>, AppError> {
    Ok(Json(SessionResponse {
        success: true,
        user: SessionUser {
            id: claims.sub,
            authenticated: true,
        },
    }))
}

pub async fn check(OptionalSession(claims): OptionalSession) -> Json<CheckResponse> {
    Json(CheckResponse {
        success: true,
        authenticated: claims.is_some(),
    })
}
