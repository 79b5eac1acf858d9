use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::auth::identity::IdentityProfile;
use crate::auth::session::SessionClaims;
use crate::db::queries;
use crate::error::AppError;
use crate::AppState;

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// A verified provider session, without touching the database.
#[derive(Debug, Clone)]
pub struct Session(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync + AsRef<AppState>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state: &AppState = state.as_ref();
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        Ok(Session(app_state.sessions.verify(token)?))
    }
}

/// Like [`Session`] but never rejects; invalid tokens count as anonymous.
#[derive(Debug, Clone)]
pub struct OptionalSession(pub Option<SessionClaims>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync + AsRef<AppState>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state: &AppState = state.as_ref();
        let claims = bearer_token(parts).and_then(|t| app_state.sessions.verify(t).ok());
        Ok(OptionalSession(claims))
    }
}

/// The local user behind a verified session, provisioned on first sight.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub entity::user::Model);

impl AuthenticatedUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync + AsRef<AppState>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state: &AppState = state.as_ref();
        let Session(claims) = Session::from_request_parts(parts, state).await?;

        if let Some(user) = queries::users::find_by_external_id(&app_state.db, &claims.sub).await? {
            return Ok(AuthenticatedUser(user));
        }

        let profile = match app_state.directory {
            Some(ref directory) => directory
                .fetch_profile(&claims.sub)
                .await
                .map_err(|e| AppError::IdentitySync(e.to_string()))?,
            None => IdentityProfile::from_claims(&claims),
        };

        let user = queries::users::provision(&app_state.db, profile).await?;
        Ok(AuthenticatedUser(user))
    }
}

/// An authenticated user holding the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub entity::user::Model);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync + AsRef<AppState>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;
        if user.role != queries::users::ROLE_ADMIN {
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
