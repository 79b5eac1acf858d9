pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod geo;
pub mod handlers;
pub mod office_type;
pub mod pagination;
pub mod routes;
pub mod seed;
pub mod status;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use auth::identity::IdentityDirectory;
use auth::session::SessionVerifier;
use auth::webhook::WebhookVerifier;
use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub sessions: SessionVerifier,
    /// Provider directory used to provision unknown users; claims are used when absent.
    pub directory: Option<Arc<dyn IdentityDirectory>>,
    pub webhooks: Option<WebhookVerifier>,
    pub config: Config,
}

impl AsRef<AppState> for AppState {
    fn as_ref(&self) -> &AppState {
        self
    }
}
