use async_trait::async_trait;
use serde::Deserialize;

use crate::auth::session::SessionClaims;
use crate::error::AppError;

/// Local view of a user as known to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProfile {
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
}

impl IdentityProfile {
    /// Fallback profile built from session claims when no directory is configured.
    pub fn from_claims(claims: &SessionClaims) -> Self {
        Self {
            external_id: claims.sub.clone(),
            email: claims.email.clone().unwrap_or_default(),
            name: claims.name.clone().filter(|n| !n.trim().is_empty()),
            phone: None,
            image_url: claims.picture.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailAddress {
    pub email_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhoneNumber {
    pub phone_number: String,
}

/// User object as the provider returns it from its API and in webhooks.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub phone_numbers: Vec<PhoneNumber>,
}

impl ProviderUser {
    pub fn into_profile(self) -> IdentityProfile {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string();

        IdentityProfile {
            external_id: self.id,
            email: self
                .email_addresses
                .into_iter()
                .next()
                .map(|e| e.email_address)
                .unwrap_or_default(),
            name: (!name.is_empty()).then_some(name),
            phone: self.phone_numbers.into_iter().next().map(|p| p.phone_number),
            image_url: self.image_url.filter(|u| !u.is_empty()),
        }
    }
}

/// Looks up user profiles at the identity provider.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn fetch_profile(&self, external_id: &str) -> Result<IdentityProfile, AppError>;
}

/// Directory backed by the provider's REST API.
pub struct HttpDirectory {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl HttpDirectory {
    pub fn new(base_url: &str, secret_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }
}

#[async_trait]
impl IdentityDirectory for HttpDirectory {
    async fn fetch_profile(&self, external_id: &str) -> Result<IdentityProfile, AppError> {
        let resp = self
            .client
            .get(format!("{}/users/{external_id}", self.base_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(AppError::IdentitySync(format!(
                "directory returned {} for {external_id}",
                resp.status()
            )));
        }

        let user: ProviderUser = resp.json().await?;
        Ok(user.into_profile())
    }
}
