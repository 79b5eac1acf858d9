use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;

/// Claims of a session token issued by the identity provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String, // provider user id
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Verifies provider session tokens. Never issues them.
#[derive(Clone)]
pub struct SessionVerifier {
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    issuer: Option<String>,
}

impl SessionVerifier {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        if let Some(ref key) = config.auth_jwt_public_key {
            let pem = if key.trim_start().starts_with("-----BEGIN") {
                key.clone().into_bytes()
            } else {
                std::fs::read(key)
                    .map_err(|e| AppError::Internal(format!("Failed to read public key: {e}")))?
            };
            let decoding_key = DecodingKey::from_rsa_pem(&pem)
                .map_err(|e| AppError::Internal(format!("Invalid public key: {e}")))?;
            return Ok(Self {
                decoding_key,
                algorithm: Algorithm::RS256,
                issuer: config.auth_issuer.clone(),
            });
        }

        if let Some(ref secret) = config.auth_jwt_secret {
            return Ok(Self::from_secret(secret, config.auth_issuer.clone()));
        }

        Err(AppError::Internal(
            "Set AUTH_JWT_PUBLIC_KEY or AUTH_JWT_SECRET to verify sessions".to_string(),
        ))
    }

    pub fn from_secret(secret: &str, issuer: Option<String>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
            issuer,
        }
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_required_spec_claims(&["sub", "exp"]);
        validation.validate_aud = false;
        if let Some(ref issuer) = self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Session token rejected: {e}");
                AppError::InvalidToken
            })?;
        Ok(token_data.claims)
    }
}
