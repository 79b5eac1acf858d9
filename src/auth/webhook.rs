//! Signature check for identity-provider webhooks (Svix scheme).

use axum::http::HeaderMap;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age (and clock skew) of a signed delivery, in seconds.
pub const TOLERANCE_SECS: u64 = 5 * 60;

#[derive(Debug, Clone)]
pub struct WebhookHeaders {
    pub id: String,
    pub timestamp: String,
    pub signature: String,
}

impl WebhookHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
                .ok_or(AppError::MissingWebhookHeaders)
        };

        Ok(Self {
            id: get("svix-id")?,
            timestamp: get("svix-timestamp")?,
            signature: get("svix-signature")?,
        })
    }
}

#[derive(Clone)]
pub struct WebhookVerifier {
    key: Vec<u8>,
}

impl WebhookVerifier {
    /// Accepts `whsec_<base64>` secrets; a bare base64 secret works too.
    pub fn new(secret: &str) -> Result<Self, AppError> {
        let encoded = secret.strip_prefix("whsec_").unwrap_or(secret);
        let key = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| AppError::Internal(format!("Invalid webhook secret: {e}")))?;
        Ok(Self { key })
    }

    fn mac(&self, headers: &WebhookHeaders, payload: &[u8]) -> Result<HmacSha256, AppError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AppError::Internal(format!("Invalid webhook key: {e}")))?;
        mac.update(headers.id.as_bytes());
        mac.update(b".");
        mac.update(headers.timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }

    /// Produces a `v1,<base64>` signature; used by tests and local tooling.
    pub fn sign(&self, id: &str, timestamp: i64, payload: &[u8]) -> Result<String, AppError> {
        let headers = WebhookHeaders {
            id: id.to_string(),
            timestamp: timestamp.to_string(),
            signature: String::new(),
        };
        let tag = self.mac(&headers, payload)?.finalize().into_bytes();
        Ok(format!(
            "v1,{}",
            base64::engine::general_purpose::STANDARD.encode(tag)
        ))
    }

    pub fn verify(&self, headers: &WebhookHeaders, payload: &[u8], now: i64) -> Result<(), AppError> {
        let timestamp: i64 = headers
            .timestamp
            .parse()
            .map_err(|_| AppError::InvalidWebhookSignature)?;
        if now.abs_diff(timestamp) > TOLERANCE_SECS {
            return Err(AppError::InvalidWebhookSignature);
        }

        let mac = self.mac(headers, payload)?;
        let matched = headers
            .signature
            .split_whitespace()
            .filter_map(|entry| entry.strip_prefix("v1,"))
            .filter_map(|sig| base64::engine::general_purpose::STANDARD.decode(sig).ok())
            .any(|sig| mac.clone().verify_slice(&sig).is_ok());

        if matched {
            Ok(())
        } else {
            Err(AppError::InvalidWebhookSignature)
        }
    }
}
