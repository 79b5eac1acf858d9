use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub cors_allowed_origins: String,
    /// RS256 public key of the identity provider, inline PEM or a path to one.
    pub auth_jwt_public_key: Option<String>,
    /// HS256 shared secret, used when no public key is configured.
    pub auth_jwt_secret: Option<String>,
    pub auth_issuer: Option<String>,
    pub identity_api_url: String,
    pub identity_secret_key: Option<String>,
    pub webhook_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://permit_finder.db?mode=rwc".to_string()),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .unwrap_or(3001),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            auth_jwt_public_key: optional("AUTH_JWT_PUBLIC_KEY"),
            auth_jwt_secret: optional("AUTH_JWT_SECRET"),
            auth_issuer: optional("AUTH_ISSUER"),
            identity_api_url: env::var("IDENTITY_API_URL")
                .unwrap_or_else(|_| "https://api.clerk.com/v1".to_string()),
            identity_secret_key: optional("IDENTITY_SECRET_KEY"),
            webhook_secret: optional("WEBHOOK_SECRET"),
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
