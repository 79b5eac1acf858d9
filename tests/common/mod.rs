#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use permit_finder::auth::session::{SessionClaims, SessionVerifier};
use permit_finder::auth::webhook::WebhookVerifier;
use permit_finder::config::Config;
use permit_finder::routes::create_router;
use permit_finder::AppState;
use sea_orm::{ActiveModelTrait, Set};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-session-secret";
pub const ISSUER: &str = "https://identity.test";
pub const WEBHOOK_SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";

// ─── TestResponse ────────────────────────────────────────────────────────────

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body_bytes).to_string()
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body_bytes).unwrap_or_else(|e| {
            panic!(
                "Failed to deserialize response as {}: {e}\nBody: {}",
                std::any::type_name::<T>(),
                self.text()
            )
        })
    }

    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status, expected,
            "Expected status {expected}, got {}. Body: {}",
            self.status,
            self.text()
        );
    }
}

// ─── Sample offices ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OfficeSeed {
    pub name: &'static str,
    pub city: &'static str,
    pub state: &'static str,
    pub zip_code: &'static str,
    pub coordinate: Option<(f64, f64)>,
    pub permit_types: &'static [&'static str],
}

impl OfficeSeed {
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            city: "Atlanta",
            state: "GA",
            zip_code: "30303",
            coordinate: None,
            permit_types: &["building"],
        }
    }

    pub fn at(mut self, lat: f64, lng: f64) -> Self {
        self.coordinate = Some((lat, lng));
        self
    }

    pub fn in_city(mut self, city: &'static str, state: &'static str, zip_code: &'static str) -> Self {
        self.city = city;
        self.state = state;
        self.zip_code = zip_code;
        self
    }

    pub fn with_types(mut self, permit_types: &'static [&'static str]) -> Self {
        self.permit_types = permit_types;
        self
    }
}

// ─── TestApp ─────────────────────────────────────────────────────────────────

pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_webhooks(true).await
    }

    pub async fn with_webhooks(enabled: bool) -> Self {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            cors_allowed_origins: "http://localhost:3000".to_string(),
            auth_jwt_public_key: None,
            auth_jwt_secret: Some(JWT_SECRET.to_string()),
            auth_issuer: Some(ISSUER.to_string()),
            identity_api_url: "http://127.0.0.1:9".to_string(),
            identity_secret_key: None,
            webhook_secret: enabled.then(|| WEBHOOK_SECRET.to_string()),
        };

        let db = permit_finder::db::pool::connect(&config.database_url)
            .await
            .expect("Failed to connect to in-memory SQLite");

        permit_finder::db::migration::run(&db)
            .await
            .expect("Failed to run migrations");

        let sessions = SessionVerifier::new(&config).expect("Failed to init SessionVerifier");
        let webhooks = config
            .webhook_secret
            .as_deref()
            .map(|s| WebhookVerifier::new(s).expect("Invalid webhook secret"));

        let state = AppState {
            db,
            sessions,
            directory: None,
            webhooks,
            config,
        };

        let router = create_router(state.clone());

        Self { router, state }
    }

    pub async fn request(&self, req: Request<Body>) -> TestResponse {
        let resp = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("oneshot failed");

        let status = resp.status();
        let body_bytes = resp
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes()
            .to_vec();

        TestResponse { status, body_bytes }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };
        self.request(builder.body(body).unwrap()).await
    }

    // ── Auth helpers ─────────────────────────────────────────────────────

    /// Mints a provider session token the way the identity provider would.
    pub fn token_for(sub: &str, email: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = SessionClaims {
            sub: sub.to_string(),
            exp: now + 3600,
            iat: Some(now),
            iss: Some(ISSUER.to_string()),
            email: Some(email.to_string()),
            name: Some("Test User".to_string()),
            picture: None,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
        )
        .unwrap()
    }

    /// Signs in a new provider user and returns (token, local user id).
    pub async fn sign_in(&self, sub: &str, email: &str) -> (String, String) {
        let token = Self::token_for(sub, email);
        let resp = self.get("/api/users/me", Some(&token)).await;
        resp.assert_status(StatusCode::OK);
        let json: serde_json::Value = resp.json();
        (token, json["id"].as_str().unwrap().to_string())
    }

    /// Signs in a user and grants the admin role.
    pub async fn sign_in_admin(&self) -> String {
        let (token, _) = self.sign_in("user_admin", "admin@test.com").await;
        permit_finder::db::queries::users::promote_to_admin(&self.state.db, "admin@test.com")
            .await
            .expect("promote failed");
        token
    }

    // ── Data helpers ─────────────────────────────────────────────────────

    pub async fn insert_office(&self, seed: OfficeSeed) -> String {
        let now = chrono::Utc::now().naive_utc();
        let office = entity::permit_office::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(seed.name.to_string()),
            description: Set(None),
            address: Set("1 Main Street".to_string()),
            city: Set(seed.city.to_string()),
            state: Set(seed.state.to_string()),
            zip_code: Set(seed.zip_code.to_string()),
            phone: Set(None),
            email: Set(None),
            website: Set(None),
            latitude: Set(seed.coordinate.map(|c| c.0)),
            longitude: Set(seed.coordinate.map(|c| c.1)),
            hours: Set("{}".to_string()),
            services_offered: Set("[]".to_string()),
            permit_types: Set(serde_json::to_string(seed.permit_types).unwrap()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.state.db)
        .await
        .expect("insert office failed");
        office.id
    }

    pub async fn create_application(&self, token: &str, office_id: &str) -> String {
        let resp = self
            .send(
                "POST",
                "/api/applications",
                Some(token),
                Some(serde_json::json!({
                    "type": "building",
                    "permitOfficeId": office_id,
                    "applicationData": { "project": "Deck" },
                })),
            )
            .await;
        resp.assert_status(StatusCode::CREATED);
        let json: serde_json::Value = resp.json();
        json["id"].as_str().unwrap().to_string()
    }

    // ── Webhook helpers ──────────────────────────────────────────────────

    pub fn signed_webhook(body: &serde_json::Value, timestamp: i64) -> Request<Body> {
        let payload = serde_json::to_vec(body).unwrap();
        let verifier = WebhookVerifier::new(WEBHOOK_SECRET).unwrap();
        let signature = verifier.sign("msg_test", timestamp, &payload).unwrap();

        Request::builder()
            .method("POST")
            .uri("/api/webhooks/clerk/users")
            .header("Content-Type", "application/json")
            .header("svix-id", "msg_test")
            .header("svix-timestamp", timestamp.to_string())
            .header("svix-signature", signature)
            .body(Body::from(payload))
            .unwrap()
    }
}
