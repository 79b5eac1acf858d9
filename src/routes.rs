use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

fn cors_layer(allowed_origins: &str) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if allowed_origins.trim() == "*" {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    // Reads are public; writes require the admin role
    let office_routes = Router::new()
        .route(
            "/",
            get(handlers::permit_offices::list).post(handlers::permit_offices::create),
        )
        .route(
            "/:id",
            get(handlers::permit_offices::get)
                .put(handlers::permit_offices::update)
                .delete(handlers::permit_offices::delete),
        );

    let review_routes = Router::new()
        .route(
            "/",
            get(handlers::reviews::list).post(handlers::reviews::create),
        )
        .route(
            "/:id",
            get(handlers::reviews::get)
                .put(handlers::reviews::update)
                .delete(handlers::reviews::delete),
        );

    // Owner-scoped; every route requires a session
    let application_routes = Router::new()
        .route(
            "/",
            get(handlers::applications::list).post(handlers::applications::create),
        )
        .route(
            "/:id",
            get(handlers::applications::get)
                .put(handlers::applications::update)
                .delete(handlers::applications::delete),
        )
        .route(
            "/:id/documents",
            post(handlers::applications::add_document),
        )
        .route(
            "/:id/documents/:document_id",
            delete(handlers::applications::delete_document),
        );

    let user_routes = Router::new()
        .route(
            "/me",
            get(handlers::users::me)
                .put(handlers::users::update_me)
                .delete(handlers::users::delete_me),
        )
        .route("/me/applications", get(handlers::users::my_applications))
        .route("/me/reviews", get(handlers::users::my_reviews))
        .route("/me/dashboard", get(handlers::users::dashboard));

    let auth_routes = Router::new()
        .route("/me", get(handlers::auth::me))
        .route("/check", get(handlers::auth::check));

    // Signed by the identity provider, not by a user session
    let webhook_routes = Router::new()
        .route("/clerk/users", post(handlers::webhooks::identity_users))
        .route("/health", get(handlers::webhooks::health));

    Router::new()
        .nest("/api/permit-offices", office_routes)
        .nest("/api/reviews", review_routes)
        .nest("/api/applications", application_routes)
        .nest("/api/users", user_routes)
        .nest("/api/auth", auth_routes)
        .nest("/api/webhooks", webhook_routes)
        .route("/api", get(api_info))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Serialize)]
struct ApiInfo {
    name: &'static str,
    version: &'static str,
    endpoints: [&'static str; 6],
}

async fn api_info() -> Json<ApiInfo> {
    Json(ApiInfo {
        name: "Permit Office Finder API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: [
            "/api/permit-offices",
            "/api/reviews",
            "/api/applications",
            "/api/users",
            "/api/auth",
            "/api/webhooks",
        ],
    })
}
