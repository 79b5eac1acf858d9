use std::net::SocketAddr;
use std::sync::Arc;

use permit_finder::auth::identity::{HttpDirectory, IdentityDirectory};
use permit_finder::auth::session::SessionVerifier;
use permit_finder::auth::webhook::WebhookVerifier;
use permit_finder::config::Config;
use permit_finder::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "permit_finder=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let db = permit_finder::db::pool::connect(&config.database_url).await?;
    tracing::info!("Connected to database");

    permit_finder::db::migration::run(&db).await?;
    tracing::info!("Migrations applied");

    // Subcommands: `seed`, `promote <email>`
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("seed") => {
            let result = permit_finder::seed::load_sample_offices(&db).await?;
            println!(
                "Seeded {} permit offices ({} already present)",
                result.created, result.skipped
            );
            return Ok(());
        }
        Some("promote") => {
            let Some(email) = args.get(2) else {
                eprintln!("Usage: permit-finder promote <email>");
                std::process::exit(2);
            };
            if permit_finder::db::queries::users::promote_to_admin(&db, email).await? {
                println!("Promoted {email} to admin role.");
            } else {
                println!("User {email} is already an admin.");
            }
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown command: {other}");
            std::process::exit(2);
        }
        None => {}
    }

    let sessions = SessionVerifier::new(&config)?;

    let directory: Option<Arc<dyn IdentityDirectory>> = match config.identity_secret_key {
        Some(ref key) => Some(Arc::new(HttpDirectory::new(&config.identity_api_url, key))),
        None => {
            tracing::warn!("IDENTITY_SECRET_KEY not set; new users are provisioned from token claims");
            None
        }
    };

    let webhooks = match config.webhook_secret {
        Some(ref secret) => Some(WebhookVerifier::new(secret)?),
        None => {
            tracing::warn!("WEBHOOK_SECRET not set; identity webhooks will be rejected");
            None
        }
    };

    let state = AppState {
        db,
        sessions,
        directory,
        webhooks,
        config: config.clone(),
    };

    let app = permit_finder::routes::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;

    tracing::info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
