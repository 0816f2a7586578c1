//! MedTrack - Main Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Method};
use axum::Router;
use rand::Rng;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medtrack_backend::{
    api,
    config::Config,
    db,
    error::{AppError, Result},
    services::user_service,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medtrack_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Starting MedTrack");

    // Connect to database
    let db_pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;
    tracing::info!("Database migrations complete");

    // Provision admin user on first boot
    provision_admin_user(&db_pool, &config).await?;

    // Create application state
    let state = Arc::new(api::AppState::new(config.clone(), db_pool));

    // Build router
    let cors_origin = config
        .cors_origin
        .parse()
        .map_err(|_| AppError::Config(format!("Invalid CORS origin: {}", config.cors_origin)))?;
    let app = Router::new()
        .merge(api::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::exact(cors_origin))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.bind_address.parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Provision the initial admin user on first boot.
///
/// Uses `ADMIN_PASSWORD` when set; otherwise generates a random password
/// and logs it once so the operator can complete first login.
async fn provision_admin_user(db: &sqlx::PgPool, config: &Config) -> Result<()> {
    let admin_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin')")
            .fetch_one(db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

    if admin_exists {
        return Ok(());
    }

    let (password, generated) = match &config.admin_password {
        Some(p) if !p.is_empty() => (p.clone(), false),
        _ => {
            const CHARSET: &[u8] =
                b"abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ23456789!@#$%&*";
            let mut rng = rand::thread_rng();
            let p: String = (0..20)
                .map(|_| {
                    let idx = rng.gen_range(0..CHARSET.len());
                    CHARSET[idx] as char
                })
                .collect();
            (p, true)
        }
    };

    let password_hash = user_service::hash_password(&password)?;

    sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, first_name, last_name, role)
        VALUES ('admin', 'admin@localhost', $1, 'System', 'Administrator', 'admin')
        ON CONFLICT (username) DO NOTHING
        "#,
    )
    .bind(&password_hash)
    .execute(db)
    .await
    .map_err(|e| AppError::Database(e.to_string()))?;

    if generated {
        tracing::info!(
            "Initial admin user created (admin@localhost). Generated password: {}",
            password
        );
    } else {
        tracing::info!("Admin user created with password from ADMIN_PASSWORD env var");
    }

    Ok(())
}
