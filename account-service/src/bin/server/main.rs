use std::sync::Arc;

use account_service::config::Config;
use account_service::config::DATABASE_HOST;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::PostgresUserRepository;
use auth::Authenticator;
use auth::PasswordHasher;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        port = config.port,
        database_host = DATABASE_HOST,
        database_port = config.db_port,
        database = %config.db_name,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect_with(config.database_options())
        .await?;
    tracing::info!(
        max_connections = config.db_max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let password_hasher = PasswordHasher::with_params(config.hashing_params())?;
    let authenticator = Arc::new(Authenticator::with_hasher(
        config.secret_key.as_bytes(),
        password_hasher,
    ));

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let user_service = Arc::new(UserService::new(user_repository, authenticator));

    let http_address = format!("0.0.0.0:{}", config.port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(user_service)).await?;

    tracing::info!("Server exited successfully");

    Ok(())
}
