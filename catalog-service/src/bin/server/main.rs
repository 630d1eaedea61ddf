use std::sync::Arc;

use auth::Authenticator;
use axum_extra::extract::cookie::Key;
use catalog_service::account::ports::AccountServicePort;
use catalog_service::account::service::AccountService;
use catalog_service::catalog::ports::CatalogServicePort;
use catalog_service::catalog::service::CatalogService;
use catalog_service::config::Config;
use catalog_service::config::StorageBackend;
use catalog_service::inbound::http::router::create_router;
use catalog_service::inbound::http::router::SessionSettings;
use catalog_service::repositories::InMemoryCatalogRepository;
use catalog_service::repositories::InMemoryCredentialRepository;
use catalog_service::repositories::PostgresAuthorRepository;
use catalog_service::repositories::PostgresBookRepository;
use catalog_service::repositories::PostgresCredentialRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "catalog-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        backend = ?config.database.backend,
        http_port = config.server.http_port,
        token_validity_hours = config.jwt.expiration_hours,
        secure_cookie = config.session.secure_cookie,
        "Configuration loaded"
    );

    let authenticator = Arc::new(Authenticator::new(
        config.jwt.secret.as_bytes(),
        config.jwt.token_validity(),
    ));

    let (account_service, catalog_service) =
        build_services(&config, Arc::clone(&authenticator)).await?;

    let session = SessionSettings {
        key: session_key(&config)?,
        secure_cookie: config.session.secure_cookie,
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(account_service, catalog_service, authenticator, session);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn build_services(
    config: &Config,
    authenticator: Arc<Authenticator>,
) -> Result<(Arc<dyn AccountServicePort>, Arc<dyn CatalogServicePort>), anyhow::Error> {
    match config.database.backend {
        StorageBackend::Postgres => {
            let url = config
                .database
                .url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("database.url is required for postgres"))?;

            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let credentials = Arc::new(PostgresCredentialRepository::new(pg_pool.clone()));
            let books = Arc::new(PostgresBookRepository::new(pg_pool.clone()));
            let authors = Arc::new(PostgresAuthorRepository::new(pg_pool));

            let account_service: Arc<dyn AccountServicePort> =
                Arc::new(AccountService::new(credentials, authenticator));
            let catalog_service: Arc<dyn CatalogServicePort> =
                Arc::new(CatalogService::new(books, authors));

            Ok((account_service, catalog_service))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");

            let credentials = Arc::new(InMemoryCredentialRepository::new());
            let catalog = Arc::new(InMemoryCatalogRepository::new());

            let account_service: Arc<dyn AccountServicePort> =
                Arc::new(AccountService::new(credentials, authenticator));
            let catalog_service: Arc<dyn CatalogServicePort> =
                Arc::new(CatalogService::new(Arc::clone(&catalog), catalog));

            Ok((account_service, catalog_service))
        }
    }
}

fn session_key(config: &Config) -> Result<Key, anyhow::Error> {
    match config.session.secret.as_deref() {
        Some(secret) => Key::try_from(secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid session.secret: {}", e)),
        None => {
            tracing::warn!("No session.secret configured; sessions will not survive a restart");
            Ok(Key::generate())
        }
    }
}
