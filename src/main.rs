use std::net::SocketAddr;
use std::sync::Arc;

use http::header::{HeaderValue, CACHE_CONTROL};
use inventory_catalog::config::Config;
use inventory_catalog::db::{create_pool, run_migrations, PgItemStore};
use inventory_catalog::proto::health::health_server::HealthServer;
use inventory_catalog::proto::items::items_service_server::ItemsServiceServer;
use inventory_catalog::services::{HealthServiceImpl, ItemService, ItemsServiceImpl};
use inventory_catalog::storage::AssetStore;

use tonic::transport::Server;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inventory_catalog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting inventory-catalog gRPC server...");
    tracing::info!("Connecting to database...");

    // Create database pool
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    tracing::info!("Database connection established");

    if config.run_migrations {
        run_migrations(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let assets = AssetStore::new(&config.asset_root, config.asset_lock_mode).await?;
    tracing::info!(
        "Asset store ready: root={}, lock_mode={:?}",
        config.asset_root.display(),
        config.asset_lock_mode
    );

    // Create services
    let store = Arc::new(PgItemStore::new(pool.clone()));
    let items = Arc::new(ItemService::new(store, assets));
    let items_service = ItemsServiceImpl::new(items);
    let health_service = HealthServiceImpl::with_pool(pool);

    // CORS layer for gRPC-Web
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any)
        .expose_headers(Any);

    // Responses must never be cached by intermediaries
    let no_cache = SetResponseHeaderLayer::overriding(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate, max-age=0"),
    );

    // Parse server address
    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!("Listening on {}", addr);

    // Build and run server with gRPC-Web support
    Server::builder()
        .accept_http1(true) // Required for gRPC-Web
        .layer(TraceLayer::new_for_grpc())
        .layer(cors)
        .layer(no_cache)
        .layer(tonic_web::GrpcWebLayer::new()) // Enable gRPC-Web
        .add_service(ItemsServiceServer::new(items_service))
        .add_service(HealthServer::new(health_service))
        .serve(addr)
        .await?;

    Ok(())
}
