pub mod domain;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod system;
pub mod usecases;

use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::http::{header, Method};
    use axum::middleware;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};

    system::tracing::initialize()?;

    let config = shared::config::init_config().context("failed to load config.toml")?;

    let db_path = shared::config::get_database_path(config)?;
    shared::data::db::initialize_database(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let max_upload_bytes = config.server.max_upload_mb * 1024 * 1024;
    let app = routes::configure_routes(max_upload_bytes)
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!("Backend listening on http://{}", config.server.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
