use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, system};

/// Конфигурация всех роутов приложения
pub fn configure_routes(max_upload_bytes: usize) -> Router {
    // Приёмка: только пользователи с правом inbound_import (или админы)
    let inbound_import = Router::new()
        .route(
            "/api/u508/inbound-import",
            post(handlers::u508_inbound_import::import),
        )
        .route(
            "/api/u508/inbound-import/preview",
            post(handlers::u508_inbound_import::preview),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn(
            system::auth::middleware::require_inbound_import,
        ));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(inbound_import)
        .route(
            "/api/u508/inbound-import/locations",
            get(handlers::u508_inbound_import::locations),
        )
        // A025 Device catalog
        .route(
            "/api/a025/device",
            get(handlers::a025_device::list_all)
                .post(handlers::a025_device::upsert)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        // A026 Stock box
        .route(
            "/api/a026/stock-box/:id",
            get(handlers::a026_stock_box::get_by_id)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        .route(
            "/api/a026/stock-box/:id/label",
            get(handlers::a026_stock_box::label)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
        // A028 Inbound import journal
        .route(
            "/api/a028/inbound-import",
            get(handlers::a028_inbound_import::list_recent)
                .layer(middleware::from_fn(system::auth::middleware::require_auth)),
        )
}
