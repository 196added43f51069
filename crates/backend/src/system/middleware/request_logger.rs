use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::shared::format::format_number;

/// Middleware для логирования HTTP запросов: метод, путь, статус, длительность, размер ответа
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // тело читается целиком, чтобы узнать реальный размер
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(
                "{} {} -> {} in {}ms (body error: {})",
                method,
                path,
                parts.status.as_u16(),
                start.elapsed().as_millis(),
                e
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    tracing::info!(
        "{} {} -> {} in {}ms, {} bytes",
        method,
        path,
        parts.status.as_u16(),
        start.elapsed().as_millis(),
        format_number(bytes.len())
    );

    Response::from_parts(parts, Body::from(bytes))
}
