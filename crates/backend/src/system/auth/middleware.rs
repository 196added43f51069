use axum::{body::Body, extract::Request, http::StatusCode, middleware::Next, response::Response};
use contracts::system::auth::{TokenClaims, PERMISSION_INBOUND_IMPORT};

/// Bearer token from the Authorization header, decoded into claims
fn claims_from_request(req: &Request<Body>) -> Result<TokenClaims, StatusCode> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    super::jwt::validate_token(token).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        StatusCode::UNAUTHORIZED
    })
}

/// Middleware that requires valid JWT authentication
pub async fn require_auth(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let claims = claims_from_request(&req)?;

    // Add claims to request extensions for use in handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Middleware that requires the inbound import permission (admins always pass)
pub async fn require_inbound_import(
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = claims_from_request(&req)?;

    if !claims.has_permission(PERMISSION_INBOUND_IMPORT) {
        tracing::warn!(
            "User {} denied: missing '{}' permission",
            claims.username,
            PERMISSION_INBOUND_IMPORT
        );
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
