use anyhow::{Context, Result};
use contracts::system::auth::TokenClaims;
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::shared::config::get_config;

/// Validate JWT token and extract claims
pub fn validate_token(token: &str) -> Result<TokenClaims> {
    validate_token_with_secret(token, &get_config().auth.jwt_secret)
}

/// Validate JWT token (HS256) against an explicit secret
pub fn validate_token_with_secret(token: &str, secret: &str) -> Result<TokenClaims> {
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, exp_offset_secs: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: "u-1".to_string(),
            username: "storekeeper".to_string(),
            is_admin: false,
            permissions: vec!["inbound_import".to_string()],
            exp: (now + exp_offset_secs) as usize,
            iat: now as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_is_decoded() {
        let claims = validate_token_with_secret(&token("secret", 3600), "secret").unwrap();
        assert_eq!(claims.username, "storekeeper");
        assert!(claims.has_permission("inbound_import"));
    }

    #[test]
    fn test_wrong_secret_or_expired_token_is_rejected() {
        assert!(validate_token_with_secret(&token("secret", 3600), "other").is_err());
        assert!(validate_token_with_secret(&token("secret", -3600), "secret").is_err());
    }
}
