use serde::{Deserialize, Serialize};

/// Право на приёмку товара из файлов поставщиков
pub const PERMISSION_INBOUND_IMPORT: &str = "inbound_import";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String, // user_id
    pub username: String,
    pub is_admin: bool,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: usize, // expiration timestamp
    pub iat: usize, // issued at
}

impl TokenClaims {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.is_admin || self.permissions.iter().any(|p| p == permission)
    }
}
