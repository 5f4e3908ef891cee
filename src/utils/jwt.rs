//! JWT helpers
//!
//! Session token generation and verification for the web panel and the
//! mobile app. Tokens are HS256-signed and carry the user id plus role.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::environment::EnvironmentConfig, utils::errors::AppError};

/// Claims carried by a session token
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,  // user id
    pub role: String, // role name at issue time
    pub exp: usize,   // expiration timestamp
    pub iat: usize,   // issued at timestamp
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_secs: u64,
}

impl From<&EnvironmentConfig> for JwtConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration_secs: config.jwt_expiration,
        }
    }
}

/// Generate a session token for a user
pub fn generate_token(user_id: Uuid, role: &str, config: &JwtConfig) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::seconds(config.expiration_secs as i64);

    let claims = JwtClaims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let encoding_key = EncodingKey::from_secret(config.secret.as_ref());

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| AppError::Jwt(format!("Error generating token: {}", e)))
}

/// Verify and decode a session token
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<JwtClaims, AppError> {
    let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

    let token_data = decode::<JwtClaims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AppError::Jwt(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}

/// Extract the bearer token from an Authorization header value
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Jwt("Authorization header must start with 'Bearer '".to_string()))?;

    if token.is_empty() {
        return Err(AppError::Jwt("Token is empty".to_string()));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            expiration_secs: 3600,
        }
    }

    #[test]
    fn generate_and_verify_roundtrip() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let token = generate_token(user_id, "Super Admin", &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, "Super Admin");
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let config = test_config();
        let token = generate_token(Uuid::new_v4(), "Admin", &config).unwrap();
        let other = JwtConfig {
            secret: "other-secret".to_string(),
            expiration_secs: 3600,
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn extract_token_requires_bearer_prefix() {
        assert!(extract_token_from_header("Token abc").is_err());
        assert_eq!(extract_token_from_header("Bearer abc").unwrap(), "abc");
    }
}
