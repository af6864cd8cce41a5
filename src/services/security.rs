use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::CONFIG;
use crate::error::{AppError, Result};

/// JWT token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User id
    pub role_id: i32,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Create a signed access token for a user
pub fn create_access_token(user_id: &str, role_id: i32) -> Result<String> {
    create_access_token_with_secret(
        user_id,
        role_id,
        &CONFIG.auth.secret_key,
        Duration::minutes(CONFIG.auth.access_token_expire_minutes),
    )
}

pub fn create_access_token_with_secret(
    user_id: &str,
    role_id: i32,
    secret: &str,
    expires_in: Duration,
) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role_id,
        exp: (now + expires_in).timestamp(),
        iat: now.timestamp(),
        jti: uuid::Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), &claims, &key).map_err(|e| e.into())
}

/// Decode and validate an access token
pub fn decode_token(token: &str) -> Result<Claims> {
    decode_token_with_secret(token, &CONFIG.auth.secret_key)
}

pub fn decode_token_with_secret(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    // No clock skew tolerance for expiration check
    validation.leeway = 0;

    let key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &key, &validation)?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn test_token_round_trip() {
        let token =
            create_access_token_with_secret("user-1", 7, SECRET, Duration::minutes(5)).unwrap();
        let claims = decode_token_with_secret(&token, SECRET).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role_id, 7);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let token =
            create_access_token_with_secret("user-1", 1, SECRET, Duration::minutes(5)).unwrap();
        assert!(decode_token_with_secret(&token, "another-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token =
            create_access_token_with_secret("user-1", 1, SECRET, Duration::minutes(-5)).unwrap();
        let err = decode_token_with_secret(&token, SECRET).unwrap_err();
        assert!(matches!(err, AppError::Jwt(_)));
    }

    #[test]
    fn test_verify_password() {
        let hash = bcrypt::hash("owner123", 4).unwrap();
        assert!(verify_password("owner123", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("owner123", "not-a-hash"));
    }
}
