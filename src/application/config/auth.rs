use std::env;

pub const DEV_SECRET_KEY: &str = "gelis-dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign access tokens
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            secret_key: env::var("GELIS_SECRET_KEY").unwrap_or_else(|_| DEV_SECRET_KEY.to_string()),
            access_token_expire_minutes: env::var("GELIS_ACCESS_TOKEN_EXPIRE_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60 * 24 * 30),
        }
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET_KEY
    }
}
