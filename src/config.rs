use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub auth: AuthConfig,
    pub minio_endpoint: String,
    pub minio_bucket: String,
    pub minio_access_key: String,
    pub minio_secret_key: String,
}

impl AppConfig {
    /// Read configuration from the environment. `DATABASE_URL` and
    /// `JWT_SECRET` are mandatory; without the signing secret the whole
    /// auth flow fails closed at startup.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let auth = AuthConfig {
            secret: std::env::var("JWT_SECRET")?,
            token_ttl_hours: std::env::var("JWT_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
        };
        Ok(Self {
            database_url,
            auth,
            minio_endpoint: std::env::var("MINIO_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".into()),
            minio_bucket: std::env::var("MINIO_BUCKET").unwrap_or_else(|_| "stockroom".into()),
            minio_access_key: std::env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minio".into()),
            minio_secret_key: std::env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minio".into()),
        })
    }
}
