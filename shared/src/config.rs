use anyhow::{Context, Result};

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: std::env::var("DATABASE_HOST").context("DATABASE_HOST is not set")?,
            port: std::env::var("DATABASE_PORT")
                .context("DATABASE_PORT is not set")?
                .parse()
                .context("failed to parse DATABASE_PORT")?,
            username: std::env::var("DATABASE_USERNAME").context("DATABASE_USERNAME is not set")?,
            password: std::env::var("DATABASE_PASSWORD").context("DATABASE_PASSWORD is not set")?,
            database: std::env::var("DATABASE_NAME").context("DATABASE_NAME is not set")?,
        };
        let auth = AuthConfig {
            jwt_secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            // アクセストークンの有効期限（秒）。未設定なら 1 時間
            ttl: std::env::var("AUTH_TOKEN_TTL")
                .unwrap_or_else(|_| "3600".into())
                .parse()
                .context("failed to parse AUTH_TOKEN_TTL")?,
        };
        Ok(Self { database, auth })
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

pub struct AuthConfig {
    pub jwt_secret: String,
    pub ttl: u64,
}
