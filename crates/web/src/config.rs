//! Web application settings loaded from environment variables.

use std::env;

use common::{AppError, AppResult, CookieConfig, DatabaseConfig, JwtConfig, ServerConfig};
use domain::{DEFAULT_JWT_EXPIRATION_HOURS, MIN_JWT_SECRET_LENGTH};

const DEV_JWT_SECRET: &str = "dev-secret-key-minimum-32-chars!!";

/// Application configuration. Secrets are redacted by the nested configs.
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cookies: CookieConfig,
    /// Language code of the message catalog (`en`, `pt-br`)
    pub language: String,
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Fails when `JWT_SECRET` is missing in a release build or shorter than
    /// the minimum length.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                DEV_JWT_SECRET.to_string()
            }
            Err(_) => {
                return Err(AppError::internal(
                    "JWT_SECRET environment variable must be set in production",
                ))
            }
        };

        if secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::internal(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        let server_defaults = ServerConfig::default();
        let database_defaults = DatabaseConfig::default();

        Ok(Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(server_defaults.host),
                port: parse_var("SERVER_PORT").unwrap_or(server_defaults.port),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(database_defaults.url),
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or(database_defaults.max_connections),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or(database_defaults.min_connections),
            },
            jwt: JwtConfig {
                secret,
                expiration_hours: parse_var("JWT_EXPIRATION_HOURS")
                    .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            },
            cookies: CookieConfig {
                secure: parse_var("COOKIE_SECURE").unwrap_or(false),
            },
            language: env::var("APP_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
        })
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            jwt: JwtConfig {
                secret: DEV_JWT_SECRET.to_string(),
                expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            },
            cookies: CookieConfig::default(),
            language: "en".to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let config = WebConfig::default();
        let printed = format!("{:?}", config);
        assert!(!printed.contains(DEV_JWT_SECRET));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn test_server_addr() {
        let mut config = WebConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 8080;
        assert_eq!(config.server_addr(), "127.0.0.1:8080");
    }
}
