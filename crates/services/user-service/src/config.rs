//! User service configuration.

use std::env;
use std::str::FromStr;

use common::{AppError, AppResult, DatabaseConfig, JwtConfig, ServiceConfig};

/// User service configuration.
#[derive(Debug, Clone)]
pub struct UserServiceConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    /// Mark auth cookies `Secure` (HTTPS only)
    pub secure_cookies: bool,
}

impl UserServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing values fall back to defaults. Present but unparsable values are
    /// configuration errors. Key material is checked later, when the server
    /// builds its token settings, so migrations run without it.
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();

        let service = ServiceConfig {
            service_name: defaults.service.service_name,
            host: env::var("USER_SERVICE_HOST").unwrap_or(defaults.service.host),
            port: parse_var("USER_SERVICE_PORT", defaults.service.port)?,
        };

        let database = DatabaseConfig {
            url: env::var("USER_SERVICE_DATABASE_URL")
                .or_else(|_| env::var("DATABASE_URL"))
                .unwrap_or(defaults.database.url),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", defaults.database.max_connections)?,
            min_connections: parse_var("DATABASE_MIN_CONNECTIONS", defaults.database.min_connections)?,
        };
        if database.max_connections == 0 || database.min_connections > database.max_connections {
            return Err(AppError::configuration(
                "database pool bounds must satisfy 0 < min <= max",
            ));
        }

        let signing_key = key_var("JWT_SIGNING_KEY")?
            .or(env::var("JWT_SECRET").ok())
            .unwrap_or_default();

        let jwt = JwtConfig {
            algorithm: env::var("JWT_ALGORITHM").unwrap_or(defaults.jwt.algorithm),
            signing_key,
            verification_key: key_var("JWT_VERIFICATION_KEY")?,
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.jwt.issuer),
            audience: env::var("JWT_AUDIENCE").ok(),
            access_ttl_seconds: parse_var("JWT_ACCESS_TTL_SECONDS", defaults.jwt.access_ttl_seconds)?,
            refresh_ttl_seconds: parse_var(
                "JWT_REFRESH_TTL_SECONDS",
                defaults.jwt.refresh_ttl_seconds,
            )?,
        };

        Ok(Self {
            service,
            database,
            jwt,
            secure_cookies: parse_var("COOKIE_SECURE", defaults.secure_cookies)?,
        })
    }
}

impl Default for UserServiceConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            database: DatabaseConfig::default(),
            jwt: JwtConfig::default(),
            secure_cookies: false,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::configuration(format!("{} has an invalid value", name))),
        Err(_) => Ok(default),
    }
}

/// Read a key inline from `NAME` or from the file named by `NAME_FILE`.
fn key_var(name: &str) -> AppResult<Option<String>> {
    if let Ok(value) = env::var(name) {
        return Ok(Some(value));
    }
    let file_var = format!("{}_FILE", name);
    match env::var(&file_var) {
        Ok(path) => std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| AppError::configuration(format!("cannot read {} ({}): {}", file_var, path, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_default_when_missing() {
        let port: u16 = parse_var("USER_SERVICE_TEST_UNSET_PORT", 3000).unwrap();
        assert_eq!(port, 3000);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("USER_SERVICE_TEST_BAD_TTL", "forever");
        let result: AppResult<i64> = parse_var("USER_SERVICE_TEST_BAD_TTL", 60);
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_key_var_reads_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/rsa_public.pem");
        env::set_var("USER_SERVICE_TEST_KEY_FILE", path);

        let key = key_var("USER_SERVICE_TEST_KEY").unwrap().unwrap();
        assert!(key.starts_with("-----BEGIN PUBLIC KEY-----"));
    }
}
