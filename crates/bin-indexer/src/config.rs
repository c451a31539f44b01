//! Configuration management
//!
//! Settings come from the environment (optionally seeded from a `.env`
//! file). Unset variables fall back to the defaults below; set but
//! unparseable values are rejected.

use url::Url;

use crate::error::ConfigError;

// ============================================================================
// Redis Configuration Constants
// ============================================================================

/// Default Redis host.
pub const DEFAULT_REDIS_HOST: &str = "localhost";

/// Default Redis port.
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Default Redis logical database.
pub const DEFAULT_REDIS_DB: i64 = 0;

// ============================================================================
// S3 Configuration Constants
// ============================================================================

/// Default S3 region.
pub const DEFAULT_S3_REGION: &str = "us-east-1";

/// Indexer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub redis: RedisConfig,
    pub s3: S3Config,
}

/// Detail store connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub password: Option<String>,
}

/// Object storage settings for `s3://` inputs and outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    /// Custom endpoint (MinIO, LocalStack); `None` means AWS
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub path_style: bool,
}

impl Config {
    /// Load configuration from `.env`, the environment and defaults
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            redis: RedisConfig {
                host: lookup("REDIS_HOST").unwrap_or_else(|| DEFAULT_REDIS_HOST.to_string()),
                port: parse_var(&lookup, "REDIS_PORT")?.unwrap_or(DEFAULT_REDIS_PORT),
                db: parse_var(&lookup, "REDIS_DB")?.unwrap_or(DEFAULT_REDIS_DB),
                password: lookup("REDIS_PASSWORD").filter(|p| !p.is_empty()),
            },
            s3: S3Config {
                endpoint: lookup("S3_ENDPOINT").filter(|e| !e.is_empty()),
                region: lookup("S3_REGION").unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
                access_key: lookup("S3_ACCESS_KEY").or_else(|| lookup("AWS_ACCESS_KEY_ID")),
                secret_key: lookup("S3_SECRET_KEY").or_else(|| lookup("AWS_SECRET_ACCESS_KEY")),
                path_style: parse_var(&lookup, "S3_PATH_STYLE")?.unwrap_or(false),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.redis.host.trim().is_empty() {
            return Err(ConfigError::invalid_env("REDIS_HOST", &self.redis.host));
        }

        if self.redis.port == 0 {
            return Err(ConfigError::invalid_env("REDIS_PORT", "0"));
        }

        if self.redis.db < 0 {
            return Err(ConfigError::invalid_env("REDIS_DB", self.redis.db.to_string()));
        }

        if self.s3.region.trim().is_empty() {
            return Err(ConfigError::invalid_env("S3_REGION", &self.s3.region));
        }

        // Static credentials only make sense as a pair
        if self.s3.access_key.is_some() != self.s3.secret_key.is_some() {
            return Err(ConfigError::invalid_env(
                "S3_ACCESS_KEY/S3_SECRET_KEY",
                "only one of the pair is set",
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis: RedisConfig {
                host: DEFAULT_REDIS_HOST.to_string(),
                port: DEFAULT_REDIS_PORT,
                db: DEFAULT_REDIS_DB,
                password: None,
            },
            s3: S3Config {
                endpoint: None,
                region: DEFAULT_S3_REGION.to_string(),
                access_key: None,
                secret_key: None,
                path_style: false,
            },
        }
    }
}

impl RedisConfig {
    /// `redis://[:password@]host:port/db`
    pub fn connection_url(&self) -> Result<Url, ConfigError> {
        let mut url = Url::parse(&format!("redis://{}:{}/{}", self.host, self.port, self.db))
            .map_err(|_| ConfigError::invalid_env("REDIS_HOST", &self.host))?;

        if let Some(password) = &self.password {
            url.set_password(Some(password))
                .map_err(|_| ConfigError::invalid_env("REDIS_PASSWORD", "<redacted>"))?;
        }

        Ok(url)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::invalid_env(name, raw)),
        None => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            config.redis.connection_url().unwrap().as_str(),
            "redis://localhost:6379/0"
        );
    }

    #[test]
    fn test_redis_overrides() {
        let config = from_vars(&[
            ("REDIS_HOST", "cache.internal"),
            ("REDIS_PORT", "6380"),
            ("REDIS_DB", "3"),
            ("REDIS_PASSWORD", "s3cret"),
        ])
        .unwrap();

        assert_eq!(config.redis.port, 6380);
        assert_eq!(
            config.redis.connection_url().unwrap().as_str(),
            "redis://:s3cret@cache.internal:6380/3"
        );
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = from_vars(&[("REDIS_PORT", "not-a-port")]).unwrap_err();
        assert_eq!(err, ConfigError::invalid_env("REDIS_PORT", "not-a-port"));

        assert!(from_vars(&[("REDIS_PORT", "0")]).is_err());
        assert!(from_vars(&[("REDIS_DB", "-1")]).is_err());
    }

    #[test]
    fn test_s3_settings() {
        let config = from_vars(&[
            ("S3_ENDPOINT", "http://localhost:9000"),
            ("AWS_ACCESS_KEY_ID", "minioadmin"),
            ("S3_SECRET_KEY", "minioadmin"),
            ("S3_PATH_STYLE", "true"),
        ])
        .unwrap();

        assert_eq!(config.s3.endpoint.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.s3.region, DEFAULT_S3_REGION);
        assert_eq!(config.s3.access_key.as_deref(), Some("minioadmin"));
        assert!(config.s3.path_style);
    }

    #[test]
    fn test_half_credentials_rejected() {
        assert!(from_vars(&[("S3_ACCESS_KEY", "key")]).is_err());
        assert!(from_vars(&[("S3_PATH_STYLE", "maybe")]).is_err());
    }
}
