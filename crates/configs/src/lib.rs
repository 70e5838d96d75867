//! # configs
//!
//! Process settings, read once at startup from the environment (and a
//! `.env` file when present).
//!
//! | Variable | Default |
//! |---|---|
//! | `DATABASE_URL` | required |
//! | `JWT_SECRET` | required |
//! | `HOST` | `127.0.0.1` |
//! | `PORT` | `5000` |
//! | `TOKEN_TTL_SECS` | `10800` (3 hours) |
//! | `CORS_ORIGIN` | unset (any origin); else one `http(s)://host[:port]` |
//! | `ARGON2_MEMORY_KIB` / `ARGON2_ITERATIONS` / `ARGON2_PARALLELISM` | `19456` / `2` / `1` |

use config::{Config, Environment};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

/// Argon2 cost parameters, passed through to the auth plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: SecretString,
    pub host: String,
    pub port: u16,
    pub token_ttl_secs: i64,
    pub cors_origin: Option<String>,
    pub hashing: HashingSettings,
}

#[derive(Deserialize)]
struct RawSettings {
    database_url: Option<String>,
    jwt_secret: Option<String>,
    host: String,
    port: u16,
    token_ttl_secs: i64,
    cors_origin: Option<String>,
    argon2_memory_kib: u32,
    argon2_iterations: u32,
    argon2_parallelism: u32,
}

impl Settings {
    /// Loads `.env` (if any) and then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("no .env loaded: {e}");
        }
        Self::from_environment(Environment::default())
    }

    /// Same as `load`, but reads `vars` instead of the process environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::from_environment(Environment::default().source(Some(vars.into_iter().collect())))
    }

    fn from_environment(env: Environment) -> Result<Self, ConfigError> {
        let raw: RawSettings = Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 5000)?
            .set_default("token_ttl_secs", 10_800)?
            .set_default("argon2_memory_kib", 19_456)?
            .set_default("argon2_iterations", 2)?
            .set_default("argon2_parallelism", 1)?
            .add_source(env)
            .build()?
            .try_deserialize()?;

        let database_url = required(raw.database_url, "DATABASE_URL")?;
        let jwt_secret = required(raw.jwt_secret, "JWT_SECRET")?;
        if raw.token_ttl_secs <= 0 {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_SECS",
                reason: "must be positive".to_string(),
            });
        }

        let cors_origin = raw
            .cors_origin
            .filter(|o| !o.trim().is_empty())
            .map(|o| parse_cors_origin(o.trim()))
            .transpose()?;

        Ok(Self {
            database_url,
            jwt_secret: SecretString::from(jwt_secret),
            host: raw.host,
            port: raw.port,
            token_ttl_secs: raw.token_ttl_secs,
            cors_origin,
            hashing: HashingSettings {
                memory_kib: raw.argon2_memory_kib,
                iterations: raw.argon2_iterations,
                parallelism: raw.argon2_parallelism,
            },
        })
    }
}

/// A single `scheme://host[:port]` origin, serialized the way browsers send
/// it in the `Origin` header. Wildcards are not accepted.
fn parse_cors_origin(value: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "CORS_ORIGIN",
        reason,
    };
    let url = Url::parse(value).map_err(|e| invalid(format!("{value:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
        return Err(invalid(format!("{value:?} is not an http(s) origin")));
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(format!("{value:?} must not carry a path")));
    }
    Ok(url.origin().ascii_serialization())
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_fill_the_optional_settings() {
        let settings = Settings::from_vars(vars(&[
            ("DATABASE_URL", "sqlite://diary.db"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(settings.database_url, "sqlite://diary.db");
        assert_eq!(settings.jwt_secret.expose_secret(), "s3cret");
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.token_ttl_secs, 3 * 60 * 60);
        assert_eq!(settings.cors_origin, None);
        assert_eq!(settings.hashing.memory_kib, 19_456);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_vars(vars(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "s3cret"),
            ("PORT", "8080"),
            ("TOKEN_TTL_SECS", "60"),
            ("CORS_ORIGIN", "http://localhost:3000"),
        ]))
        .unwrap();

        assert_eq!(settings.port, 8080);
        assert_eq!(settings.token_ttl_secs, 60);
        assert_eq!(settings.cors_origin.as_deref(), Some("http://localhost:3000"));
    }

    #[test]
    fn test_missing_database_url_is_fatal() {
        let err = Settings::from_vars(vars(&[("JWT_SECRET", "s3cret")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let err = Settings::from_vars(vars(&[("DATABASE_URL", "sqlite::memory:"), ("JWT_SECRET", "")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let settings = Settings::from_vars(vars(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "hunter2"),
        ]))
        .unwrap();
        assert!(!format!("{settings:?}").contains("hunter2"));
    }

    #[test]
    fn test_cors_origin_is_checked_at_load() {
        let with_origin = |origin: &str| {
            Settings::from_vars(vars(&[
                ("DATABASE_URL", "sqlite::memory:"),
                ("JWT_SECRET", "s3cret"),
                ("CORS_ORIGIN", origin),
            ]))
        };

        for bad in ["*", "localhost:3000", "ftp://files.x.com", "http://x.com/app", "not a url"] {
            let err = with_origin(bad).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { name: "CORS_ORIGIN", .. }),
                "accepted {bad:?}"
            );
        }

        let settings = with_origin("https://diary.example.com/").unwrap();
        assert_eq!(settings.cors_origin.as_deref(), Some("https://diary.example.com"));
    }

    #[test]
    fn test_numeric_looking_secret_is_kept_verbatim() {
        let settings = Settings::from_vars(vars(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "007"),
            ("PORT", "8080"),
        ]))
        .unwrap();
        assert_eq!(settings.jwt_secret.expose_secret(), "007");
        assert_eq!(settings.port, 8080);
    }

    #[test]
    fn test_non_positive_ttl_is_rejected() {
        let err = Settings::from_vars(vars(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "s3cret"),
            ("TOKEN_TTL_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "TOKEN_TTL_SECS", .. }));
    }
}
