use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::auth::token::MAX_TTL_SECS;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Upper bound on pooled Postgres connections.
    pub db_max_connections: u32,
    /// Secret used to sign bearer tokens. Never has a built-in default.
    pub token_secret: String,
    /// Lifetime of issued access tokens in seconds.
    pub token_ttl_secs: i64,
    pub password_hash: PasswordHashConfig,
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so parsing can be
    /// exercised without touching the process environment.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            lookup(key).with_context(|| format!("missing required env var: {key}"))
        };
        let optional = |key: &str, default: &str| -> String {
            lookup(key).unwrap_or_else(|| default.to_owned())
        };

        let token_secret = required("TOKEN_SECRET")?;
        if token_secret.trim().is_empty() {
            bail!("TOKEN_SECRET must not be empty");
        }

        let token_ttl_secs: i64 = parse(&optional("TOKEN_TTL_SECS", "900"), "TOKEN_TTL_SECS")?;
        if !(1..=MAX_TTL_SECS).contains(&token_ttl_secs) {
            bail!("TOKEN_TTL_SECS must be between 1 and {MAX_TTL_SECS}, got {token_ttl_secs}");
        }

        let defaults = PasswordHashConfig::default();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: parse(&optional("SERVER_PORT", "8080"), "SERVER_PORT")?,
            db_max_connections: parse(&optional("DB_MAX_CONNECTIONS", "10"), "DB_MAX_CONNECTIONS")?,
            token_secret,
            token_ttl_secs,
            password_hash: PasswordHashConfig {
                memory_kib: parse(
                    &optional("PASSWORD_HASH_MEMORY_KIB", &defaults.memory_kib.to_string()),
                    "PASSWORD_HASH_MEMORY_KIB",
                )?,
                iterations: parse(
                    &optional("PASSWORD_HASH_ITERATIONS", &defaults.iterations.to_string()),
                    "PASSWORD_HASH_ITERATIONS",
                )?,
            },
        })
    }
}

fn parse<T>(raw: &str, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{key} must be a valid number, got: {raw:?}"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_absent() {
        let cfg = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/plants"),
            ("TOKEN_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(cfg.server_host, "0.0.0.0");
        assert_eq!(cfg.server_port, 8080);
        assert_eq!(cfg.db_max_connections, 10);
        assert_eq!(cfg.token_ttl_secs, 900);
        assert_eq!(cfg.password_hash, PasswordHashConfig::default());
    }

    #[test]
    fn missing_token_secret_errors() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/plants")]))
            .unwrap_err();
        assert!(err.to_string().contains("TOKEN_SECRET"));
    }

    #[test]
    fn blank_token_secret_errors() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/plants"),
            ("TOKEN_SECRET", "   "),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn missing_database_url_errors() {
        let err = Config::from_lookup(lookup(&[("TOKEN_SECRET", "s3cret")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn invalid_port_errors() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/plants"),
            ("TOKEN_SECRET", "s3cret"),
            ("SERVER_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"));
    }

    fn ttl_error(raw: &str) -> String {
        Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/plants"),
            ("TOKEN_SECRET", "s3cret"),
            ("TOKEN_TTL_SECS", raw),
        ]))
        .unwrap_err()
        .to_string()
    }

    #[test]
    fn token_ttl_must_be_positive() {
        assert!(ttl_error("0").contains("TOKEN_TTL_SECS must be between 1 and"));
        assert!(ttl_error("-5").contains("got -5"));
    }

    #[test]
    fn token_ttl_above_one_year_errors() {
        assert!(ttl_error("1000000000000000").contains("TOKEN_TTL_SECS"));
        assert!(ttl_error(&(MAX_TTL_SECS + 1).to_string()).contains("TOKEN_TTL_SECS"));
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/plants"),
            ("TOKEN_SECRET", "s3cret"),
            ("SERVER_PORT", "9000"),
            ("TOKEN_TTL_SECS", "60"),
            ("PASSWORD_HASH_MEMORY_KIB", "1024"),
            ("PASSWORD_HASH_ITERATIONS", "1"),
        ]))
        .unwrap();

        assert_eq!(cfg.server_port, 9000);
        assert_eq!(cfg.token_ttl_secs, 60);
        assert_eq!(cfg.password_hash.memory_kib, 1024);
        assert_eq!(cfg.password_hash.iterations, 1);
    }
}
