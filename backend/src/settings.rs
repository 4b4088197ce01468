//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `APID_*` environment variables, an optional configuration
//! file and command-line flags. The listener address has defaults; the
//! database settings are optional and accessors fill in pool defaults.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Configuration values controlling the HTTP listener and the user store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "APID")]
pub struct ServiceSettings {
    /// Interface the HTTP server binds to.
    #[ortho_config(default = DEFAULT_HOST.to_owned())]
    pub host: String,
    /// TCP port the HTTP server listens on.
    #[ortho_config(default = DEFAULT_PORT)]
    pub port: u16,
    /// PostgreSQL connection URL. The in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Idle database connections kept warm.
    pub pool_min_idle: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub pool_timeout_secs: Option<u64>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            database_url: None,
            pool_max_size: None,
            pool_min_idle: None,
            pool_timeout_secs: None,
        }
    }
}

impl ServiceSettings {
    /// Address pair accepted by `HttpServer::bind`.
    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    /// Build the connection pool configuration, or `None` when no database URL
    /// is set.
    ///
    /// # Examples
    /// ```
    /// use apid::settings::ServiceSettings;
    ///
    /// let settings = ServiceSettings {
    ///     database_url: Some("postgres://apid@localhost/apid".into()),
    ///     pool_max_size: Some(4),
    ///     ..ServiceSettings::default()
    /// };
    /// let pool = settings.pool_config().expect("database configured");
    /// assert_eq!(pool.max_size(), 4);
    /// assert!(ServiceSettings::default().pool_config().is_none());
    /// ```
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url.as_deref()?;
        let timeout = self
            .pool_timeout_secs
            .map_or(PoolConfig::DEFAULT_CONNECTION_TIMEOUT, Duration::from_secs);
        Some(
            PoolConfig::new(url)
                .with_max_size(self.pool_max_size.unwrap_or(PoolConfig::DEFAULT_MAX_SIZE))
                .with_min_idle(Some(
                    self.pool_min_idle.unwrap_or(PoolConfig::DEFAULT_MIN_IDLE),
                ))
                .with_connection_timeout(timeout),
        )
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for service configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "APID_HOST",
        "APID_PORT",
        "APID_DATABASE_URL",
        "APID_POOL_MAX_SIZE",
        "APID_POOL_MIN_IDLE",
        "APID_POOL_TIMEOUT_SECS",
    ];

    fn load_from_empty_args() -> ServiceSettings {
        ServiceSettings::load_from_iter([OsString::from("apid")]).expect("config should load")
    }

    fn cleared() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None)).collect()
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(cleared());

        let settings = load_from_empty_args();
        assert_eq!(settings.host, DEFAULT_HOST);
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.bind_addr(), (DEFAULT_HOST.to_owned(), DEFAULT_PORT));
        assert!(settings.database_url.is_none());
        assert!(settings.pool_config().is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("APID_HOST", Some("127.0.0.1".to_owned())),
            ("APID_PORT", Some("3000".to_owned())),
            (
                "APID_DATABASE_URL",
                Some("postgres://apid@db/apid".to_owned()),
            ),
            ("APID_POOL_MAX_SIZE", None),
            ("APID_POOL_MIN_IDLE", None),
            ("APID_POOL_TIMEOUT_SECS", None),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), ("127.0.0.1".to_owned(), 3000));
        let pool = settings.pool_config().expect("database configured");
        assert_eq!(pool.database_url(), "postgres://apid@db/apid");
        assert_eq!(pool.max_size(), PoolConfig::DEFAULT_MAX_SIZE);
        assert_eq!(pool.min_idle(), Some(PoolConfig::DEFAULT_MIN_IDLE));
        assert_eq!(
            pool.connection_timeout(),
            PoolConfig::DEFAULT_CONNECTION_TIMEOUT
        );
    }

    #[rstest]
    fn pool_limits_follow_settings() {
        let settings = ServiceSettings {
            database_url: Some("postgres://localhost/apid".to_owned()),
            pool_max_size: Some(3),
            pool_min_idle: Some(0),
            pool_timeout_secs: Some(5),
            ..ServiceSettings::default()
        };

        let pool = settings.pool_config().expect("database configured");
        assert_eq!(pool.max_size(), 3);
        assert_eq!(pool.min_idle(), Some(0));
        assert_eq!(pool.connection_timeout(), Duration::from_secs(5));
    }
}
