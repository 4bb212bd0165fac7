//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use mockable::Env;
use resqlink::inbound::http::cookie_config::{
    BuildMode, ConfigError, CookieSettings, cookie_settings_from_env,
};

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

pub(crate) const BIND_ADDR_ENV: &str = "RESQLINK_BIND_ADDR";
pub(crate) const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub(crate) const PUBLIC_BASE_URL_ENV: &str = "RESQLINK_PUBLIC_BASE_URL";
pub(crate) const UPLOAD_DIR_ENV: &str = "RESQLINK_UPLOAD_DIR";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Startup configuration failures.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ServerConfigError {
    #[error(transparent)]
    Cookie(#[from] ConfigError),
    #[error("invalid value for {name}='{value}'; expected host:port")]
    InvalidBindAddr { name: &'static str, value: String },
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) cookies: CookieSettings,
    pub(crate) public_base_url: String,
    pub(crate) upload_dir: PathBuf,
    pub(crate) database_url: Option<String>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Read every setting from `env`, applying defaults for optional values.
    pub fn from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Self, ServerConfigError> {
        let cookies = cookie_settings_from_env(env, mode)?;
        let bind_addr = non_blank(env, BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .map_err(|_| ServerConfigError::InvalidBindAddr {
                name: BIND_ADDR_ENV,
                value: bind_addr.clone(),
            })?;
        let public_base_url = non_blank(env, PUBLIC_BASE_URL_ENV)
            .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.into())
            .trim_end_matches('/')
            .to_owned();
        let upload_dir = non_blank(env, UPLOAD_DIR_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR), PathBuf::from);

        Ok(Self {
            bind_addr,
            cookies,
            public_base_url,
            upload_dir,
            database_url: non_blank(env, DATABASE_URL_ENV),
            #[cfg(feature = "metrics")]
            prometheus: None,
        })
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

fn non_blank<E: Env>(env: &E, name: &str) -> Option<String> {
    env.string(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use actix_web::cookie::SameSite;
    use mockable::MockEnv;
    use rstest::rstest;

    use super::*;

    fn env_with(vars: &[(&'static str, &'static str)]) -> MockEnv {
        let vars: HashMap<&'static str, &'static str> = vars.iter().copied().collect();
        let mut env = MockEnv::new();
        env.expect_string()
            .returning(move |name| vars.get(name).map(|value| (*value).to_owned()));
        env
    }

    #[rstest]
    fn defaults_apply_in_debug_builds() {
        let config =
            ServerConfig::from_env(&env_with(&[]), BuildMode::Debug).expect("debug defaults");

        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.public_base_url, "http://localhost:8080");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert!(config.database_url.is_none());
        assert!(config.cookies.secure);
        assert_eq!(config.cookies.same_site, SameSite::Lax);
    }

    #[rstest]
    fn explicit_values_are_used() {
        let env = env_with(&[
            (BIND_ADDR_ENV, "127.0.0.1:9000"),
            (PUBLIC_BASE_URL_ENV, "https://resq.example/"),
            (UPLOAD_DIR_ENV, "/var/lib/resqlink/photos"),
            (DATABASE_URL_ENV, "postgres://localhost/resqlink"),
            ("SESSION_COOKIE_SECURE", "1"),
            ("SESSION_SAMESITE", "Strict"),
        ]);
        let config = ServerConfig::from_env(&env, BuildMode::Release).expect("valid config");

        assert_eq!(config.bind_addr().port(), 9000);
        assert_eq!(config.public_base_url, "https://resq.example");
        assert_eq!(config.upload_dir, PathBuf::from("/var/lib/resqlink/photos"));
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/resqlink")
        );
        assert_eq!(config.cookies.same_site, SameSite::Strict);
    }

    #[rstest]
    fn blank_database_url_counts_as_unset() {
        let config = ServerConfig::from_env(&env_with(&[(DATABASE_URL_ENV, "  ")]), BuildMode::Debug)
            .expect("debug defaults");
        assert!(config.database_url.is_none());
    }

    #[rstest]
    fn malformed_bind_addr_is_rejected() {
        let env = env_with(&[(BIND_ADDR_ENV, "not-an-address")]);
        let Err(err) = ServerConfig::from_env(&env, BuildMode::Debug) else {
            panic!("expected an invalid bind address");
        };
        assert_eq!(
            err,
            ServerConfigError::InvalidBindAddr {
                name: BIND_ADDR_ENV,
                value: "not-an-address".to_owned(),
            }
        );
    }

    #[rstest]
    fn release_builds_require_cookie_settings() {
        let Err(err) = ServerConfig::from_env(&env_with(&[]), BuildMode::Release) else {
            panic!("expected missing cookie settings");
        };
        assert!(matches!(err, ServerConfigError::Cookie(ConfigError::MissingEnv { .. })));
    }
}
