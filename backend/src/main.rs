//! Backend entry-point: reads configuration, wires adapters and serves the
//! REST API, photo uploads, probes and (in debug builds) OpenAPI docs.

mod server;

use actix_web::web;
use mockable::{DefaultEnv, Env};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use resqlink::inbound::http::cookie_config::BuildMode;
use resqlink::inbound::http::health::HealthState;
use server::{ServerConfig, create_server};

fn load_config<E: Env>(env: &E, mode: BuildMode) -> std::io::Result<ServerConfig> {
    ServerConfig::from_env(env, mode).map_err(std::io::Error::other)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = load_config(&DefaultEnv::new(), BuildMode::from_debug_assertions())?;

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(server::build_prometheus()?));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).await?;
    server.await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_environment_yields_a_debug_config() {
        let config = load_config(&DefaultEnv::new(), BuildMode::Debug)
            .expect("debug builds tolerate an unconfigured environment");
        assert!(!config.public_base_url.ends_with('/'));
        assert!(config.database_url.as_deref().is_none_or(|url| !url.trim().is_empty()));
    }
}
