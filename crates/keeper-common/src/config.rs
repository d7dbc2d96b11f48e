//! Application configuration (spec §6).
//!
//! Precedence: command-line flag > environment variable > compiled default.
//! Env vars use the `KEEPER_` prefix with `__` as the nesting separator
//! (e.g. `KEEPER_WS__ADDRESS`), following the teacher's `config`/`dotenvy`
//! layering.

use serde::Deserialize;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Get the global application configuration.
///
/// # Panics
/// Panics if config has not been initialized via [`init`].
pub fn get() -> &'static AppConfig {
    CONFIG
        .get()
        .expect("config not initialized; call keeper_common::config::init() first")
}

/// Initialize the global configuration from flags, env, and compiled defaults.
pub fn init() -> Result<&'static AppConfig, config::ConfigError> {
    let _ = dotenvy::dotenv();

    let flag_overrides = parse_cli_flags();

    let mut builder = config::Config::builder()
        .set_default("query_timeout_secs", 2)?
        .set_default("ws.address", "0.0.0.0:8081")?
        .set_default("grpc.port", 8080)?
        .set_default("token_ttl_secs", 3600)?
        .add_source(config::File::with_name("config").required(false))
        .add_source(
            config::Environment::with_prefix("KEEPER")
                .separator("__")
                .try_parsing(true),
        );

    for (key, value) in flag_overrides {
        builder = builder.set_override(key, value)?;
    }

    let app_config: AppConfig = builder.build()?.try_deserialize()?;
    Ok(CONFIG.get_or_init(|| app_config))
}

/// Parse `--key value` pairs from argv; unrecognized args are ignored so
/// this can coexist with other CLI parsing in the binary.
fn parse_cli_flags() -> Vec<(String, String)> {
    let args: Vec<String> = std::env::args().collect();
    let mut overrides = Vec::new();
    let mut i = 1;
    while i < args.len() {
        if let Some(key) = args[i].strip_prefix("--") {
            if let Some(value) = args.get(i + 1) {
                overrides.push((key.to_string(), value.clone()));
                i += 1;
            }
        }
        i += 1;
    }
    overrides
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub query_timeout_secs: u64,
    pub ws: WsConfig,
    pub grpc: GrpcConfig,
    pub cert_file: String,
    pub key_file: String,
    /// Passphrase for envelope crypto (§4.5).
    pub key: String,
    pub token_ttl_secs: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WsConfig {
    /// Listen address for the sync endpoint.
    pub address: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GrpcConfig {
    /// Listen port for the auth service.
    pub port: u16,
}
