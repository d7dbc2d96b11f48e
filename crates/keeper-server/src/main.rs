//! # keeper-server
//!
//! Orchestrates the two listeners this system exposes: the auth service
//! (register/login, HTTP) and the sync server (the websocket upgrade).
//! Both are TLS-terminated from the same certificate/key pair (spec §6).

use anyhow::Context;
use axum_server::tls_rustls::RustlsConfig;
use keeper_common::crypto::EnvelopeKey;
use keeper_db::Database;
use keeper_sync::SyncState;
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = keeper_common::config::init()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keeper=info,tower_http=info".into()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    tracing::info!("starting keeper v{}", env!("CARGO_PKG_VERSION"));

    let db = Database::connect(config).await.context("connect to database")?;
    db.migrate().await.context("run migrations")?;

    let tls = RustlsConfig::from_pem_file(&config.cert_file, &config.key_file)
        .await
        .context("load TLS material")?;

    let envelope_key = EnvelopeKey::from_passphrase(&config.key);

    let auth_state = keeper_auth::AppState { db: db.clone() };
    let auth_router = keeper_auth::build_router(auth_state);
    let auth_addr = SocketAddr::from(([0, 0, 0, 0], config.grpc.port));

    let sync_state = SyncState::new(db, envelope_key);
    let sync_router = keeper_sync::build_router(sync_state);
    let sync_addr: SocketAddr = config.ws.address.parse().context("parse ws.address")?;

    tracing::info!("auth service listening on https://{auth_addr}");
    tracing::info!("sync server listening on wss://{sync_addr}");

    tokio::try_join!(
        async {
            axum_server::bind_rustls(auth_addr, tls.clone())
                .serve(auth_router.into_make_service())
                .await
                .context("auth server")
        },
        async {
            axum_server::bind_rustls(sync_addr, tls)
                .serve(sync_router.into_make_service())
                .await
                .context("sync server")
        },
    )?;

    Ok(())
}
