use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prlint::auth::{InMemoryTokenCache, JwtRefresher, RsaJwtSigner};
use prlint::config::Settings;
use prlint::github::OctocrabInterpreter;
use prlint::server::{AppState, build_router};
use prlint::telemetry::reporter_for;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prlint=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::parse();
    let urls = settings.host_urls();

    let pem = settings.private_key_pem()?;
    let signer = RsaJwtSigner::from_pem(settings.app_id.clone(), &pem)
        .context("loading GitHub App private key")?;

    let shutdown = CancellationToken::new();
    let jwt = JwtRefresher::start(signer, settings.jwt_refresh_period()?, shutdown.clone())
        .context("signing initial App JWT")?;

    let state = AppState::new(
        OctocrabInterpreter::new(urls.api_url.clone()),
        urls,
        Arc::new(InMemoryTokenCache::new()),
        jwt,
        reporter_for(settings.disable_raven_log),
        settings.token_expiry_skew()?,
    );
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("serving HTTP")?;

    Ok(())
}

/// Resolves on Ctrl-C and stops the JWT refresher.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
    shutdown.cancel();
}
