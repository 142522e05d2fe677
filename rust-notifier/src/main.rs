//! Freqtrade Notifier Web Server.
//!
//! Receives Freqtrade webhooks, formats them into alert emails and sends them
//! through AWS SES. One request, one email; nothing is queued or stored.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use notifier::mail::credentials;
use notifier::{router, AppState, Config, SesMailer};

#[tokio::main]
async fn main() -> Result<()> {
    // Optional .env file
    dotenvy::dotenv().ok();

    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        aws_region = %config.aws_region,
        email_sender = %config.email_sender,
        email_recipient = %config.email_recipient,
        auth_enabled = config.secret().is_some(),
        aws_credentials_static = config.aws_credentials.is_some(),
        ses_endpoint = %config.ses_base_url(),
        "config_loaded"
    );

    if config.secret().is_none() {
        warn!(
            api_key_set = config.api_key.is_some(),
            "auth_disabled_open_mode"
        );
    }

    let mut mailer = SesMailer::from_config(&config)?;
    if config.aws_credentials.is_none() {
        info!(aws_region = %config.aws_region, "aws_credentials_default_chain");
        let chain = credentials::default_chain(&config.aws_region).await;
        mailer = mailer.with_credentials_provider(chain);
    }
    let state = AppState::new(config.clone(), Arc::new(mailer));
    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
