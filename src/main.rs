use agent_studio::config::SiteConfig;
use agent_studio::server::{AppState, site_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("Warning: a rustls crypto provider was already installed");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = SiteConfig::from_env()?;

    eprintln!("🤖 Agent Studio v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", config.api.base_url);
    eprintln!("   Chat backend: {}", config.chatbot_backend_url);
    match &config.email {
        Some(email) => eprintln!(
            "   Contact relay: {}:{} -> {}",
            email.smtp_host, email.smtp_port, email.to_address
        ),
        None => eprintln!("   Contact relay: disabled (EMAIL_USER not set)"),
    }
    if config.api.google_client_id.is_none() {
        eprintln!("   Google sign-in: NEXT_PUBLIC_GOOGLE_CLIENT_ID not set");
    }

    let app = site_routes(AppState::from_config(&config));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Site server started");
    eprintln!("   Listening on http://0.0.0.0:{}\n", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
