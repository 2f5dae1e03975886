mod app;
mod auth;
mod config;
mod error;
mod routes;
mod storage;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use auth::identity::{DisabledVerifier, HttpIdentityVerifier, IdentityVerifier};
use config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flashqudo_server=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("data directory: {}", config.data_dir.display());

    let db = storage::init_db(&config.data_dir)?;
    tracing::info!("database initialized");

    let verifier: Arc<dyn IdentityVerifier> = match &config.identity {
        Some(identity) => {
            tracing::info!("identity verification via {}", identity.verify_url);
            if identity.tls_skip_verify {
                tracing::warn!("IDENTITY_TLS_SKIP_VERIFY is set, certificates are not checked");
            }
            Arc::new(HttpIdentityVerifier::new(identity)?)
        }
        None => {
            tracing::warn!("IDENTITY_VERIFY_URL not set, only cached tokens will authenticate");
            Arc::new(DisabledVerifier)
        }
    };

    let app = app::router(app::AppState::new(db, verifier));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
