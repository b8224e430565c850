mod api;
mod middleware;

use std::sync::Arc;

use fakebuster_engine::{Classifier, FeatureExtractor, LexiconSentiment};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::{AuthState, RateLimitState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = fakebuster_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let extractor = if config.sentiment_enabled {
        FeatureExtractor::with_sentiment(Arc::new(LexiconSentiment))
    } else {
        FeatureExtractor::new()
    };
    let classifier = Arc::new(Classifier::load(&config.model_path, extractor));

    let auth = AuthState::new(config.api_keys.clone(), config.env.is_development())?;
    let rate_limit = RateLimitState::per_minute(config.rate_limit_per_minute);
    let state = AppState {
        classifier,
        max_batch_size: config.max_batch_size,
    };
    let app = build_app(state, auth, rate_limit);

    tracing::info!(
        bind_addr = %config.bind_addr,
        env = %config.env,
        "fakebuster server listening"
    );
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
