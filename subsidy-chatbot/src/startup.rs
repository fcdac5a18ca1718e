//! Application startup and lifecycle management.
//!
//! Everything a request needs (documents, prompt context, provider) is built
//! once in [`Application::build`] and shared read-only through [`AppState`].

use crate::config::ChatbotConfig;
use crate::handlers::{
    app::{health_check, index, not_found},
    chat::chat,
    metrics::metrics,
};
use crate::services::metrics::init_metrics;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::TextProvider;
use crate::services::{ChatService, PromptBuilder, SubsidyDocuments};
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ChatbotConfig>,
    pub chat: ChatService,
}

impl AppState {
    /// Assemble state from already-loaded documents and an optional provider.
    pub fn new(
        config: ChatbotConfig,
        documents: &SubsidyDocuments,
        provider: Option<Arc<dyn TextProvider>>,
    ) -> Self {
        let prompt_builder = Arc::new(PromptBuilder::new(documents));
        let chat = ChatService::new(prompt_builder, provider, config.models.prompt_warn_bytes);

        Self {
            config: Arc::new(config),
            chat,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        // Whole documents plus the message go out untruncated, so the inbound
        // message is not size-capped either.
        .route("/chat", post(chat).layer(DefaultBodyLimit::disable()))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .fallback(not_found)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Create the Gemini provider when a key is configured.
fn build_provider(config: &ChatbotConfig) -> Result<Option<Arc<dyn TextProvider>>, AppError> {
    let Some(api_key) = config.google.api_key.clone() else {
        tracing::warn!("No API key configured; LLM generation disabled");
        return Ok(None);
    };

    let provider: Arc<dyn TextProvider> = Arc::new(GeminiTextProvider::new(GeminiConfig {
        api_key,
        model: config.models.text_model.clone(),
        api_base: config.google.api_base.clone(),
    })
    .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))?);

    tracing::info!(
        model = %config.models.text_model,
        "Initialized Gemini text provider"
    );

    Ok(Some(provider))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Load documents, set up the provider and bind the listener.
    pub async fn build(config: ChatbotConfig) -> Result<Self, AppError> {
        init_metrics();

        let documents = SubsidyDocuments::load(&config.documents);
        let provider = build_provider(&config)?;

        let address = config.common.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let router = build_router(AppState::new(config, &documents, provider));

        tracing::info!("Subsidy chatbot listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
