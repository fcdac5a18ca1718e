use service_core::observability::{init_tracing, shutdown_tracing};
use subsidy_chatbot::config::ChatbotConfig;
use subsidy_chatbot::startup::Application;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing("subsidy-chatbot", "info", otlp_endpoint.as_deref());

    let config = ChatbotConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    tracing::info!(
        documents_dir = %config.documents.dir.display(),
        model = %config.models.text_model,
        llm_configured = config.llm_configured(),
        "Starting subsidy-chatbot"
    );

    let app = Application::build(config).await?;
    let result = app.run_until_stopped().await;

    shutdown_tracing();
    result?;

    Ok(())
}
