mod config;
mod error;
mod server;

use rmcp::{ServiceExt, transport::stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sheba_common::assistant::Assistant;
use sheba_common::catalog::seed_providers;

use config::Config;
use server::ShebaAssistantServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting sheba-assistant MCP server");

    let config = Config::from_env()?;
    info!(
        thinking_delay_ms = config.thinking_delay.as_millis(),
        top_n = config.top_n,
        conversation_ttl_secs = config.conversation_ttl.as_secs(),
        pipeline_config = config.pipeline_config_path.as_deref().unwrap_or("<built-in>"),
        "config loaded"
    );

    let pipeline = config.pipeline()?;
    let catalog = seed_providers();
    info!(providers = catalog.len(), "provider catalog loaded");

    let assistant = Assistant::new(pipeline, catalog, config.top_n)?;
    let server = ShebaAssistantServer::new(assistant, config.thinking_delay, config.conversation_ttl);

    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}
