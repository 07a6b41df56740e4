use kaspi_core::observability::init_tracing;
use kaspi_gateway::{config::GatewayConfig, Application};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env()?;

    init_tracing(
        "kaspi-gateway",
        &config.server.log_level,
        config.server.otlp_endpoint.as_deref(),
    )?;

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
