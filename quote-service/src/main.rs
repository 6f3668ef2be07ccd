use quote_service::{LogFormat, ServiceConfig, create_app};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing in the format chosen by `LOG_FORMAT`
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quote_service=debug,quote_flow=debug,tower_http=debug".into());

    match format {
        LogFormat::Pretty => {
            // Human-readable logging for development
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        LogFormat::Json => {
            // Structured JSON logging for production
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env()?;
    init_tracing(config.log_format);

    let app = create_app(&config)?;
    let listener = TcpListener::bind(config.bind_address()).await?;
    let addr = listener.local_addr()?;

    info!(
        cors_origins = ?config.cors_origins,
        reference_year = ?config.reference_year,
        "Quote service running on http://{}",
        addr
    );
    info!("Quote endpoint: POST http://{}/api/quotes/{{auto|residencial}}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
