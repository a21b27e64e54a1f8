use std::env;

use tracing::info;
use tracing_subscriber::EnvFilter;

use veil_server::config::VeilConfig;
use veil_server::routes;
use veil_server::state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let in_lambda = env::var("AWS_LAMBDA_RUNTIME_API").is_ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if in_lambda {
        // Structured JSON logging for CloudWatch
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }

    let config = VeilConfig::from_env()?;
    let bind_addr = config.bind_addr;
    let state = AppState::from_config(config).await?;
    let app = routes::router(state);

    if in_lambda {
        return lambda_http::run(app).await.map_err(|e| eyre::eyre!(e));
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(addr = %bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
