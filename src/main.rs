//! Wiring & DI. Entry point: bootstrap adapters, inject into the request adapter, serve one event.
//! No business logic here; the pipeline lives in RequestAdapter.

use dotenv::dotenv;
use inference_relay::adapters::inference::HttpEndpointAdapter;
use inference_relay::adapters::persistence::SqliteLogStore;
use inference_relay::adapters::runtime::StdioRuntime;
use inference_relay::domain::InvocationContext;
use inference_relay::ports::{InferencePort, InvocationPort, LogStorePort};
use inference_relay::shared::config::AppConfig;
use inference_relay::usecases::RequestAdapter;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    // stdout carries the response; logs go to stderr.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found"),
    }

    let cfg = AppConfig::load()?;
    let Some(endpoint_name) = cfg.endpoint_name().map(str::to_string) else {
        anyhow::bail!("Set SAGEMAKER_ENDPOINT (or RELAY_ENDPOINT_NAME) to the inference endpoint name");
    };
    let Some(log_table) = cfg.log_table().map(str::to_string) else {
        anyhow::bail!("Set LOG_TABLE (or RELAY_LOG_TABLE) to the invocation log table name");
    };

    // --- Inference endpoint (one client per process) ---
    let runtime_url = cfg.runtime_url_or_default();
    let timeout = cfg.invoke_timeout();
    info!(
        endpoint = %endpoint_name,
        url = %runtime_url,
        timeout_secs = timeout.map(|t| t.as_secs()),
        "inference endpoint configured"
    );
    let mut endpoint = HttpEndpointAdapter::new(runtime_url, endpoint_name, timeout)?;
    if let Some(key) = cfg.api_key() {
        endpoint = endpoint.with_api_key(key);
    }
    let inference: Arc<dyn InferencePort> = Arc::new(endpoint);

    // --- Log store ---
    let log_store: Arc<dyn LogStorePort> =
        Arc::new(SqliteLogStore::connect(cfg.data_dir_or_default(), &log_table).await?);

    // --- Handler + runtime ---
    let handler: Arc<dyn InvocationPort> = Arc::new(RequestAdapter::new(inference, log_store));
    let runtime = StdioRuntime::new(handler);

    let ctx = cfg
        .request_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .map(InvocationContext::new)
        .unwrap_or_else(InvocationContext::generate);

    // A failed log write surfaces here as a non-zero exit.
    let response = runtime.run_once(&ctx).await?;
    info!(
        request_id = %ctx.request_id,
        status_code = response.status_code,
        "invocation complete"
    );

    Ok(())
}
