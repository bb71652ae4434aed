mod error;
mod router;
mod telemetry;

use std::{net::SocketAddr, sync::Arc};

use tracing::info;

use employee_facade_core::EmployeeService;
use employee_facade_upstream::UpstreamClient;
use employee_facade_util::{load_env_file, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_env_file();
    let config = AppConfig::from_env()?;

    telemetry::init_tracing(&config)?;
    let metrics = telemetry::init_metrics()?;

    let http = reqwest::Client::builder().build()?;
    let upstream = UpstreamClient::new(config.employee_client_base_uri.clone(), http);
    let state = router::AppState::new(metrics, EmployeeService::new(Arc::new(upstream)));

    let addr: SocketAddr = config.bind_addr;
    info!(
        stage = "app",
        %addr,
        env = %config.environment.as_str(),
        upstream = %config.employee_client_base_uri,
        "starting HTTP server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router::app_router(state))
        .await
        .map_err(|err| err.into())
}
