//! Device-side agent: accepts feedback commands from the node and drives the
//! local signal output.
use std::sync::Arc;

use actix_web::{web::Data, App, HttpServer};
use anyhow::Context;
use attendance_node::{
    api::handlers,
    core::actuator::{LoggingActuator, SignalActuator},
    utils::config::AgentConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_rt::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = AgentConfig::new().context("Failed to load agent configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let actuator: Arc<dyn SignalActuator> = Arc::new(LoggingActuator::new());
    let actuator = Data::from(actuator);

    info!("Feedback agent listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(actuator.clone())
            .app_data(actix_web::web::JsonConfig::default().error_handler(handlers::json_error))
            .configure(handlers::feedback::configure)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?
    .run()
    .await
    .context("Feedback agent server failed")?;

    info!("Feedback agent stopped");
    Ok(())
}
