//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It builds the mapping store and starts the HTTP server with all routes.

use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Compress, web};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::analytics::{AccessLog, MemorySink};
use crate::api::services::{AppStartTime, LinkSettings};
use crate::config::StaticConfig;
use crate::storage::MappingStore;

/// Components shared by every worker
pub struct ServerComponents {
    pub store: Arc<MappingStore>,
    pub memory_log: Option<Arc<MemorySink>>,
    pub settings: LinkSettings,
}

/// Build the access log and mapping store from configuration
pub fn prepare_server_startup(config: &StaticConfig) -> Result<ServerComponents> {
    let (access_log, memory_log) = AccessLog::from_config(&config.access_log)
        .context("Failed to initialize access log")?;

    let store = Arc::new(MappingStore::from_config(
        &config.store,
        Arc::new(access_log),
    ));
    info!(
        "Mapping store ready (code length {}, default validity {} min)",
        config.store.code_length, config.store.default_validity_minutes
    );

    Ok(ServerComponents {
        store,
        memory_log,
        settings: LinkSettings::new(config.server.base_url.clone()),
    })
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: Arc<StaticConfig>) -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let components = prepare_server_startup(&config)?;
    let store = components.store.clone();
    let memory_log = components.memory_log.clone();
    let settings = components.settings.clone();

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);
    info!("Short links will be rendered as {}/<code>", settings.base_url);

    let server = HttpServer::new(move || {
        let mut app = App::new()
            .wrap(Compress::default())
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(settings.clone()))
            .app_data(web::Data::new(app_start_time.clone()));
        if let Some(ref memory) = memory_log {
            app = app.app_data(web::Data::new(memory.clone()));
        }
        app.configure(crate::api::configure)
    })
    .workers(cpu_count)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    let result = server.await;

    // 服务停止后刷完访问日志
    components.store.shutdown();
    info!("Server stopped");

    result.context("HTTP server error")
}
