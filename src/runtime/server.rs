//! Server mode
//!
//! This module contains the HTTP server startup logic.

use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Compress, web};
use anyhow::Result;
use tracing::{info, warn};

use crate::api::configure_routes;
use crate::api::middleware::cors_headers;
use crate::config::AppConfig;
use crate::services::AppState;
use crate::storage::KvStore;

/// 命令请求体上限
const MAX_PAYLOAD_BYTES: usize = 4 * 1024 * 1024;

/// 组装所有 worker 共享的状态
pub fn build_state(config: Arc<AppConfig>, store: Arc<dyn KvStore>) -> web::Data<AppState> {
    web::Data::new(AppState::new(config, store))
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: Arc<AppConfig>, store: Arc<dyn KvStore>) -> Result<()> {
    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    info!(
        "System type: {}, storage backend: {}",
        config.features.system_type.as_str(),
        store.backend_name()
    );
    if !config.features.cors {
        info!("CORS headers disabled");
    }

    let state = build_state(Arc::clone(&config), store);
    let cors_enabled = config.features.cors;

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_headers(cors_enabled))
            .wrap(Compress::default())
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(MAX_PAYLOAD_BYTES))
            .configure(configure_routes)
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count)
    .bind(bind_address)?
    .run()
    .await?;

    warn!("Server stopped");
    Ok(())
}
