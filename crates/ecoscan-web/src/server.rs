//! Server assembly: state construction, CORS, router, listener

use crate::routes::{
    auth_routes, chat_routes, health_routes, history_routes, profile_routes, scan_routes,
    task_routes,
};
use crate::services::scan::{spawn_workers, ScanContext};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use ecoscan_config::EcoscanConfig;
use ecoscan_llm::AnalysisProvider;
use ecoscan_ocr::OcrClient;
use ecoscan_store::{SqlitePool, Stores};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

const SCAN_QUEUE_CAPACITY: usize = 64;

/// Build the full application router for the given state
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.web.cors_origin);
    let uploads = ServeDir::new(&state.config.web.upload_dir);
    let max_body = state.config.web.max_upload_bytes;

    Router::new()
        .merge(auth_routes())
        .merge(profile_routes())
        .merge(scan_routes())
        .merge(task_routes())
        .merge(history_routes())
        .merge(chat_routes())
        .with_state(state)
        .merge(health_routes())
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(cors)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);
    match origin.parse::<HeaderValue>() {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(_) => tracing::warn!(origin, "Invalid CORS origin, allowing none"),
    }
    cors
}

/// Construct the shared state and start the background scan workers
pub fn init_state(
    config: EcoscanConfig,
    llm: Arc<dyn AnalysisProvider>,
) -> crate::Result<AppState> {
    let pool = SqlitePool::new(config.storage.clone())?;
    let stores = Stores::new(pool);
    let config = Arc::new(config);

    let (scan_queue, queue_rx) = flume::bounded(SCAN_QUEUE_CAPACITY);
    spawn_workers(
        config.web.scan_workers,
        queue_rx,
        ScanContext {
            stores: stores.clone(),
            ocr: OcrClient::new(&config.ocr),
            llm: llm.clone(),
            upload_dir: config.web.upload_dir.clone(),
        },
    );

    Ok(AppState {
        stores,
        llm,
        scan_queue,
        config,
    })
}

/// Bind and serve the web backend
pub async fn start_server(
    config: EcoscanConfig,
    llm: Arc<dyn AnalysisProvider>,
) -> crate::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port)
        .parse()
        .map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid address: {}", e),
            )
        })?;

    std::fs::create_dir_all(&config.web.upload_dir)?;
    let state = init_state(config, llm)?;

    tracing::info!("Starting web server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
