//! Live preview over HTTP: the interactive page, the visual model as JSON,
//! the person directory and an export trigger.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{LineageError, Result};
use crate::pipeline::{Pipeline, RenderOutcome};
use crate::visual::escape_html;

/// Check if a port is available by attempting to bind to it
async fn check_port_available(port: u16) -> bool {
    tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .is_ok()
}

/// HTTP preview server around a shared pipeline
pub struct PreviewServer {
    pipeline: Arc<Pipeline>,
}

impl PreviewServer {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Run the HTTP server until it is shut down
    pub async fn run(&self, port: u16) -> Result<()> {
        let app = self.create_router();

        let addr = format!("127.0.0.1:{}", port);
        if !check_port_available(port).await {
            return Err(LineageError::Config(format!(
                "Port {} is already in use. Stop the other process or set server.port in {}",
                port,
                crate::config::DEFAULT_CONFIG_FILE
            )));
        }

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| LineageError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

        log::info!("Preview server listening on http://{}", addr);
        log::info!("Data directory: {}", self.pipeline.config().data_dir().display());

        axum::serve(listener, app)
            .await
            .map_err(|e| LineageError::Server(format!("HTTP server error: {}", e)))?;

        Ok(())
    }

    /// Create the axum router
    pub fn create_router(&self) -> Router {
        create_router(Arc::clone(&self.pipeline))
    }
}

fn create_router(pipeline: Arc<Pipeline>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_page))
        .route("/api/graph", get(handle_graph))
        .route("/api/persons", get(handle_persons))
        .route("/api/keywords", get(handle_keywords))
        .route("/export", post(handle_export))
        .route("/health", get(handle_health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(pipeline)
}

/// Run a synchronous pipeline call off the async workers
async fn blocking<T, F>(pipeline: Arc<Pipeline>, f: F) -> std::result::Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(&Pipeline) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&pipeline))
        .await
        .map_err(|e| {
            log::error!("Render task failed: {}", e);
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "render task failed".to_string())
        })
}

fn error_json(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Status code for an outcome that produced nothing to render
fn not_ready_status(outcome: &RenderOutcome) -> StatusCode {
    match outcome {
        RenderOutcome::NoRelations => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn guidance_page(message: &str) -> String {
    format!(
        "<!doctype html><html lang=\"zh-CN\"><head><meta charset=\"utf-8\" /><title>五老精神 动态系谱图</title></head>\
         <body style=\"font-family:'Microsoft YaHei',Arial,sans-serif;padding:24px\"><p>{}</p></body></html>",
        escape_html(message)
    )
}

/// GET / : the interactive page
async fn handle_page(State(pipeline): State<Arc<Pipeline>>) -> Response {
    let outcome = match blocking(pipeline, |p| p.render()).await {
        Ok(outcome) => outcome,
        Err(response) => return response,
    };

    let message = outcome.message();
    match outcome {
        RenderOutcome::Ready(rendered) => match rendered.html() {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                log::error!("Failed to render page: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, Html(guidance_page(&e.to_string()))).into_response()
            }
        },
        other => (
            not_ready_status(&other),
            Html(guidance_page(&message.unwrap_or_default())),
        )
            .into_response(),
    }
}

/// GET /api/graph : the visual model as JSON
async fn handle_graph(State(pipeline): State<Arc<Pipeline>>) -> Response {
    let outcome = match blocking(pipeline, |p| p.render()).await {
        Ok(outcome) => outcome,
        Err(response) => return response,
    };

    let message = outcome.message();
    match outcome {
        RenderOutcome::Ready(rendered) => Json(rendered.model).into_response(),
        other => error_json(not_ready_status(&other), message.unwrap_or_default()),
    }
}

/// GET /api/persons : person directory cards
async fn handle_persons(State(pipeline): State<Arc<Pipeline>>) -> Response {
    match blocking(pipeline, |p| p.directory()).await {
        Ok(directory) => Json(directory).into_response(),
        Err(response) => response,
    }
}

/// GET /api/keywords : spirit keywords with their explanations
async fn handle_keywords(State(pipeline): State<Arc<Pipeline>>) -> Response {
    Json(pipeline.config().spirit.keywords.clone()).into_response()
}

/// POST /export : write the artifact to the configured export path
async fn handle_export(State(pipeline): State<Arc<Pipeline>>) -> Response {
    let result = match blocking(pipeline, |p| p.export(None)).await {
        Ok(result) => result,
        Err(response) => return response,
    };

    match result {
        Ok(report) => Json(report).into_response(),
        Err(e @ LineageError::DataNotReady(_)) => error_json(StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
        Err(e @ LineageError::NoRelations) => error_json(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        Err(e) => {
            log::error!("Export failed: {}", e);
            error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /health
async fn handle_health() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "lineage-graph",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
        .into_response()
}
