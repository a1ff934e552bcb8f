// ABOUTME: HTTP service framing for the pipeline: POST /extract returns a result or a JSON error.
// ABOUTME: Pipeline errors map to 400, faults in the worker task map to 500.

use std::net::SocketAddr;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::client::Client;
use crate::error::ExtractError;
use crate::result::{ExtractionRequest, ExtractionResult};

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Failure of a single service request.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed body or any pipeline error.
    BadRequest(String),
    /// Anything outside the pipeline's own error taxonomy.
    Internal(anyhow::Error),
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(err) => {
                error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an unexpected error occurred".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Build the service router around `client`.
pub fn router(client: Client) -> Router {
    Router::new()
        .route("/extract", post(extract_handler))
        .route("/scrape", post(extract_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(CorsLayer::permissive())
        .with_state(client)
}

async fn extract_handler(
    State(client): State<Client>,
    payload: Result<Json<ExtractionRequest>, JsonRejection>,
) -> Result<Json<ExtractionResult>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    // Panics in the pipeline surface here as a JoinError.
    let handle = tokio::spawn(async move { client.extract(&request).await });
    match handle.await {
        Ok(Ok(result)) => Ok(Json(result)),
        Ok(Err(err)) => Err(err.into()),
        Err(join_err) => Err(ApiError::Internal(anyhow::anyhow!(
            "extraction task failed: {}",
            join_err
        ))),
    }
}

/// Serve on an already-bound listener until the process receives Ctrl-C.
pub async fn serve_listener(listener: TcpListener, client: Client) -> anyhow::Result<()> {
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(client))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

/// Bind `addr` and serve.
pub async fn serve(addr: SocketAddr, client: Client) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_listener(listener, client).await
}
