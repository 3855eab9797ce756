//! HTTP surface
//!
//! Thin request-routing layer over [`RequestService`]: one endpoint,
//! `GET /api/v1/export?raw=&path=`, returning either the serialized
//! export sequence or a binary media payload. Failures map to the
//! structured `{errored, note}` shape.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{RequestError, ServerError};
use crate::service::Resolved;
use crate::state::AppState;

/// Query parameters of the export endpoint
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// Return the serialized export sequence even for media objects
    #[serde(default)]
    pub raw: bool,
    /// Logical asset path
    pub path: String,
}

/// Handle `GET /api/v1/export`
pub async fn handle_export(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> Response {
    match state.service().resolve(&query.path, query.raw).await {
        Ok(Resolved::Json(body)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json".to_string())],
            body,
        )
            .into_response(),
        Ok(Resolved::Binary { content_type, data }) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], data).into_response()
        }
        Err(error) => error.into_response(),
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::PackageNotFound(_) => StatusCode::NOT_FOUND,
            Self::Decode { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Archive(_) | Self::Serialization(_) => StatusCode::CONFLICT,
        };

        let body = match &self {
            Self::Decode { note, json_output } => json!({
                "errored": true,
                "note": note,
                "jsonOutput": json_output,
            }),
            other => json!({
                "errored": true,
                "note": other.note(),
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Create the HTTP router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/export", axum::routing::get(handle_export))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns `ServerError` if the listener fails to bind or the server
/// encounters a runtime error.
pub async fn start_server(bind_addr: SocketAddr, state: Arc<AppState>) -> Result<(), ServerError> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|source| ServerError::BindFailed {
            addr: bind_addr,
            source,
        })?;

    tracing::info!("HTTP server listening on {}", bind_addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Shutdown(format!("HTTP server error: {e}")))?;

    Ok(())
}
