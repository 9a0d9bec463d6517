//! # API Handlers
//!
//! Axum handlers for the table endpoints. Every request is independent: the
//! query string is decoded, the table's rows are fetched and the `lg-core`
//! pipeline runs over them. Nothing is kept between requests.

use crate::sources::SourceError;
use crate::tables::{TableInfo, DEFAULT_TABLE};
use crate::AppState;
use axum::{
    extract::{Path, RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use lg_core::{params, superjson, time};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/leads", get(leads))
        .route("/api/tables", get(list_tables))
        .route("/api/tables/:id", get(table_leads))
        .route("/api/status", get(status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Table '{0}' not found")]
    UnknownTable(String),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ApiError::UnknownTable(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Source(_) | ApiError::Encode(_) => {
                tracing::error!("Error fetching data: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch table data".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

// =============================================================================
// Tables
// =============================================================================

pub async fn leads(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    serve_table(&state, DEFAULT_TABLE, query.as_deref().unwrap_or_default()).await
}

pub async fn table_leads(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    serve_table(&state, &id, query.as_deref().unwrap_or_default()).await
}

async fn serve_table(state: &AppState, id: &str, query: &str) -> Result<Response, ApiError> {
    let source = state
        .tables
        .get(id)
        .ok_or_else(|| ApiError::UnknownTable(id.to_string()))?;

    let server = &state.config.server;
    let now = time::now_millis();
    let mut search = params::decode_with_page_size(query, now, server.default_page_size);
    search.size = search.size.min(server.max_page_size.max(1));

    let rows = source.fetch().await?;
    let response = lg_core::execute(rows, &search, now);
    tracing::debug!(
        table = id,
        total = response.meta.total_row_count,
        filtered = response.meta.filter_row_count,
        page = response.data.len(),
        "Served page"
    );

    let body = superjson::to_string(&response)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

pub async fn list_tables(State(state): State<Arc<AppState>>) -> Json<Vec<TableInfo>> {
    Json(state.tables.list())
}

// =============================================================================
// Status
// =============================================================================

#[derive(Serialize)]
pub struct SystemStatus {
    version: &'static str,
    uptime_seconds: u64,
    tables: usize,
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        tables: state.tables.len(),
    })
}
