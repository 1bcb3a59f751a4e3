//! HTTP routes of the development remote store.
//!
//! # Endpoints
//!
//! - `GET /health`: Health check (no auth required)
//! - `GET /rest/v1/{table}?select=*&order=<col>.<asc|desc>&limit=<n>`
//! - `POST /rest/v1/{table}`: insert a row or an array of rows
//! - `PATCH /rest/v1/{table}?<col>=eq.<value>`: merge a patch into matches
//! - `DELETE /rest/v1/{table}?<col>=eq.<value>`

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use meditrack_core::Record;
use serde::Serialize;
use serde_json::Value;
use tower_http::trace::TraceLayer;

use super::storage::{is_known_table, RecordStore, RecordStoreError};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    /// Key every request must present. `None` rejects all requests.
    pub api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: RecordStore, api_key: Option<String>) -> Self {
        Self {
            store: Arc::new(store),
            api_key: api_key.map(Arc::from),
        }
    }
}

/// Error body in the shape the REST client reads.
#[derive(Debug, Serialize)]
struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<RecordStoreError> for ApiError {
    fn from(e: RecordStoreError) -> Self {
        match e {
            RecordStoreError::Duplicate(_) => Self::new(StatusCode::CONFLICT, "23505", e.to_string()),
            RecordStoreError::InvalidColumn(_) | RecordStoreError::InvalidRecord(_) => {
                Self::bad_request(e.to_string())
            }
            RecordStoreError::Database(_) | RecordStoreError::Migrate(_) => {
                tracing::error!("Storage failure: {}", e);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal storage error",
                )
            }
        }
    }
}

/// Pulls the key from the `apikey` header or a bearer token.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = headers.get("apikey").and_then(|h| h.to_str().ok()) {
        return Some(key);
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Authentication middleware
async fn auth_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(key) = presented_key(request.headers()) else {
        return ApiError::new(
            StatusCode::UNAUTHORIZED,
            "missing_auth",
            "apikey header or Bearer token required",
        )
        .into_response();
    };

    match &state.api_key {
        Some(expected) if expected.as_ref() == key => next.run(request).await,
        _ => ApiError::new(StatusCode::UNAUTHORIZED, "invalid_key", "Invalid API key")
            .into_response(),
    }
}

fn check_table(table: &str) -> Result<(), ApiError> {
    if is_known_table(table) {
        Ok(())
    } else {
        Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("Unknown table '{}'", table),
        ))
    }
}

/// Parses `col.asc` / `col.desc` (direction defaults to ascending).
fn parse_order(param: &str) -> Result<(&str, bool), ApiError> {
    let (column, direction) = param.split_once('.').unwrap_or((param, "asc"));
    let ascending = match direction {
        "asc" => true,
        "desc" => false,
        other => {
            return Err(ApiError::bad_request(format!(
                "Invalid order direction '{}'",
                other
            )))
        }
    };
    Ok((column, ascending))
}

/// Finds the single `<col>=eq.<value>` filter among the query parameters.
fn parse_filter(params: &HashMap<String, String>) -> Result<(&str, &str), ApiError> {
    let mut filters = params
        .iter()
        .filter(|(name, _)| !matches!(name.as_str(), "select" | "order" | "limit"));

    let (column, value) = match (filters.next(), filters.next()) {
        (Some(filter), None) => filter,
        _ => {
            return Err(ApiError::bad_request(
                "Exactly one <column>=eq.<value> filter is required",
            ))
        }
    };

    let value = value
        .strip_prefix("eq.")
        .ok_or_else(|| ApiError::bad_request(format!("Unsupported filter on '{}'", column)))?;
    Ok((column.as_str(), value))
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint (no auth required)
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn select_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Record>>, ApiError> {
    check_table(&table)?;

    let order = params.get("order").map(|o| parse_order(o)).transpose()?;
    let limit = params
        .get("limit")
        .map(|l| {
            l.parse::<i64>()
                .ok()
                .filter(|n| *n >= 0)
                .ok_or_else(|| ApiError::bad_request(format!("Invalid limit '{}'", l)))
        })
        .transpose()?;

    let rows = state.store.select(&table, order, limit).await?;
    Ok(Json(rows))
}

async fn insert_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Vec<Record>>), ApiError> {
    check_table(&table)?;

    let rows = match body {
        Value::Object(row) => vec![row],
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                _ => Err(ApiError::bad_request("Every row must be a JSON object")),
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(ApiError::bad_request("Body must be a row or an array of rows")),
    };

    let inserted = state.store.insert(&table, rows).await?;
    tracing::debug!("Inserted {} row(s) into {}", inserted.len(), table);
    Ok((StatusCode::CREATED, Json(inserted)))
}

async fn update_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    Json(patch): Json<Record>,
) -> Result<Json<Vec<Record>>, ApiError> {
    check_table(&table)?;
    let (column, value) = parse_filter(&params)?;

    let updated = state.store.update(&table, patch, column, value).await?;
    Ok(Json(updated))
}

async fn delete_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<StatusCode, ApiError> {
    check_table(&table)?;
    let (column, value) = parse_filter(&params)?;

    let removed = state.store.delete(&table, column, value).await?;
    tracing::debug!("Deleted {} row(s) from {}", removed, table);
    Ok(StatusCode::NO_CONTENT)
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    // Public routes (no auth)
    let public_routes = Router::new().route("/health", get(health));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/rest/v1/{table}",
            get(select_rows)
                .post(insert_rows)
                .patch(update_rows)
                .delete(delete_rows),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
