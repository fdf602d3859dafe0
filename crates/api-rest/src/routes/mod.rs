//! HTTP routes, one module per resource family.
//!
//! Paths are built from the base paths in [`clinic_core::constants`] so the clients and this
//! backend cannot drift apart.

mod appointments;
mod catalog;
mod orders;
mod predict;
mod records;

use crate::body::Incoming;
use crate::error::{ApiError, ApiResult};
use crate::store::{Row, TableSpec};
use crate::AppState;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clinic_core::ApiResponse;
use serde_json::{json, Value};

/// A successful response, wrapped in the `{status, message, data}` envelope.
#[derive(Debug)]
pub struct Reply {
    status: StatusCode,
    message: String,
    data: Value,
}

impl Reply {
    pub fn ok(message: impl Into<String>, data: impl Into<Value>) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            data: data.into(),
        }
    }

    pub fn created(message: impl Into<String>, data: impl Into<Value>) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(message, data)
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let body = ApiResponse::new(self.status.as_u16(), self.message, self.data);
        (self.status, Json(body)).into_response()
    }
}

pub(crate) fn rows(rows: Vec<Row>) -> Value {
    Value::Array(rows.into_iter().map(Value::Object).collect())
}

pub(crate) fn row_id(row: &Row, field: &str) -> Option<i64> {
    row.get(field).and_then(Value::as_i64)
}

/// Parse a `{status}` body against the `status` field of `spec`.
pub(crate) fn status_body(spec: &TableSpec, incoming: &Incoming) -> ApiResult<Row> {
    if let Some(extra) = incoming.fields.keys().find(|k| *k != "status") {
        return Err(ApiError::bad_request(format!("unknown field `{extra}`")));
    }
    let row = spec.coerce(incoming, true)?;
    if !row.contains_key("status") {
        return Err(ApiError::bad_request("`status` is required"));
    }
    Ok(row)
}

#[axum::debug_handler]
async fn health() -> Reply {
    Reply::ok("Clinic development API is alive", json!({ "ok": true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(catalog::router())
        .merge(appointments::router())
        .merge(records::router())
        .merge(orders::router())
        .merge(predict::router())
}
