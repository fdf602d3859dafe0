use super::{row_id, rows, status_body, Reply};
use crate::body::Incoming;
use crate::error::ApiResult;
use crate::tables::ORDERS;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::Router;
use clinic_core::constants::ORDERS_PATH;
use serde_json::Value;
use std::collections::HashMap;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(ORDERS_PATH, get(list))
        .route(&format!("{ORDERS_PATH}/patient/:id"), get(by_patient))
        .route(&format!("{ORDERS_PATH}/:id"), get(get_one).delete(delete))
        .route(&format!("{ORDERS_PATH}/:id/status"), put(update_status))
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let found = state
        .store
        .list(&ORDERS, |row| ORDERS.matches(row, &params))
        .await;
    Reply::ok(format!("Orders: {}", found.len()), rows(found))
}

async fn by_patient(State(state): State<AppState>, Path(id): Path<i64>) -> Reply {
    let found = state
        .store
        .list(&ORDERS, |row| row_id(row, "patient_id") == Some(id))
        .await;
    Reply::ok(format!("Orders: {}", found.len()), rows(found))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Reply> {
    Ok(Reply::ok("Order found", state.store.get(&ORDERS, id).await?))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Incoming,
) -> ApiResult<Reply> {
    state.store.get(&ORDERS, id).await?;
    let change = status_body(&ORDERS, &body)?;
    let row = state.store.update(&ORDERS, id, change).await?;
    Ok(Reply::ok("Order status updated", row))
}

async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Reply> {
    state.store.delete(&ORDERS, id).await?;
    Ok(Reply::ok("Order deleted", Value::Null))
}
