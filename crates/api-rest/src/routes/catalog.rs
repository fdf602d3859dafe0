//! Plain CRUD resources: drugs, hospitals, lecturers and patients.

use super::{rows, Reply};
use crate::body::Incoming;
use crate::error::{ApiError, ApiResult};
use crate::store::TableSpec;
use crate::tables::{DRUGS, HOSPITALS, LECTURERS, PATIENTS};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{get, MethodRouter};
use axum::Router;
use clinic_core::constants::{DRUGS_PATH, HOSPITALS_PATH, LECTURERS_PATH, PATIENTS_PATH};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Clone, Copy)]
enum UpdateVerb {
    /// Full body, required fields checked.
    Put,
    /// Any subset of fields.
    Patch,
}

fn crud(
    router: Router<AppState>,
    base: &str,
    spec: &'static TableSpec,
    verb: UpdateVerb,
) -> Router<AppState> {
    let item: MethodRouter<AppState> = get(
        move |State(state): State<AppState>, Path(id): Path<i64>| get_one(state, spec, id),
    )
    .delete(move |State(state): State<AppState>, Path(id): Path<i64>| delete(state, spec, id));
    let on_update = move |State(state): State<AppState>, Path(id): Path<i64>, body: Incoming| {
        update(state, spec, id, body, matches!(verb, UpdateVerb::Patch))
    };
    let item = match verb {
        UpdateVerb::Put => item.put(on_update),
        UpdateVerb::Patch => item.patch(on_update),
    };

    router
        .route(
            base,
            get(
                move |State(state): State<AppState>,
                      Query(params): Query<HashMap<String, String>>| {
                    list(state, spec, params)
                },
            )
            .post(move |State(state): State<AppState>, body: Incoming| create(state, spec, body)),
        )
        .route(&format!("{base}/:id"), item)
}

pub fn router() -> Router<AppState> {
    let router = Router::new().route(
        &format!("{PATIENTS_PATH}/user/:user_id"),
        get(patient_by_user),
    );
    let router = crud(router, DRUGS_PATH, &DRUGS, UpdateVerb::Put);
    let router = crud(router, HOSPITALS_PATH, &HOSPITALS, UpdateVerb::Put);
    let router = crud(router, LECTURERS_PATH, &LECTURERS, UpdateVerb::Patch);
    crud(router, PATIENTS_PATH, &PATIENTS, UpdateVerb::Put)
}

async fn list(
    state: AppState,
    spec: &'static TableSpec,
    params: HashMap<String, String>,
) -> ApiResult<Reply> {
    let found = state.store.list(spec, |row| spec.matches(row, &params)).await;
    Ok(Reply::ok(
        format!("{} records: {}", spec.label, found.len()),
        rows(found),
    ))
}

async fn get_one(state: AppState, spec: &'static TableSpec, id: i64) -> ApiResult<Reply> {
    let row = state.store.get(spec, id).await?;
    Ok(Reply::ok(format!("{} found", spec.label), row))
}

async fn create(state: AppState, spec: &'static TableSpec, body: Incoming) -> ApiResult<Reply> {
    let mut row = spec.coerce(&body, false)?;
    spec.attach_uploads(&body, &mut row)?;
    let row = state.store.insert(spec, row).await;
    tracing::info!(table = spec.table, "created row");
    Ok(Reply::created(format!("{} created", spec.label), row))
}

async fn update(
    state: AppState,
    spec: &'static TableSpec,
    id: i64,
    body: Incoming,
    partial: bool,
) -> ApiResult<Reply> {
    state.store.get(spec, id).await?;
    let mut changes = spec.coerce(&body, partial)?;
    spec.attach_uploads(&body, &mut changes)?;
    let row = state.store.update(spec, id, changes).await?;
    Ok(Reply::ok(format!("{} updated", spec.label), row))
}

async fn delete(state: AppState, spec: &'static TableSpec, id: i64) -> ApiResult<Reply> {
    state.store.delete(spec, id).await?;
    tracing::info!(table = spec.table, id, "deleted row");
    Ok(Reply::ok(format!("{} deleted", spec.label), Value::Null))
}

#[axum::debug_handler]
async fn patient_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Reply> {
    let row = state
        .store
        .find(&PATIENTS, |row| super::row_id(row, "user_id") == Some(user_id))
        .await
        .ok_or_else(|| ApiError::not_found(format!("Patient for user {user_id} not found")))?;
    Ok(Reply::ok("Patient found", row))
}
