//! Medical records: drafts opened from an appointment, and full records with attachments.

use super::{row_id, rows, Reply};
use crate::body::Incoming;
use crate::error::{ApiError, ApiResult};
use crate::store::{check_upload_size, upload_url, Row};
use crate::tables::{APPOINTMENTS, MEDICAL_RECORDS};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::Router;
use clinic_core::constants::{FULL_RECORDS_PATH, MEDICAL_RECORDS_PATH};
use clinic_core::models::{AppointmentStatus, RecordFileType, RecordStatus, WireEnum};
use serde_json::{json, Value};
use std::collections::HashMap;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(MEDICAL_RECORDS_PATH, get(list))
        .route(&format!("{MEDICAL_RECORDS_PATH}/init"), post(init))
        .route(&format!("{MEDICAL_RECORDS_PATH}/check"), get(check))
        .route(
            &format!("{MEDICAL_RECORDS_PATH}/:id"),
            get(get_one).delete(delete),
        )
        .route(FULL_RECORDS_PATH, post(create_full))
        .route(&format!("{FULL_RECORDS_PATH}/:id"), put(complete_full))
        .route(&format!("{FULL_RECORDS_PATH}/patient/:id"), get(patient_history))
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let found = state
        .store
        .list(&MEDICAL_RECORDS, |row| MEDICAL_RECORDS.matches(row, &params))
        .await;
    Reply::ok(format!("Medical records: {}", found.len()), rows(found))
}

async fn get_one(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Reply> {
    let row = state.store.get(&MEDICAL_RECORDS, id).await?;
    Ok(Reply::ok("Medical record found", row))
}

async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Reply> {
    state.store.delete(&MEDICAL_RECORDS, id).await?;
    Ok(Reply::ok("Medical record deleted", Value::Null))
}

async fn record_for(state: &AppState, appointment_id: i64) -> Option<Row> {
    state
        .store
        .find(&MEDICAL_RECORDS, |row| {
            row_id(row, "appointment_id") == Some(appointment_id)
        })
        .await
}

/// `GET /check?appointment_id=N`
async fn check(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Reply> {
    let appointment_id: i64 = params
        .get("appointment_id")
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| ApiError::bad_request("`appointment_id` query parameter is required"))?;
    let record_id = record_for(&state, appointment_id)
        .await
        .and_then(|row| row_id(&row, "record_id"));
    Ok(Reply::ok(
        "Record check",
        json!({ "exists": record_id.is_some(), "record_id": record_id }),
    ))
}

/// Fails with 409 when the appointment already has a record and with 404 when it does not exist.
async fn ensure_open_appointment(state: &AppState, appointment_id: i64) -> ApiResult<()> {
    state.store.get(&APPOINTMENTS, appointment_id).await?;
    if record_for(state, appointment_id).await.is_some() {
        return Err(ApiError::conflict(format!(
            "Appointment {appointment_id} already has a medical record"
        )));
    }
    Ok(())
}

#[axum::debug_handler]
async fn init(State(state): State<AppState>, body: Incoming) -> ApiResult<Reply> {
    for name in body.fields.keys() {
        if !matches!(name.as_str(), "appointment_id" | "patient_id" | "doctor_id") {
            return Err(ApiError::bad_request(format!("unknown field `{name}`")));
        }
    }
    let mut row = MEDICAL_RECORDS.coerce(&body, false)?;
    let appointment_id = row_id(&row, "appointment_id")
        .ok_or_else(|| ApiError::bad_request("`appointment_id` is required"))?;
    ensure_open_appointment(&state, appointment_id).await?;

    row.insert("status".into(), RecordStatus::Draft.as_wire().into());
    row.insert("prescription".into(), json!([]));
    row.insert("attachments".into(), json!([]));
    let row = state.store.insert(&MEDICAL_RECORDS, row).await;
    tracing::info!(appointment_id, "draft record opened");
    Ok(Reply::created("Medical record initialised", row))
}

/// Pair each uploaded `files` part with its entry in the comma-separated `file_types` field.
fn tagged_attachments(body: &mut Incoming) -> ApiResult<Vec<Value>> {
    let types = body.fields.remove("file_types");
    let files: Vec<_> = body.uploads_named("files").collect();
    if let Some(other) = body.uploads.iter().find(|u| u.field != "files") {
        return Err(ApiError::bad_request(format!(
            "unexpected file field `{}`",
            other.field
        )));
    }

    let types: Vec<&str> = match &types {
        Some(Value::String(s)) if !s.trim().is_empty() => s.split(',').map(str::trim).collect(),
        _ => Vec::new(),
    };
    if types.len() != files.len() {
        return Err(ApiError::bad_request(format!(
            "`file_types` lists {} types for {} files",
            types.len(),
            files.len()
        )));
    }

    files
        .into_iter()
        .zip(types)
        .map(|(file, tag)| -> ApiResult<Value> {
            check_upload_size(file)?;
            let file_type = RecordFileType::from_wire(tag).ok_or_else(|| {
                ApiError::bad_request(format!(
                    "`{tag}` is not one of: {}",
                    RecordFileType::expected()
                ))
            })?;
            Ok(json!({
                "file_url": upload_url(MEDICAL_RECORDS.table, &file.file_name, &file.bytes),
                "file_type": file_type.as_wire(),
            }))
        })
        .collect()
}

/// Validate a full record body. Returns the row fields and the new attachments.
fn full_record(mut body: Incoming) -> ApiResult<(Row, Vec<Value>)> {
    let attachments = tagged_attachments(&mut body)?;
    if body.fields.contains_key("status") {
        return Err(ApiError::bad_request("unknown field `status`"));
    }
    let mut row = MEDICAL_RECORDS.coerce(&body, false)?;
    if !row.contains_key("diagnosis") {
        return Err(ApiError::bad_request("`diagnosis` is required"));
    }
    row.entry("prescription").or_insert_with(|| json!([]));
    row.insert("status".into(), RecordStatus::Completed.as_wire().into());
    Ok((row, attachments))
}

async fn complete_appointment(state: &AppState, row: &Row) -> ApiResult<()> {
    if let Some(appointment_id) = row_id(row, "appointment_id") {
        let mut change = Row::new();
        change.insert(
            "status".into(),
            AppointmentStatus::Completed.as_wire().into(),
        );
        state
            .store
            .update(&APPOINTMENTS, appointment_id, change)
            .await?;
    }
    Ok(())
}

#[axum::debug_handler]
async fn create_full(State(state): State<AppState>, body: Incoming) -> ApiResult<Reply> {
    let (mut row, attachments) = full_record(body)?;
    if let Some(appointment_id) = row_id(&row, "appointment_id") {
        ensure_open_appointment(&state, appointment_id).await?;
    }
    row.insert("attachments".into(), Value::Array(attachments));

    complete_appointment(&state, &row).await?;
    let row = state.store.insert(&MEDICAL_RECORDS, row).await;
    tracing::info!(record_id = ?row.get("record_id"), "full record created");
    Ok(Reply::created("Medical record created", row))
}

/// Complete an existing record. New attachments are appended to the ones already stored.
#[axum::debug_handler]
async fn complete_full(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Incoming,
) -> ApiResult<Reply> {
    let existing = state.store.get(&MEDICAL_RECORDS, id).await?;
    let (mut changes, attachments) = full_record(body)?;

    let mut all = existing
        .get("attachments")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    all.extend(attachments);
    changes.insert("attachments".into(), Value::Array(all));

    complete_appointment(&state, &changes).await?;
    let row = state.store.update(&MEDICAL_RECORDS, id, changes).await?;
    tracing::info!(record_id = id, "record completed");
    Ok(Reply::ok("Medical record completed", row))
}

/// Every record of a patient, newest first.
async fn patient_history(State(state): State<AppState>, Path(id): Path<i64>) -> Reply {
    let mut found = state
        .store
        .list(&MEDICAL_RECORDS, |row| row_id(row, "patient_id") == Some(id))
        .await;
    found.reverse();
    Reply::ok(format!("Medical records: {}", found.len()), rows(found))
}
