//! Appointment views, status changes and follow-up booking.

use super::{row_id, rows, status_body, Reply};
use crate::body::Incoming;
use crate::error::{ApiError, ApiResult};
use crate::store::Row;
use crate::tables::APPOINTMENTS;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::Router;
use chrono::Utc;
use clinic_core::constants::APPOINTMENTS_PATH;
use clinic_core::models::{AppointmentStatus, AppointmentType, WireEnum};
use serde_json::Value;
use std::collections::HashMap;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(APPOINTMENTS_PATH, get(list))
        .route(&format!("{APPOINTMENTS_PATH}/today"), get(today))
        .route(&format!("{APPOINTMENTS_PATH}/online"), get(online))
        .route(&format!("{APPOINTMENTS_PATH}/follow-up"), post(follow_up))
        .route(&format!("{APPOINTMENTS_PATH}/patient/:id"), get(by_patient))
        .route(&format!("{APPOINTMENTS_PATH}/doctor/:id"), get(by_doctor))
        .route(
            &format!("{APPOINTMENTS_PATH}/:id"),
            get(get_one).delete(delete),
        )
        .route(&format!("{APPOINTMENTS_PATH}/:id/status"), put(update_status))
}

async fn matching(state: &AppState, keep: impl Fn(&Row) -> bool) -> Reply {
    let found = state.store.list(&APPOINTMENTS, keep).await;
    Reply::ok(format!("Appointments: {}", found.len()), rows(found))
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    matching(&state, |row| APPOINTMENTS.matches(row, &params)).await
}

/// Appointments scheduled on the current UTC date.
async fn today(State(state): State<AppState>) -> Reply {
    let today = Utc::now().format("%Y-%m-%d").to_string();
    matching(&state, |row| {
        row.get("scheduled_at")
            .and_then(Value::as_str)
            .is_some_and(|at| at.starts_with(&today))
    })
    .await
}

async fn online(State(state): State<AppState>) -> Reply {
    let online = AppointmentType::Online.as_wire();
    matching(&state, |row| {
        row.get("appointment_type").and_then(Value::as_str) == Some(online)
    })
    .await
}

async fn by_patient(State(state): State<AppState>, Path(id): Path<i64>) -> Reply {
    matching(&state, |row| row_id(row, "patient_id") == Some(id)).await
}

async fn by_doctor(State(state): State<AppState>, Path(id): Path<i64>) -> Reply {
    matching(&state, |row| row_id(row, "doctor_id") == Some(id)).await
}

async fn get_one(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Reply> {
    let row = state.store.get(&APPOINTMENTS, id).await?;
    Ok(Reply::ok("Appointment found", row))
}

async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Reply> {
    state.store.delete(&APPOINTMENTS, id).await?;
    Ok(Reply::ok("Appointment deleted", Value::Null))
}

#[axum::debug_handler]
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Incoming,
) -> ApiResult<Reply> {
    state.store.get(&APPOINTMENTS, id).await?;
    let change = status_body(&APPOINTMENTS, &body)?;
    let row = state.store.update(&APPOINTMENTS, id, change).await?;
    tracing::info!(id, status = ?row.get("status"), "appointment status changed");
    Ok(Reply::ok("Appointment status updated", row))
}

/// Book a follow-up. Patient, doctor and hospital come from the parent appointment; the new one
/// starts out pending.
#[axum::debug_handler]
async fn follow_up(State(state): State<AppState>, mut body: Incoming) -> ApiResult<Reply> {
    let parent_id = match body.fields.remove("appointment_id") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|id| *id > 0)
    .ok_or_else(|| ApiError::bad_request("`appointment_id` is required"))?;

    for copied in ["patient_id", "doctor_id", "hospital_id", "status"] {
        if body.fields.contains_key(copied) {
            return Err(ApiError::bad_request(format!("unknown field `{copied}`")));
        }
    }
    let mut row = APPOINTMENTS.coerce(&body, false)?;

    let parent = state.store.get(&APPOINTMENTS, parent_id).await?;
    for copied in ["patient_id", "doctor_id", "hospital_id"] {
        if let Some(value) = parent.get(copied) {
            row.insert(copied.to_owned(), value.clone());
        }
    }
    row.insert(
        "status".to_owned(),
        Value::String(AppointmentStatus::Pending.as_wire().to_owned()),
    );
    row.insert("parent_appointment_id".to_owned(), Value::from(parent_id));

    let row = state.store.insert(&APPOINTMENTS, row).await;
    tracing::info!(parent_id, "follow-up booked");
    Ok(Reply::created("Follow-up appointment created", row))
}
