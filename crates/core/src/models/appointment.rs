use crate::payload::{ListFilters, Payload, QueryParams};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

wire_enum! {
    /// Lifecycle state of an appointment.
    pub enum AppointmentStatus {
        Pending => "PENDING",
        Confirmed => "CONFIRMED",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

wire_enum! {
    /// Whether the patient attends in person or over video.
    pub enum AppointmentType {
        Offline => "OFFLINE",
        Online => "ONLINE",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    #[serde(default)]
    pub hospital_id: Option<i64>,
    pub scheduled_at: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub meeting_url: Option<String>,
    #[serde(default)]
    pub parent_appointment_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppointmentFilters {
    pub status: Option<AppointmentStatus>,
    pub appointment_type: Option<AppointmentType>,
    pub doctor_id: Option<i64>,
    pub patient_id: Option<i64>,
    pub date: Option<NaiveDate>,
}

impl ListFilters for AppointmentFilters {
    fn query_params(&self) -> QueryParams {
        QueryParams::new()
            .push("status", self.status)
            .push("appointment_type", self.appointment_type)
            .push("doctor_id", self.doctor_id)
            .push("patient_id", self.patient_id)
            .push("date", self.date)
    }
}

/// Books a follow-up visit for an existing appointment.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FollowUpBody {
    /// The appointment being followed up.
    pub appointment_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

impl Payload for FollowUpBody {}
