use crate::attachment::TaggedAttachment;
use crate::payload::{FieldTreatment, FileField, ListFilters, Payload, QueryParams};
use chrono::{DateTime, Utc};
use clinic_types::NonEmptyText;
use serde::{Deserialize, Serialize};

wire_enum! {
    pub enum RecordStatus {
        Draft => "DRAFT",
        Completed => "COMPLETED",
    }
}

wire_enum! {
    /// Category tag sent alongside each uploaded record file.
    pub enum RecordFileType {
        Fundus => "FUNDUS",
        Oct => "OCT",
        LabReport => "LAB_REPORT",
        Other => "OTHER",
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionItem {
    pub drug_id: i64,
    pub dosage: String,
    pub frequency: String,
    pub duration_days: u32,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAttachment {
    pub file_url: String,
    pub file_type: RecordFileType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub record_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    #[serde(default)]
    pub appointment_id: Option<i64>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub treatment: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: RecordStatus,
    #[serde(default)]
    pub prescription: Vec<PrescriptionItem>,
    #[serde(default)]
    pub attachments: Vec<RecordAttachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MedicalRecordFilters {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub status: Option<RecordStatus>,
}

impl ListFilters for MedicalRecordFilters {
    fn query_params(&self) -> QueryParams {
        QueryParams::new()
            .push("patient_id", self.patient_id)
            .push("doctor_id", self.doctor_id)
            .push("status", self.status)
    }
}

/// Opens an empty record for an appointment (`POST /init`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordInitBody {
    pub appointment_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
}

impl Payload for RecordInitBody {}

/// Answer of `GET /check`: whether an appointment already has a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCheck {
    pub exists: bool,
    #[serde(default)]
    pub record_id: Option<i64>,
}

/// Full record creation/completion body.
///
/// With attachments this is sent as multipart: files repeat under `files`, their categories go
/// comma-joined into `file_types`, and `prescription` travels as a JSON string.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FullRecordBody {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_id: Option<i64>,
    pub diagnosis: NonEmptyText,
    pub symptoms: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub prescription: Vec<PrescriptionItem>,
    #[serde(skip)]
    pub files: Vec<TaggedAttachment>,
}

impl Payload for FullRecordBody {
    fn treatment(field: &str) -> FieldTreatment {
        match field {
            "prescription" => FieldTreatment::Json,
            _ => FieldTreatment::Plain,
        }
    }

    fn file_fields(&self) -> Vec<FileField<'_>> {
        vec![FileField::tagged("files", "file_types", &self.files)]
    }
}
