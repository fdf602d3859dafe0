//! Table descriptions for every resource the backend stores.

use crate::store::{FieldKind, FieldSpec, TableSpec};
use clinic_core::models::{
    AppointmentStatus, AppointmentType, DrugCategory, Gender, OrderStatus, RecordStatus, WireEnum,
};

fn is_wire<E: WireEnum>(value: &str) -> bool {
    E::from_wire(value).is_some()
}

const ID: FieldKind = FieldKind::Integer { min: 1 };

pub static DRUGS: TableSpec = TableSpec {
    table: "drugs",
    id_field: "drug_id",
    label: "Drug",
    fields: &[
        FieldSpec::new("name", FieldKind::Text).required(),
        FieldSpec::new("description", FieldKind::Text),
        FieldSpec::new("price", FieldKind::Number { min: 0.0, max: f64::MAX }).required(),
        FieldSpec::new("stock_quantity", FieldKind::Integer { min: 0 }).default_int(0),
        FieldSpec::new("unit", FieldKind::Text).required(),
        FieldSpec::new("manufacturer", FieldKind::Text),
        FieldSpec::new("category", FieldKind::Enum(is_wire::<DrugCategory>)).required(),
    ],
    uploads: &[("image", "image_url")],
    search_fields: &["name", "description", "manufacturer"],
    date_field: None,
};

pub static HOSPITALS: TableSpec = TableSpec {
    table: "hospitals",
    id_field: "hospital_id",
    label: "Hospital",
    fields: &[
        FieldSpec::new("name", FieldKind::Text).required(),
        FieldSpec::new("address", FieldKind::Text).required(),
        FieldSpec::new("phone", FieldKind::Text),
        FieldSpec::new("email", FieldKind::Email),
        FieldSpec::new("latitude", FieldKind::Number { min: -90.0, max: 90.0 }).required(),
        FieldSpec::new("longitude", FieldKind::Number { min: -180.0, max: 180.0 }).required(),
        FieldSpec::new("description", FieldKind::Text),
    ],
    uploads: &[("logo", "logo_url")],
    search_fields: &["name", "address"],
    date_field: None,
};

pub static LECTURERS: TableSpec = TableSpec {
    table: "lecturers",
    id_field: "lecturer_id",
    label: "Lecturer",
    fields: &[
        FieldSpec::new("full_name", FieldKind::Text).required(),
        FieldSpec::new("email", FieldKind::Email).required(),
        FieldSpec::new("phone", FieldKind::Text),
        FieldSpec::new("specialization", FieldKind::Text).required(),
        FieldSpec::new("academic_title", FieldKind::Text),
        FieldSpec::new("bio", FieldKind::Text),
    ],
    uploads: &[("avatar", "avatar_url")],
    search_fields: &["full_name", "email", "specialization"],
    date_field: None,
};

pub static PATIENTS: TableSpec = TableSpec {
    table: "patients",
    id_field: "patient_id",
    label: "Patient",
    fields: &[
        FieldSpec::new("user_id", ID).required(),
        FieldSpec::new("full_name", FieldKind::Text).required(),
        FieldSpec::new("date_of_birth", FieldKind::Date),
        FieldSpec::new("gender", FieldKind::Enum(is_wire::<Gender>)).required(),
        FieldSpec::new("phone", FieldKind::Text),
        FieldSpec::new("address", FieldKind::Text),
    ],
    uploads: &[("avatar", "avatar_url")],
    search_fields: &["full_name", "phone"],
    date_field: None,
};

/// Appointments are never created directly through the API; only follow-ups are. Patient, doctor
/// and hospital of a follow-up are copied from its parent.
pub static APPOINTMENTS: TableSpec = TableSpec {
    table: "appointments",
    id_field: "appointment_id",
    label: "Appointment",
    fields: &[
        FieldSpec::new("patient_id", ID),
        FieldSpec::new("doctor_id", ID),
        FieldSpec::new("hospital_id", ID),
        FieldSpec::new("scheduled_at", FieldKind::Timestamp).required(),
        FieldSpec::new("appointment_type", FieldKind::Enum(is_wire::<AppointmentType>)).required(),
        FieldSpec::new("status", FieldKind::Enum(is_wire::<AppointmentStatus>)),
        FieldSpec::new("reason", FieldKind::Text),
        FieldSpec::new("notes", FieldKind::Text),
        FieldSpec::new("meeting_url", FieldKind::Text),
    ],
    uploads: &[],
    search_fields: &["reason", "notes"],
    date_field: Some("scheduled_at"),
};

pub static MEDICAL_RECORDS: TableSpec = TableSpec {
    table: "medical_records",
    id_field: "record_id",
    label: "Medical record",
    fields: &[
        FieldSpec::new("patient_id", ID).required(),
        FieldSpec::new("doctor_id", ID).required(),
        FieldSpec::new("appointment_id", ID),
        FieldSpec::new("diagnosis", FieldKind::Text),
        FieldSpec::new("symptoms", FieldKind::Text),
        FieldSpec::new("treatment", FieldKind::Text),
        FieldSpec::new("notes", FieldKind::Text),
        FieldSpec::new("prescription", FieldKind::List),
        FieldSpec::new("status", FieldKind::Enum(is_wire::<RecordStatus>)),
    ],
    uploads: &[],
    search_fields: &["diagnosis", "symptoms"],
    date_field: None,
};

pub static ORDERS: TableSpec = TableSpec {
    table: "orders",
    id_field: "order_id",
    label: "Order",
    fields: &[FieldSpec::new("status", FieldKind::Enum(is_wire::<OrderStatus>)).required()],
    uploads: &[],
    search_fields: &[],
    date_field: None,
};
