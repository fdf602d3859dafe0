//! Per-resource keys and adapters.
//!
//! Keys follow one layout per resource:
//! - `[kind]` prefixes everything of that resource
//! - `[kind, "list", {filters}]` for filtered lists
//! - `[kind, "detail", #id]` for single resources
//! - `[kind, <view>, #id]` for narrow views such as `by_patient`
//!
//! Every write invalidates the kind-wide prefix of the resources it can change.

mod appointments;
mod drugs;
mod hospitals;
mod lecturers;
mod medical_records;
mod orders;
mod patients;
mod predict;

pub use appointments::AppointmentQueries;
pub use drugs::DrugQueries;
pub use hospitals::HospitalQueries;
pub use lecturers::LecturerQueries;
pub use medical_records::MedicalRecordQueries;
pub use orders::OrderQueries;
pub use patients::PatientQueries;
pub use predict::PredictQueries;

use crate::key::{QueryKey, ResourceKind};

pub(crate) fn list_key<F: clinic_core::payload::ListFilters>(
    kind: ResourceKind,
    filters: &F,
) -> QueryKey {
    QueryKey::kind(kind).text("list").filters(filters)
}

pub(crate) fn detail_key(kind: ResourceKind, id: i64) -> QueryKey {
    QueryKey::kind(kind).text("detail").id(id)
}
