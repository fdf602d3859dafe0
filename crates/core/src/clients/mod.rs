//! Typed resource clients.
//!
//! Each client is a thin, stateless wrapper over [`ApiClient`](crate::ApiClient): it knows its
//! base path and the request shape of every operation, nothing else.

mod appointment;
mod drug;
mod hospital;
mod lecturer;
mod medical_record;
mod order;
mod patient;
mod predict;

pub use appointment::AppointmentApi;
pub use drug::DrugApi;
pub use hospital::HospitalApi;
pub use lecturer::LecturerApi;
pub use medical_record::MedicalRecordApi;
pub use order::OrderApi;
pub use patient::PatientApi;
pub use predict::PredictApi;
