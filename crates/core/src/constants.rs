//! Constants used throughout the clinic core crate.
//!
//! Base paths for every backend resource live here so the clients and the development backend
//! agree on the REST surface.

/// Default backend URL when no explicit URL is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upper bound (exclusive) for a single attached file: 5 MiB.
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

/// Number of ranked predictions requested when the caller does not say.
pub const DEFAULT_TOP_K: u32 = 3;

/// Largest `top_k` the retinal model accepts.
pub const MAX_TOP_K: u32 = 10;

pub const APPOINTMENTS_PATH: &str = "/hospital/appointments";
pub const DRUGS_PATH: &str = "/hospital/drugs";
pub const HOSPITALS_PATH: &str = "/hospital/hospitals";
pub const LECTURERS_PATH: &str = "/lecturers";
pub const MEDICAL_RECORDS_PATH: &str = "/hospital/medical_records";
pub const FULL_RECORDS_PATH: &str = "/hospital/full-records";
pub const ORDERS_PATH: &str = "/hospital/orders";
pub const PATIENTS_PATH: &str = "/patients";
pub const PREDICT_PATH: &str = "/retinal/predict";
