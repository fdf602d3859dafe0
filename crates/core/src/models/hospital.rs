use crate::attachment::Attachment;
use crate::payload::{FileField, ListFilters, Payload, QueryParams};
use chrono::{DateTime, Utc};
use clinic_types::{EmailAddress, NonEmptyText};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    pub hospital_id: i64,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HospitalFilters {
    pub search: Option<String>,
}

impl ListFilters for HospitalFilters {
    fn query_params(&self) -> QueryParams {
        QueryParams::new().push("search", self.search.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HospitalBody {
    pub name: NonEmptyText,
    pub address: NonEmptyText,
    pub phone: Option<String>,
    pub email: Option<EmailAddress>,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
    #[serde(skip)]
    pub logo: Option<Attachment>,
}

impl Payload for HospitalBody {
    fn file_fields(&self) -> Vec<FileField<'_>> {
        vec![FileField::single("logo", self.logo.as_ref())]
    }
}
