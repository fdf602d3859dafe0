use crate::attachment::Attachment;
use crate::payload::{FileField, ListFilters, Payload, QueryParams};
use chrono::{DateTime, NaiveDate, Utc};
use clinic_types::NonEmptyText;
use serde::{Deserialize, Serialize};

wire_enum! {
    pub enum Gender {
        Male => "MALE",
        Female => "FEMALE",
        Other => "OTHER",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: i64,
    pub user_id: i64,
    pub full_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientFilters {
    pub search: Option<String>,
    pub gender: Option<Gender>,
}

impl ListFilters for PatientFilters {
    fn query_params(&self) -> QueryParams {
        QueryParams::new()
            .push("search", self.search.as_deref())
            .push("gender", self.gender)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PatientBody {
    pub user_id: i64,
    pub full_name: NonEmptyText,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(skip)]
    pub avatar: Option<Attachment>,
}

impl Payload for PatientBody {
    fn file_fields(&self) -> Vec<FileField<'_>> {
        vec![FileField::single("avatar", self.avatar.as_ref())]
    }
}
