use crate::attachment::Attachment;
use crate::payload::{FileField, ListFilters, Payload, QueryParams};
use chrono::{DateTime, Utc};
use clinic_types::{EmailAddress, NonEmptyText};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lecturer {
    pub lecturer_id: i64,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub specialization: String,
    #[serde(default)]
    pub academic_title: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LecturerFilters {
    pub search: Option<String>,
    pub specialization: Option<String>,
}

impl ListFilters for LecturerFilters {
    fn query_params(&self) -> QueryParams {
        QueryParams::new()
            .push("search", self.search.as_deref())
            .push("specialization", self.specialization.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LecturerBody {
    pub full_name: NonEmptyText,
    pub email: EmailAddress,
    pub phone: Option<String>,
    pub specialization: NonEmptyText,
    pub academic_title: Option<String>,
    pub bio: Option<String>,
    #[serde(skip)]
    pub avatar: Option<Attachment>,
}

impl Payload for LecturerBody {
    fn file_fields(&self) -> Vec<FileField<'_>> {
        vec![FileField::single("avatar", self.avatar.as_ref())]
    }
}
