use crate::attachment::Attachment;
use crate::payload::{FileField, ListFilters, Payload, QueryParams};
use chrono::{DateTime, Utc};
use clinic_types::NonEmptyText;
use serde::{Deserialize, Serialize};

wire_enum! {
    pub enum DrugCategory {
        EyeDrops => "EYE_DROPS",
        Ointment => "OINTMENT",
        Tablet => "TABLET",
        Injection => "INJECTION",
        Supplement => "SUPPLEMENT",
        Other => "OTHER",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Drug {
    pub drug_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock_quantity: i64,
    pub unit: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    pub category: DrugCategory,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrugFilters {
    pub search: Option<String>,
    pub category: Option<DrugCategory>,
    pub in_stock: Option<bool>,
}

impl ListFilters for DrugFilters {
    fn query_params(&self) -> QueryParams {
        QueryParams::new()
            .push("search", self.search.as_deref())
            .push("category", self.category)
            .push("in_stock", self.in_stock)
    }
}

/// Create/update body for a drug. Sent as multipart when `image` is present.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DrugBody {
    pub name: NonEmptyText,
    pub description: Option<String>,
    pub price: f64,
    pub stock_quantity: i64,
    pub unit: NonEmptyText,
    pub manufacturer: Option<String>,
    pub category: DrugCategory,
    #[serde(skip)]
    pub image: Option<Attachment>,
}

impl Payload for DrugBody {
    fn file_fields(&self) -> Vec<FileField<'_>> {
        vec![FileField::single("image", self.image.as_ref())]
    }
}
