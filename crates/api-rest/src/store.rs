//! In-memory tables.
//!
//! Each table is a map from id to a JSON object row. What a body may contain, and how text from a
//! multipart form is coerced, is described by a static [`TableSpec`] per resource.

use crate::body::{Incoming, Upload};
use crate::error::{ApiError, ApiResult};
use chrono::{SecondsFormat, Utc};
use clinic_core::constants::MAX_ATTACHMENT_BYTES;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

pub type Row = Map<String, Value>;

/// How a body field is parsed and checked.
#[derive(Clone, Copy)]
pub enum FieldKind {
    Text,
    Email,
    Date,
    Timestamp,
    Integer { min: i64 },
    Number { min: f64, max: f64 },
    /// JSON list; multipart forms carry it as a JSON string.
    List,
    /// One of a closed set of wire values.
    Enum(fn(&str) -> bool),
}

#[derive(Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default_int: Option<i64>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            default_int: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn default_int(mut self, value: i64) -> Self {
        self.default_int = Some(value);
        self
    }
}

/// Static description of one resource table.
pub struct TableSpec {
    pub table: &'static str,
    pub id_field: &'static str,
    /// Human name used in messages ("Drug with id 3 not found").
    pub label: &'static str,
    /// Fields a create/update body may carry.
    pub fields: &'static [FieldSpec],
    /// `(file part name, url field stored on the row)`.
    pub uploads: &'static [(&'static str, &'static str)],
    /// Fields matched case-insensitively by the `search` filter.
    pub search_fields: &'static [&'static str],
    /// Field matched by prefix with the `date` filter.
    pub date_field: Option<&'static str>,
}

impl TableSpec {
    fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn not_found(&self, id: i64) -> ApiError {
        ApiError::not_found(format!("{} with id {id} not found", self.label))
    }

    /// Parse the body fields of `incoming` into a row fragment.
    ///
    /// With `partial` unset (creation) required fields must be present and integer defaults are
    /// applied.
    pub fn coerce(&self, incoming: &Incoming, partial: bool) -> ApiResult<Row> {
        let mut row = Row::new();
        for (name, value) in &incoming.fields {
            let Some(spec) = self.field(name) else {
                return Err(ApiError::bad_request(format!("unknown field `{name}`")));
            };
            if let Some(value) = coerce_value(spec, value, incoming.multipart)? {
                row.insert(name.clone(), value);
            }
        }

        if !partial {
            for spec in self.fields {
                if row.contains_key(spec.name) {
                    continue;
                }
                if let Some(default) = spec.default_int {
                    row.insert(spec.name.to_owned(), Value::from(default));
                } else if spec.required {
                    return Err(ApiError::bad_request(format!("`{}` is required", spec.name)));
                }
            }
        }
        Ok(row)
    }

    /// Store each declared upload as a synthetic URL on the row. Undeclared file parts are
    /// rejected.
    pub fn attach_uploads(&self, incoming: &Incoming, row: &mut Row) -> ApiResult<()> {
        for upload in &incoming.uploads {
            let Some((_, url_field)) = self.uploads.iter().find(|(f, _)| *f == upload.field) else {
                return Err(ApiError::bad_request(format!(
                    "unexpected file field `{}`",
                    upload.field
                )));
            };
            check_upload_size(upload)?;
            row.insert(
                (*url_field).to_owned(),
                Value::String(upload_url(self.table, &upload.file_name, &upload.bytes)),
            );
        }
        Ok(())
    }

    /// Whether `row` satisfies every list filter in `params`.
    pub fn matches(&self, row: &Row, params: &HashMap<String, String>) -> bool {
        params.iter().all(|(name, wanted)| match name.as_str() {
            "search" => {
                let needle = wanted.to_lowercase();
                self.search_fields.iter().any(|f| {
                    row.get(*f)
                        .and_then(Value::as_str)
                        .is_some_and(|v| v.to_lowercase().contains(&needle))
                })
            }
            "date" if self.date_field.is_some() => self
                .date_field
                .and_then(|f| row.get(f))
                .and_then(Value::as_str)
                .is_some_and(|v| v.starts_with(wanted.as_str())),
            "in_stock" => {
                let stock = row.get("stock_quantity").and_then(Value::as_i64).unwrap_or(0);
                match wanted.as_str() {
                    "true" => stock > 0,
                    "false" => stock == 0,
                    _ => false,
                }
            }
            _ => row.get(name).is_some_and(|v| render(v) == *wanted),
        })
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn coerce_value(spec: &FieldSpec, value: &Value, from_text: bool) -> ApiResult<Option<Value>> {
    let name = spec.name;
    let invalid = |what: &str| ApiError::bad_request(format!("`{name}` must be {what}"));

    if value.is_null() {
        return Ok(None);
    }
    if let Value::String(s) = value {
        if s.trim().is_empty() {
            return Ok(None);
        }
    }

    let coerced = match spec.kind {
        FieldKind::Text => Value::String(render(value).trim().to_owned()),
        FieldKind::Email => {
            let text = value.as_str().ok_or_else(|| invalid("an email address"))?;
            let email = clinic_core::EmailAddress::parse(text)
                .map_err(|_| invalid("an email address"))?;
            Value::String(email.as_str().to_owned())
        }
        FieldKind::Date => {
            let text = value.as_str().ok_or_else(|| invalid("a date"))?;
            chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map_err(|_| invalid("a date in YYYY-MM-DD format"))?;
            Value::String(text.to_owned())
        }
        FieldKind::Timestamp => {
            let text = value.as_str().ok_or_else(|| invalid("a timestamp"))?;
            let ts = chrono::DateTime::parse_from_rfc3339(text)
                .map_err(|_| invalid("an RFC 3339 timestamp"))?;
            Value::String(
                ts.with_timezone(&Utc)
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            )
        }
        FieldKind::Integer { min } => {
            let n = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(|| invalid("a whole number"))?;
            if n < min {
                return Err(invalid(&format!("at least {min}")));
            }
            Value::from(n)
        }
        FieldKind::Number { min, max } => {
            let n = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .filter(|n| n.is_finite())
            .ok_or_else(|| invalid("a number"))?;
            if n < min || n > max {
                let range = if max == f64::MAX {
                    format!("at least {min}")
                } else {
                    format!("between {min} and {max}")
                };
                return Err(invalid(&range));
            }
            Value::from(n)
        }
        FieldKind::List => {
            let list = match value {
                Value::String(s) if from_text => {
                    serde_json::from_str(s).map_err(|_| invalid("a JSON list"))?
                }
                other => other.clone(),
            };
            if !list.is_array() {
                return Err(invalid("a list"));
            }
            list
        }
        FieldKind::Enum(accepts) => {
            let text = value.as_str().ok_or_else(|| invalid("text"))?;
            if !accepts(text) {
                return Err(ApiError::bad_request(format!(
                    "`{text}` is not a valid value for `{name}`"
                )));
            }
            Value::String(text.to_owned())
        }
    };
    Ok(Some(coerced))
}

/// Files at or above [`MAX_ATTACHMENT_BYTES`] are rejected.
pub fn check_upload_size(upload: &Upload) -> ApiResult<()> {
    if upload.bytes.len() >= MAX_ATTACHMENT_BYTES {
        return Err(ApiError::bad_request(format!(
            "file `{}` must be smaller than {MAX_ATTACHMENT_BYTES} bytes",
            upload.file_name
        )));
    }
    Ok(())
}

/// Content-addressed URL for an uploaded file, so re-sending the same file yields the same URL.
pub fn upload_url(table: &str, file_name: &str, bytes: &[u8]) -> String {
    let digest = hex::encode(Sha256::digest(bytes));
    format!("/uploads/{table}/{}-{file_name}", &digest[..12])
}

pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Default)]
struct Table {
    rows: BTreeMap<i64, Row>,
    last_id: i64,
}

/// All tables, behind one async lock.
#[derive(Default)]
pub struct Store {
    tables: RwLock<HashMap<&'static str, Table>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows matching `keep`, in id order.
    pub async fn list(&self, spec: &TableSpec, keep: impl Fn(&Row) -> bool) -> Vec<Row> {
        let tables = self.tables.read().await;
        tables
            .get(spec.table)
            .map(|t| t.rows.values().filter(|r| keep(r)).cloned().collect())
            .unwrap_or_default()
    }

    pub async fn find(&self, spec: &TableSpec, keep: impl Fn(&Row) -> bool) -> Option<Row> {
        let tables = self.tables.read().await;
        tables
            .get(spec.table)?
            .rows
            .values()
            .find(|r| keep(r))
            .cloned()
    }

    pub async fn get(&self, spec: &TableSpec, id: i64) -> ApiResult<Row> {
        let tables = self.tables.read().await;
        tables
            .get(spec.table)
            .and_then(|t| t.rows.get(&id))
            .cloned()
            .ok_or_else(|| spec.not_found(id))
    }

    /// Insert a new row, assigning its id and audit timestamps.
    pub async fn insert(&self, spec: &TableSpec, mut row: Row) -> Row {
        let mut tables = self.tables.write().await;
        let table = tables.entry(spec.table).or_default();
        table.last_id += 1;
        let id = table.last_id;
        let stamp = now();
        row.insert(spec.id_field.to_owned(), Value::from(id));
        row.insert("created_at".to_owned(), Value::String(stamp.clone()));
        row.insert("updated_at".to_owned(), Value::String(stamp));
        table.rows.insert(id, row.clone());
        tracing::debug!(table = spec.table, id, "inserted row");
        row
    }

    /// Merge `changes` into row `id`. `updated_at` only moves when something changed.
    pub async fn update(&self, spec: &TableSpec, id: i64, changes: Row) -> ApiResult<Row> {
        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(spec.table)
            .and_then(|t| t.rows.get_mut(&id))
            .ok_or_else(|| spec.not_found(id))?;

        let mut changed = false;
        for (name, value) in changes {
            if row.get(&name) != Some(&value) {
                row.insert(name, value);
                changed = true;
            }
        }
        if changed {
            row.insert("updated_at".to_owned(), Value::String(now()));
            tracing::debug!(table = spec.table, id, "updated row");
        }
        Ok(row.clone())
    }

    pub async fn delete(&self, spec: &TableSpec, id: i64) -> ApiResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .get_mut(spec.table)
            .and_then(|t| t.rows.remove(&id))
            .map(|_| tracing::debug!(table = spec.table, id, "deleted row"))
            .ok_or_else(|| spec.not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{DRUGS, HOSPITALS};
    use serde_json::json;

    fn form(fields: Value, multipart: bool) -> Incoming {
        let Value::Object(fields) = fields else {
            panic!("expected object");
        };
        Incoming {
            fields,
            uploads: Vec::new(),
            multipart,
        }
    }

    #[test]
    fn test_coerce_multipart_text() {
        let incoming = form(
            json!({ "name": "Atropine", "price": "12.5", "unit": "bottle", "category": "EYE_DROPS" }),
            true,
        );
        let row = DRUGS.coerce(&incoming, false).unwrap();
        assert_eq!(row["price"], json!(12.5));
        assert_eq!(row["stock_quantity"], json!(0));
    }

    #[test]
    fn test_coerce_rejects_unknown_and_out_of_range() {
        let incoming = form(json!({ "name": "X", "owner": "me" }), false);
        assert_eq!(
            DRUGS.coerce(&incoming, true).unwrap_err().message,
            "unknown field `owner`"
        );

        let incoming = form(json!({ "latitude": 123.0 }), false);
        let err = HOSPITALS.coerce(&incoming, true).unwrap_err();
        assert!(err.message.starts_with("`latitude` must be between"));
    }

    #[test]
    fn test_missing_required_field() {
        let incoming = form(json!({ "name": "Atropine" }), false);
        let err = DRUGS.coerce(&incoming, false).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_filters() {
        let row = json!({ "name": "Atropine Eye Drops", "category": "EYE_DROPS", "stock_quantity": 0 });
        let Value::Object(row) = row else { unreachable!() };
        let params = |pairs: &[(&str, &str)]| -> HashMap<String, String> {
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
        };
        assert!(DRUGS.matches(&row, &params(&[("search", "atro")])));
        assert!(DRUGS.matches(&row, &params(&[("category", "EYE_DROPS"), ("in_stock", "false")])));
        assert!(!DRUGS.matches(&row, &params(&[("in_stock", "true")])));
        assert!(!DRUGS.matches(&row, &params(&[("category", "TABLET")])));
    }

    #[tokio::test]
    async fn test_update_keeps_timestamp_when_unchanged() {
        let store = Store::new();
        let mut row = Row::new();
        row.insert("name".into(), json!("Atropine"));
        let inserted = store.insert(&DRUGS, row.clone()).await;
        let id = inserted["drug_id"].as_i64().unwrap();

        let same = store.update(&DRUGS, id, row).await.unwrap();
        assert_eq!(same, inserted);
        assert!(store.delete(&DRUGS, id).await.is_ok());
        assert_eq!(store.get(&DRUGS, id).await.unwrap_err().message, "Drug with id 1 not found");
    }
}
