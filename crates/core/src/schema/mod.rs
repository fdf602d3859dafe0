//! Form validation schemas.
//!
//! A schema turns raw form input ([`RawForm`]) into a normalised body, or rejects it with every
//! violated constraint as a `{path, message}` pair. Validation always runs before a request is
//! built, so a rejected form never reaches a transport.
//!
//! Policies shared by every schema:
//! - unknown keys are rejected rather than forwarded
//! - numbers may arrive as text and are coerced before range checks
//! - each attached file must be smaller than [`MAX_ATTACHMENT_BYTES`]
//! - enum fields only accept the resource's closed set of values
//! - defaults are applied here, not in the clients

mod appointment;
mod drug;
mod hospital;
mod lecturer;
mod medical_record;
mod order;
mod patient;
mod predict;

pub use appointment::AppointmentStatusForm;
pub use order::OrderStatusForm;
pub use predict::PredictForm;

use crate::attachment::{Attachment, TaggedAttachment};
use crate::constants::MAX_ATTACHMENT_BYTES;
use crate::models::WireEnum;
use chrono::{DateTime, NaiveDate, Utc};
use clinic_types::{EmailAddress, NonEmptyText};
use std::collections::BTreeMap;

/// A single raw form value as a UI would hold it.
#[derive(Clone, Debug, PartialEq)]
pub enum FormValue {
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    Files(Vec<Attachment>),
    TaggedFiles(Vec<TaggedAttachment>),
    Rows(Vec<RawForm>),
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_owned())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

impl From<f64> for FormValue {
    fn from(value: f64) -> Self {
        FormValue::Number(value)
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        FormValue::Number(value as f64)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        FormValue::Bool(value)
    }
}

impl From<Attachment> for FormValue {
    fn from(value: Attachment) -> Self {
        FormValue::Files(vec![value])
    }
}

impl<T: Into<FormValue>> From<Option<T>> for FormValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FormValue::Null, Into::into)
    }
}

/// Raw form input keyed by field name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawForm(BTreeMap<String, FormValue>);

impl RawForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: &str, value: impl Into<FormValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<FormValue>) {
        self.0.insert(field.to_owned(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&FormValue> {
        self.0.get(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builder-style insert of nested rows.
    pub fn with_rows(self, field: &str, rows: Vec<RawForm>) -> Self {
        self.with(field, FormValue::Rows(rows))
    }

    /// Builder-style insert of tagged files.
    pub fn with_tagged_files(self, field: &str, files: Vec<TaggedAttachment>) -> Self {
        self.with(field, FormValue::TaggedFiles(files))
    }
}

/// One violated constraint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

/// Every violated constraint of one form, in field order of discovery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// First error reported for `path`.
    pub fn for_field(&self, path: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.path == path)
    }

    pub fn has_field(&self, path: &str) -> bool {
        self.for_field(path).is_some()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        write!(f, "invalid form ({})", rendered.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// A body that can be parsed from, and rendered back into, raw form input.
///
/// `from_form(&body.to_form())` must reproduce `body` for every valid body.
pub trait FormBody: Sized {
    /// The closed set of accepted keys.
    const FIELDS: &'static [&'static str];

    fn from_form(form: &RawForm) -> Result<Self, ValidationErrors>;

    fn to_form(&self) -> RawForm;
}

/// Reads fields out of a [`RawForm`], collecting every violation instead of stopping at the first.
///
/// Getters return `None` both for absent optional fields and for invalid ones; in the latter
/// case an error has been recorded and [`FieldReader::finish`] will fail.
pub struct FieldReader<'a> {
    form: &'a RawForm,
    prefix: String,
    errors: Vec<FieldError>,
}

impl<'a> FieldReader<'a> {
    pub fn new(form: &'a RawForm, allowed: &[&str]) -> Self {
        Self::scoped(form, allowed, String::new())
    }

    fn scoped(form: &'a RawForm, allowed: &[&str], prefix: String) -> Self {
        let mut reader = Self {
            form,
            prefix,
            errors: Vec::new(),
        };
        let unknown: Vec<String> = form
            .keys()
            .filter(|k| !allowed.contains(k))
            .map(str::to_owned)
            .collect();
        for key in unknown {
            reader.fail(&key, "is not a recognised field");
        }
        reader
    }

    fn path(&self, field: &str) -> String {
        if self.prefix.is_empty() {
            field.to_owned()
        } else {
            format!("{}.{}", self.prefix, field)
        }
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        let path = self.path(field);
        self.errors.push(FieldError {
            path,
            message: message.into(),
        });
    }

    /// The value of `field`, treating `Null` and blank text as absent.
    fn present(&self, field: &str) -> Option<&'a FormValue> {
        match self.form.get(field) {
            None | Some(FormValue::Null) => None,
            Some(FormValue::Text(t)) if t.trim().is_empty() => None,
            Some(value) => Some(value),
        }
    }

    fn text_value(&mut self, field: &str) -> Option<String> {
        match self.present(field)? {
            FormValue::Text(t) => Some(t.trim().to_owned()),
            FormValue::Number(n) => Some(n.to_string()),
            _ => {
                self.fail(field, "must be text");
                None
            }
        }
    }

    pub fn required_text(&mut self, field: &str) -> Option<NonEmptyText> {
        let Some(text) = self.text_value(field) else {
            if self.present(field).is_none() {
                self.fail(field, "is required");
            }
            return None;
        };
        match NonEmptyText::new(text) {
            Ok(t) => Some(t),
            Err(e) => {
                self.fail(field, e.to_string());
                None
            }
        }
    }

    pub fn optional_text(&mut self, field: &str) -> Option<String> {
        self.text_value(field)
    }

    pub fn required_email(&mut self, field: &str) -> Option<EmailAddress> {
        if self.present(field).is_none() {
            self.fail(field, "is required");
            return None;
        }
        self.optional_email(field)
    }

    pub fn optional_email(&mut self, field: &str) -> Option<EmailAddress> {
        let text = self.text_value(field)?;
        match EmailAddress::parse(text) {
            Ok(email) => Some(email),
            Err(e) => {
                self.fail(field, e.to_string());
                None
            }
        }
    }

    fn number_value(&mut self, field: &str) -> Option<f64> {
        let value = match self.present(field)? {
            FormValue::Number(n) => *n,
            FormValue::Text(t) => match t.trim().parse::<f64>() {
                Ok(n) => n,
                Err(_) => {
                    self.fail(field, "must be a number");
                    return None;
                }
            },
            _ => {
                self.fail(field, "must be a number");
                return None;
            }
        };
        if !value.is_finite() {
            self.fail(field, "must be a finite number");
            return None;
        }
        Some(value)
    }

    /// A required number within `min..=max`.
    pub fn number_in(&mut self, field: &str, min: f64, max: f64) -> Option<f64> {
        let Some(value) = self.number_value(field) else {
            if self.present(field).is_none() {
                self.fail(field, "is required");
            }
            return None;
        };
        if value < min || value > max {
            self.fail(field, format!("must be between {min} and {max}"));
            return None;
        }
        Some(value)
    }

    /// A required number that is zero or more.
    pub fn non_negative(&mut self, field: &str) -> Option<f64> {
        let Some(value) = self.number_value(field) else {
            if self.present(field).is_none() {
                self.fail(field, "is required");
            }
            return None;
        };
        if value < 0.0 {
            self.fail(field, "must be at least 0");
            return None;
        }
        Some(value)
    }

    fn integer_value(&mut self, field: &str) -> Option<i64> {
        let value = self.number_value(field)?;
        if value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
            self.fail(field, "must be a whole number");
            return None;
        }
        Some(value as i64)
    }

    /// An optional integer of at least `min`, defaulting to `default` when absent.
    pub fn integer_or(&mut self, field: &str, default: i64, min: i64) -> Option<i64> {
        if self.present(field).is_none() {
            return Some(default);
        }
        let value = self.integer_value(field)?;
        if value < min {
            self.fail(field, format!("must be at least {min}"));
            return None;
        }
        Some(value)
    }

    /// A required count of at least `min`.
    pub fn count(&mut self, field: &str, min: u32) -> Option<u32> {
        if self.present(field).is_none() {
            self.fail(field, "is required");
            return None;
        }
        let value = self.integer_value(field)?;
        match u32::try_from(value) {
            Ok(v) if v >= min => Some(v),
            _ => {
                self.fail(field, format!("must be at least {min}"));
                None
            }
        }
    }

    /// A required positive identifier.
    pub fn required_id(&mut self, field: &str) -> Option<i64> {
        if self.present(field).is_none() {
            self.fail(field, "is required");
            return None;
        }
        self.optional_id(field)
    }

    pub fn optional_id(&mut self, field: &str) -> Option<i64> {
        let value = self.integer_value(field)?;
        if value <= 0 {
            self.fail(field, "must be a positive identifier");
            return None;
        }
        Some(value)
    }

    pub fn required_enum<E: WireEnum>(&mut self, field: &str) -> Option<E> {
        if self.present(field).is_none() {
            self.fail(field, "is required");
            return None;
        }
        self.optional_enum(field)
    }

    pub fn optional_enum<E: WireEnum>(&mut self, field: &str) -> Option<E> {
        let text = self.text_value(field)?;
        match E::from_wire(&text) {
            Some(value) => Some(value),
            None => {
                self.fail(
                    field,
                    format!("`{text}` is not one of: {}", E::expected()),
                );
                None
            }
        }
    }

    /// An optional ISO date (`YYYY-MM-DD`).
    pub fn optional_date(&mut self, field: &str) -> Option<NaiveDate> {
        let text = self.text_value(field)?;
        match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.fail(field, "must be a date in YYYY-MM-DD format");
                None
            }
        }
    }

    /// A required RFC 3339 timestamp, normalised to UTC.
    pub fn required_datetime(&mut self, field: &str) -> Option<DateTime<Utc>> {
        let Some(text) = self.text_value(field) else {
            if self.present(field).is_none() {
                self.fail(field, "is required");
            }
            return None;
        };
        match DateTime::parse_from_rfc3339(&text) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(_) => {
                self.fail(field, "must be an RFC 3339 timestamp");
                None
            }
        }
    }

    fn check_size(&mut self, field: &str, attachment: &Attachment) -> bool {
        if attachment.len() >= MAX_ATTACHMENT_BYTES {
            self.fail(
                field,
                format!(
                    "file `{}` is {} bytes; files must be smaller than 5 MiB",
                    attachment.file_name(),
                    attachment.len()
                ),
            );
            return false;
        }
        true
    }

    /// At most one file under `field`.
    pub fn optional_file(&mut self, field: &str) -> Option<Attachment> {
        let files = match self.present(field)? {
            FormValue::Files(files) => files,
            _ => {
                self.fail(field, "must be a file");
                return None;
            }
        };
        match files.as_slice() {
            [] => None,
            [file] => self.check_size(field, file).then(|| file.clone()),
            _ => {
                self.fail(field, "accepts a single file");
                None
            }
        }
    }

    pub fn required_file(&mut self, field: &str) -> Option<Attachment> {
        let file = self.optional_file(field);
        if file.is_none() && !self.errors.iter().any(|e| e.path == self.path(field)) {
            self.fail(field, "is required");
        }
        file
    }

    /// Tagged files under `field`; each must satisfy the size ceiling.
    pub fn tagged_files(&mut self, field: &str) -> Vec<TaggedAttachment> {
        let files = match self.present(field) {
            None => return Vec::new(),
            Some(FormValue::TaggedFiles(files)) => files,
            Some(_) => {
                self.fail(field, "must be a list of tagged files");
                return Vec::new();
            }
        };
        let mut accepted = Vec::with_capacity(files.len());
        for (i, file) in files.iter().enumerate() {
            if self.check_size(&format!("{field}[{i}]"), &file.attachment) {
                accepted.push(file.clone());
            }
        }
        accepted
    }

    /// Nested rows under `field`, each parsed with its own closed key set.
    pub fn rows<T>(
        &mut self,
        field: &str,
        allowed: &[&str],
        mut parse: impl FnMut(&mut FieldReader<'a>) -> Option<T>,
    ) -> Vec<T> {
        let rows = match self.present(field) {
            None => return Vec::new(),
            Some(FormValue::Rows(rows)) => rows,
            Some(_) => {
                self.fail(field, "must be a list");
                return Vec::new();
            }
        };
        let mut parsed = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let mut nested = FieldReader::scoped(row, allowed, format!("{}[{i}]", self.path(field)));
            if let Some(value) = parse(&mut nested) {
                parsed.push(value);
            }
            self.errors.append(&mut nested.errors);
        }
        parsed
    }

    /// Finish reading: fail with every collected error, otherwise build the value.
    pub fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, ValidationErrors> {
        if !self.errors.is_empty() {
            return Err(ValidationErrors(self.errors));
        }
        build().ok_or_else(|| {
            ValidationErrors(vec![FieldError {
                path: if self.prefix.is_empty() {
                    "<form>".to_owned()
                } else {
                    self.prefix
                },
                message: "is incomplete".to_owned(),
            }])
        })
    }
}

/// Status transition form shared by every `PUT /:id/status` endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusForm<S> {
    pub status: S,
}

impl<S: WireEnum> FormBody for StatusForm<S> {
    const FIELDS: &'static [&'static str] = &["status"];

    fn from_form(form: &RawForm) -> Result<Self, ValidationErrors> {
        let mut r = FieldReader::new(form, Self::FIELDS);
        let status = r.required_enum::<S>("status");
        r.finish(|| Some(StatusForm { status: status? }))
    }

    fn to_form(&self) -> RawForm {
        RawForm::new().with("status", self.status.as_wire())
    }
}

/// Render an optional string field for [`FormBody::to_form`].
fn opt_text(value: &Option<String>) -> FormValue {
    value.clone().into()
}

/// Render an optional single file for [`FormBody::to_form`].
fn opt_file(value: &Option<Attachment>) -> FormValue {
    value
        .clone()
        .map_or(FormValue::Null, |file| FormValue::Files(vec![file]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentStatus;

    #[test]
    fn test_unknown_keys_are_rejected() {
        let form = RawForm::new().with("status", "PENDING").with("owner", "me");
        let err = StatusForm::<AppointmentStatus>::from_form(&form).unwrap_err();
        assert_eq!(
            err.for_field("owner").map(|e| e.message.as_str()),
            Some("is not a recognised field")
        );
    }

    #[test]
    fn test_status_form_rejects_value_outside_enum() {
        let form = RawForm::new().with("status", "INVALID");
        let err = StatusForm::<AppointmentStatus>::from_form(&form).unwrap_err();
        let message = &err.for_field("status").unwrap().message;
        assert!(message.contains("`INVALID` is not one of"));
    }

    #[test]
    fn test_status_form_round_trip() {
        let form = StatusForm {
            status: AppointmentStatus::Confirmed,
        };
        assert_eq!(StatusForm::from_form(&form.to_form()).unwrap(), form);
    }

    #[test]
    fn test_missing_required_field() {
        let err = StatusForm::<AppointmentStatus>::from_form(&RawForm::new()).unwrap_err();
        assert_eq!(err.for_field("status").unwrap().message, "is required");
        assert!(err.to_string().contains("status: is required"));
    }

    #[test]
    fn test_file_size_boundary() {
        let just_under = Attachment::new("a.jpg", "image/jpeg", vec![0u8; MAX_ATTACHMENT_BYTES - 1]);
        let at_limit = Attachment::new("b.jpg", "image/jpeg", vec![0u8; MAX_ATTACHMENT_BYTES]);
        let over = Attachment::new("c.jpg", "image/jpeg", vec![0u8; MAX_ATTACHMENT_BYTES + 1]);

        let form = RawForm::new()
            .with("ok", just_under)
            .with("edge", at_limit)
            .with("big", over);
        let mut r = FieldReader::new(&form, &["ok", "edge", "big"]);
        assert!(r.optional_file("ok").is_some());
        assert!(r.optional_file("edge").is_none());
        assert!(r.optional_file("big").is_none());

        let err = r.finish(|| Some(())).unwrap_err();
        assert!(!err.has_field("ok"));
        assert!(err.has_field("edge"));
        assert!(err.has_field("big"));
    }

    #[test]
    fn test_numeric_coercion_from_text() {
        let form = RawForm::new().with("lat", " 10.75 ").with("lng", "east");
        let mut r = FieldReader::new(&form, &["lat", "lng"]);
        assert_eq!(r.number_in("lat", -90.0, 90.0), Some(10.75));
        assert_eq!(r.number_in("lng", -180.0, 180.0), None);
        let err = r.finish(|| Some(())).unwrap_err();
        assert_eq!(err.for_field("lng").unwrap().message, "must be a number");
    }

    #[test]
    fn test_rows_report_indexed_paths() {
        let form = RawForm::new().with_rows(
            "items",
            vec![
                RawForm::new().with("qty", "2"),
                RawForm::new().with("qty", "-1"),
            ],
        );
        let mut r = FieldReader::new(&form, &["items"]);
        let parsed = r.rows("items", &["qty"], |row| row.count("qty", 1));
        assert_eq!(parsed, vec![2]);
        let err = r.finish(|| Some(())).unwrap_err();
        assert!(err.has_field("items[1].qty"));
    }
}
