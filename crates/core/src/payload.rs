//! Request payload encoding.
//!
//! Every create/update body goes through [`encode_payload`]. The body is serialised once with
//! serde; if it carries no attachments it is sent as JSON, otherwise each field is turned into a
//! multipart part according to the body's [`FieldTreatment`] policy and the files are appended
//! under their declared keys.
//!
//! `null` values are dropped in both encodings, so an absent optional field never reaches the
//! backend as the string `"null"`.

use crate::attachment::{Attachment, TaggedAttachment};
use crate::models::WireEnum;
use crate::transport::RequestBody;
use crate::{ClientError, ClientResult};
use serde::Serialize;
use serde_json::{Map, Value};

/// How a serialised field is written into a multipart body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldTreatment {
    /// Scalar written as its plain text form.
    Plain,
    /// Any value written as a JSON string (nested lists and objects).
    Json,
}

/// One file-carrying field of a body.
#[derive(Clone, Debug)]
pub struct FileField<'a> {
    key: &'static str,
    files: Vec<&'a Attachment>,
    type_tags: Option<(&'static str, Vec<&'static str>)>,
}

impl<'a> FileField<'a> {
    /// A single optional file under `key` (for example `image`, `logo`, `avatar`).
    pub fn single(key: &'static str, file: Option<&'a Attachment>) -> Self {
        Self {
            key,
            files: file.into_iter().collect(),
            type_tags: None,
        }
    }

    /// Repeated files under `key`, with their category tags comma-joined under `types_key` in
    /// upload order.
    pub fn tagged(key: &'static str, types_key: &'static str, files: &'a [TaggedAttachment]) -> Self {
        Self {
            key,
            files: files.iter().map(|f| &f.attachment).collect(),
            type_tags: Some((types_key, files.iter().map(|f| f.file_type.as_wire()).collect())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// A request body the clients know how to encode.
pub trait Payload: Serialize {
    /// Multipart treatment for a serialised field. Nested values must be declared `Json`.
    fn treatment(_field: &str) -> FieldTreatment {
        FieldTreatment::Plain
    }

    /// File-carrying fields. Attachments are skipped by serde and reported here instead.
    fn file_fields(&self) -> Vec<FileField<'_>> {
        Vec::new()
    }
}

/// A single part of a multipart body.
#[derive(Clone, Debug, PartialEq)]
pub enum Part {
    Text { name: String, value: String },
    File { name: String, attachment: Attachment },
}

/// Transport-neutral multipart body. The HTTP transport turns it into `multipart/form-data`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultipartPayload {
    parts: Vec<Part>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push(Part::Text {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn push_file(&mut self, name: impl Into<String>, attachment: Attachment) {
        self.parts.push(Part::File {
            name: name.into(),
            attachment,
        });
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// First text value stored under `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            Part::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// All files stored under `name`, in upload order.
    pub fn files(&self, name: &str) -> Vec<&Attachment> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::File { name: n, attachment } if n == name => Some(attachment),
                _ => None,
            })
            .collect()
    }
}

/// Encode a body as JSON, or as multipart when it carries at least one attachment.
///
/// # Errors
///
/// Returns [`ClientError::Encode`] if the body does not serialise to a JSON object, or if a
/// nested value appears in a field whose treatment is [`FieldTreatment::Plain`].
pub fn encode_payload<P: Payload>(body: &P) -> ClientResult<RequestBody> {
    let fields = serialise_fields(body)?;
    let file_fields = body.file_fields();

    if file_fields.iter().all(FileField::is_empty) {
        return Ok(RequestBody::Json(Value::Object(fields)));
    }

    let mut payload = MultipartPayload::new();
    for (name, value) in fields {
        let text = match (P::treatment(&name), value) {
            (FieldTreatment::Json, value) => value.to_string(),
            (FieldTreatment::Plain, Value::String(s)) => s,
            (FieldTreatment::Plain, v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
            (FieldTreatment::Plain, _) => {
                return Err(ClientError::Encode(format!(
                    "field `{name}` is nested and must be declared as FieldTreatment::Json"
                )));
            }
        };
        payload.push_text(name, text);
    }

    for field in file_fields {
        if field.files.is_empty() {
            continue;
        }
        for file in &field.files {
            payload.push_file(field.key, (*file).clone());
        }
        if let Some((types_key, tags)) = field.type_tags {
            payload.push_text(types_key, tags.join(","));
        }
    }

    Ok(RequestBody::Multipart(payload))
}

fn serialise_fields<P: Serialize>(body: &P) -> ClientResult<Map<String, Value>> {
    let value = serde_json::to_value(body).map_err(|e| ClientError::Encode(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(ClientError::Encode(
            "request body must serialise to a JSON object".into(),
        ));
    };
    Ok(map.into_iter().filter(|(_, v)| !v.is_null()).collect())
}

/// Query-string parameters for list endpoints.
///
/// Absent values and blank strings are never pushed, so a filter the user left empty does not
/// appear in the request at all.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<V: std::fmt::Display>(mut self, name: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            let value = value.to_string();
            if !value.trim().is_empty() {
                self.0.push((name.to_owned(), value.trim().to_owned()));
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.0
    }
}

/// Closed filter record for a list endpoint.
pub trait ListFilters {
    fn query_params(&self) -> QueryParams;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordFileType;

    #[derive(Serialize)]
    struct Body {
        name: String,
        price: f64,
        note: Option<String>,
        items: Vec<u32>,
        #[serde(skip)]
        photo: Option<Attachment>,
        #[serde(skip)]
        files: Vec<TaggedAttachment>,
    }

    impl Payload for Body {
        fn treatment(field: &str) -> FieldTreatment {
            match field {
                "items" => FieldTreatment::Json,
                _ => FieldTreatment::Plain,
            }
        }

        fn file_fields(&self) -> Vec<FileField<'_>> {
            vec![
                FileField::single("photo", self.photo.as_ref()),
                FileField::tagged("files", "file_types", &self.files),
            ]
        }
    }

    fn body() -> Body {
        Body {
            name: "Atropine".into(),
            price: 12.5,
            note: None,
            items: vec![1, 2],
            photo: None,
            files: Vec::new(),
        }
    }

    #[test]
    fn test_encode_without_files_is_json_without_nulls() {
        let RequestBody::Json(value) = encode_payload(&body()).unwrap() else {
            panic!("expected JSON body");
        };
        assert_eq!(value["name"], "Atropine");
        assert_eq!(value["items"], serde_json::json!([1, 2]));
        assert!(value.get("note").is_none());
    }

    #[test]
    fn test_encode_with_file_switches_to_multipart() {
        let mut b = body();
        b.photo = Some(Attachment::new("a.png", "image/png", vec![1, 2, 3]));

        let RequestBody::Multipart(form) = encode_payload(&b).unwrap() else {
            panic!("expected multipart body");
        };
        assert_eq!(form.text("name"), Some("Atropine"));
        assert_eq!(form.text("price"), Some("12.5"));
        assert_eq!(form.text("items"), Some("[1,2]"));
        assert_eq!(form.text("note"), None);
        assert_eq!(form.files("photo").len(), 1);
        assert!(form
            .parts()
            .iter()
            .all(|p| !matches!(p, Part::Text { value, .. } if value == "undefined" || value == "null")));
    }

    #[test]
    fn test_tagged_files_keep_upload_order() {
        let mut b = body();
        b.files = vec![
            TaggedAttachment::new(
                Attachment::new("oct.png", "image/png", vec![1]),
                RecordFileType::Oct,
            ),
            TaggedAttachment::new(
                Attachment::new("lab.pdf", "application/pdf", vec![2]),
                RecordFileType::LabReport,
            ),
        ];

        let RequestBody::Multipart(form) = encode_payload(&b).unwrap() else {
            panic!("expected multipart body");
        };
        let names: Vec<_> = form.files("files").iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["oct.png", "lab.pdf"]);
        assert_eq!(form.text("file_types"), Some("OCT,LAB_REPORT"));
    }

    #[test]
    fn test_nested_plain_field_is_rejected() {
        #[derive(Serialize)]
        struct Bad {
            tags: Vec<String>,
            #[serde(skip)]
            photo: Attachment,
        }
        impl Payload for Bad {
            fn file_fields(&self) -> Vec<FileField<'_>> {
                vec![FileField::single("photo", Some(&self.photo))]
            }
        }

        let bad = Bad {
            tags: vec!["x".into()],
            photo: Attachment::new("p.png", "image/png", vec![0]),
        };
        let err = encode_payload(&bad).unwrap_err();
        assert!(matches!(err, ClientError::Encode(msg) if msg.contains("tags")));
    }

    #[test]
    fn test_query_params_skip_absent_and_blank() {
        let params = QueryParams::new()
            .push("status", Some("PENDING"))
            .push::<&str>("search", None)
            .push("doctor_id", Some(7))
            .push("date", Some("  "));
        assert_eq!(
            params.into_pairs(),
            vec![
                ("status".to_owned(), "PENDING".to_owned()),
                ("doctor_id".to_owned(), "7".to_owned())
            ]
        );
    }
}
