//! Request bodies that may arrive as JSON or as multipart form data.

use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use serde_json::{Map, Value};

/// An uploaded file part.
#[derive(Clone, Debug)]
pub struct Upload {
    pub field: String,
    pub file_name: String,
    pub bytes: Bytes,
}

/// A create/update body: the JSON object or the text parts of a multipart form, plus any files.
#[derive(Clone, Debug, Default)]
pub struct Incoming {
    /// JSON values, or raw strings for multipart text parts.
    pub fields: Map<String, Value>,
    pub uploads: Vec<Upload>,
    pub multipart: bool,
}

impl Incoming {
    pub fn uploads_named<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Upload> + 'a {
        self.uploads.iter().filter(move |u| u.field == field)
    }
}

#[axum::async_trait]
impl<S> FromRequest<S> for Incoming
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            let Value::Object(fields) = value else {
                return Err(ApiError::bad_request("request body must be a JSON object"));
            };
            return Ok(Incoming {
                fields,
                uploads: Vec::new(),
                multipart: false,
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        let mut incoming = Incoming {
            multipart: true,
            ..Default::default()
        };
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_owned();
            let file_name = field.file_name().map(str::to_owned);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            match file_name {
                Some(file_name) => incoming.uploads.push(Upload {
                    field: name,
                    file_name,
                    bytes,
                }),
                None => {
                    let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
                        ApiError::bad_request(format!("field `{name}` is not valid UTF-8"))
                    })?;
                    incoming.fields.insert(name, Value::String(text));
                }
            }
        }
        Ok(incoming)
    }
}
