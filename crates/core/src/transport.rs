//! The transport seam.
//!
//! Resource clients build [`ApiRequest`] values and hand them to a [`Transport`]. Production code
//! uses [`HttpTransport`] (reqwest); tests inject a scripted transport instead of patching any
//! process-wide state.

use crate::config::ClientConfig;
use crate::payload::{MultipartPayload, Part};
use crate::{ClientError, ClientResult};
use async_trait::async_trait;
use bytes::Bytes;

pub use reqwest::Method;

/// Request body variants.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartPayload),
}

impl RequestBody {
    /// Declared content type, without the multipart boundary the transport adds.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Json(_) => Some("application/json"),
            RequestBody::Multipart(_) => Some("multipart/form-data"),
        }
    }
}

/// A transport-neutral request against a path relative to the configured base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Value of the first query parameter named `name`.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response: status plus body bytes. Envelope handling happens in the client.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: Bytes,
}

impl ApiReply {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests to the backend.
///
/// Implementations must not interpret status codes: a non-2xx response is still `Ok(ApiReply)`.
/// Only failures to obtain a response at all (connection refused, timeout, ...) are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiReply>;
}

/// reqwest-backed transport bound to a base URL.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    /// Build a transport from the startup configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] if the underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> ClientResult<ApiReply> {
        let url = self.config.url_for(&request.path);
        let mut builder = self.http.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = self.config.api_token() {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(payload) => builder.multipart(to_reqwest_form(payload)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Transport(Box::new(e)))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(Box::new(e)))?;

        Ok(ApiReply { status, body })
    }
}

fn to_reqwest_form(payload: MultipartPayload) -> ClientResult<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for part in payload.parts().iter().cloned() {
        form = match part {
            Part::Text { name, value } => form.text(name, value),
            Part::File { name, attachment } => {
                let file_part = reqwest::multipart::Part::bytes(attachment.bytes().to_vec())
                    .file_name(attachment.file_name().to_owned())
                    .mime_str(attachment.media_type())
                    .map_err(|e| {
                        ClientError::Encode(format!(
                            "invalid media type `{}` for {}: {e}",
                            attachment.media_type(),
                            attachment.file_name()
                        ))
                    })?;
                form.part(name, file_part)
            }
        };
    }
    Ok(form)
}
