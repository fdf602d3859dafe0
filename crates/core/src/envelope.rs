//! The `{status, message, data}` envelope wrapped around every JSON response.

use crate::{ClientError, ClientResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Response envelope returned by every backend endpoint.
///
/// `data` is a single resource, a list of resources, or `null` for delete outcomes (decode those
/// as `ApiResponse<()>`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(status: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            status,
            message: message.into(),
            data,
        }
    }
}

/// Decode a successful response body into an envelope.
///
/// This uses `serde_path_to_error` so a schema mismatch names the failing field (for example
/// `data.0.price`) instead of only a line/column.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] if the body is not JSON or does not match the envelope of `T`.
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> ClientResult<ApiResponse<T>> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize::<_, ApiResponse<T>>(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let path = if path.is_empty() || path == "." {
            "<root>".to_owned()
        } else {
            path
        };
        ClientError::Decode {
            path,
            message: err.into_inner().to_string(),
        }
    })
}

/// Best-effort extraction of the backend's message from an error response body.
///
/// Prefers the envelope `message`, then the raw body text, then the canonical reason phrase for
/// `status`.
pub fn error_message(status: u16, body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        message: Option<String>,
    }

    if let Ok(ErrorEnvelope { message: Some(m) }) = serde_json::from_slice::<ErrorEnvelope>(body) {
        if !m.trim().is_empty() {
            return m;
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_owned();
    }

    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("unknown error")
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
        price: f64,
    }

    #[test]
    fn test_decode_envelope_with_list() {
        let body = br#"{"status":200,"message":"ok","data":[{"id":1,"price":2.5}]}"#;
        let env = decode_envelope::<Vec<Item>>(body).unwrap();
        assert_eq!(env.status, 200);
        assert_eq!(env.data, vec![Item { id: 1, price: 2.5 }]);
    }

    #[test]
    fn test_decode_envelope_null_data_as_unit() {
        let body = br#"{"status":200,"message":"deleted","data":null}"#;
        let env = decode_envelope::<()>(body).unwrap();
        assert_eq!(env.message, "deleted");
    }

    #[test]
    fn test_decode_envelope_reports_field_path() {
        let body = br#"{"status":200,"message":"ok","data":[{"id":1,"price":"free"}]}"#;
        let err = decode_envelope::<Vec<Item>>(body).unwrap_err();
        match err {
            ClientError::Decode { path, .. } => assert_eq!(path, "data[0].price"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_message_prefers_envelope() {
        let body = br#"{"status":404,"message":"Drug 9 not found","data":null}"#;
        assert_eq!(error_message(404, body), "Drug 9 not found");
    }

    #[test]
    fn test_error_message_falls_back_to_reason() {
        assert_eq!(error_message(502, b""), "Bad Gateway");
        assert_eq!(error_message(500, b"  boom "), "boom");
    }
}
