//! Shared HTTP plumbing behind every resource client.

use crate::clients::{
    AppointmentApi, DrugApi, HospitalApi, LecturerApi, MedicalRecordApi, OrderApi, PatientApi,
    PredictApi,
};
use crate::config::ClientConfig;
use crate::envelope::{decode_envelope, error_message, ApiResponse};
use crate::payload::{encode_payload, Payload};
use crate::transport::{ApiRequest, HttpTransport, Transport};
use crate::{ClientError, ClientResult};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Target id plus body of an update. The id only ever appears in the path.
#[derive(Clone, Debug, PartialEq)]
pub struct Update<B> {
    pub id: i64,
    pub body: B,
}

impl<B> Update<B> {
    pub fn new(id: i64, body: B) -> Self {
        Self { id, body }
    }
}

/// Target id plus new state of a status transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusChange<S> {
    pub id: i64,
    pub status: S,
}

impl<S> StatusChange<S> {
    pub fn new(id: i64, status: S) -> Self {
        Self { id, status }
    }
}

/// Cheap, clonable handle on a transport. All resource clients share one.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Build a client over the reqwest transport.
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    /// Send `request` and return the decoded envelope.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] for a 404, carrying the backend's message
    /// - [`ClientError::Api`] for any other non-2xx status
    /// - [`ClientError::Decode`] if a 2xx body does not match `ApiResponse<T>`
    /// - whatever the transport reports when no response was obtained
    pub async fn call_envelope<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> ClientResult<ApiResponse<T>> {
        let method = request.method.clone();
        let path = request.path.clone();
        tracing::debug!(%method, %path, "sending request");

        let reply = self.transport.send(request).await?;
        if !reply.is_success() {
            let message = error_message(reply.status, &reply.body);
            tracing::warn!(%method, %path, status = reply.status, %message, "request failed");
            return Err(if reply.status == 404 {
                ClientError::NotFound { message }
            } else {
                ClientError::Api {
                    status: reply.status,
                    message,
                }
            });
        }

        decode_envelope(&reply.body)
    }

    /// Send `request` and return only the envelope's `data`.
    pub async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        Ok(self.call_envelope(request).await?.data)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: String,
        query: Vec<(String, String)>,
    ) -> ClientResult<T> {
        self.call(ApiRequest::get(path).with_query(query)).await
    }

    pub(crate) async fn send_body<T: DeserializeOwned, P: Payload>(
        &self,
        request: ApiRequest,
        body: &P,
    ) -> ClientResult<T> {
        let body = encode_payload(body)?;
        self.call(request.with_body(body)).await
    }

    pub(crate) async fn delete(&self, path: String) -> ClientResult<()> {
        self.call::<Option<serde::de::IgnoredAny>>(ApiRequest::delete(path))
            .await
            .map(|_| ())
    }

    pub fn appointments(&self) -> AppointmentApi {
        AppointmentApi::new(self.clone())
    }

    pub fn drugs(&self) -> DrugApi {
        DrugApi::new(self.clone())
    }

    pub fn hospitals(&self) -> HospitalApi {
        HospitalApi::new(self.clone())
    }

    pub fn lecturers(&self) -> LecturerApi {
        LecturerApi::new(self.clone())
    }

    pub fn medical_records(&self) -> MedicalRecordApi {
        MedicalRecordApi::new(self.clone())
    }

    pub fn orders(&self) -> OrderApi {
        OrderApi::new(self.clone())
    }

    pub fn patients(&self) -> PatientApi {
        PatientApi::new(self.clone())
    }

    pub fn predict(&self) -> PredictApi {
        PredictApi::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Thing {
        id: i64,
    }

    #[tokio::test]
    async fn test_not_found_keeps_backend_message() {
        let transport = RecordingTransport::new();
        transport.reply_error(404, "Drug with id 9 not found");
        let err = transport
            .client()
            .call::<Thing>(ApiRequest::get("/hospital/drugs/9"))
            .await
            .unwrap_err();
        match err {
            ClientError::NotFound { message } => assert_eq!(message, "Drug with id 9 not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_other_status_is_api_error() {
        let transport = RecordingTransport::new();
        transport.reply_error(409, "appointment already completed");
        let err = transport
            .client()
            .call::<Thing>(ApiRequest::get("/x"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_accepts_null_data() {
        let transport = RecordingTransport::new();
        transport.reply_ok(serde_json::Value::Null);
        transport.client().delete("/x/1".into()).await.unwrap();
        assert_eq!(transport.requests()[0].method, reqwest::Method::DELETE);
    }

    #[tokio::test]
    async fn test_decode_error_names_field() {
        let transport = RecordingTransport::new();
        transport.reply_ok(serde_json::json!({ "id": "seven" }));
        let err = transport
            .client()
            .call::<Thing>(ApiRequest::get("/x"))
            .await
            .unwrap_err();
        match err {
            ClientError::Decode { path, .. } => assert_eq!(path, "data.id"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
