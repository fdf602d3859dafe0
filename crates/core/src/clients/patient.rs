use crate::client::{ApiClient, Update};
use crate::constants::PATIENTS_PATH;
use crate::models::{Patient, PatientBody, PatientFilters};
use crate::payload::ListFilters;
use crate::transport::ApiRequest;
use crate::ClientResult;

#[derive(Clone, Debug)]
pub struct PatientApi {
    client: ApiClient,
}

impl PatientApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filters: &PatientFilters) -> ClientResult<Vec<Patient>> {
        self.client
            .get(PATIENTS_PATH.to_owned(), filters.query_params().into_pairs())
            .await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Patient> {
        self.client
            .get(format!("{PATIENTS_PATH}/{id}"), Vec::new())
            .await
    }

    /// The patient profile linked to a user account.
    pub async fn by_user(&self, user_id: i64) -> ClientResult<Patient> {
        self.client
            .get(format!("{PATIENTS_PATH}/user/{user_id}"), Vec::new())
            .await
    }

    pub async fn create(&self, body: &PatientBody) -> ClientResult<Patient> {
        self.client
            .send_body(ApiRequest::post(PATIENTS_PATH), body)
            .await
    }

    pub async fn update(&self, update: &Update<PatientBody>) -> ClientResult<Patient> {
        self.client
            .send_body(
                ApiRequest::put(format!("{PATIENTS_PATH}/{}", update.id)),
                &update.body,
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.client.delete(format!("{PATIENTS_PATH}/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;

    #[tokio::test]
    async fn test_by_user_path() {
        let transport = RecordingTransport::new();
        transport.reply_error(404, "No patient profile for user 12");
        let err = transport.client().patients().by_user(12).await.unwrap_err();
        assert_eq!(err.to_string(), "not found: No patient profile for user 12");
        assert_eq!(transport.requests()[0].path, "/patients/user/12");
    }
}
