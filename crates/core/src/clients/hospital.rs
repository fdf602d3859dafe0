use crate::client::{ApiClient, Update};
use crate::constants::HOSPITALS_PATH;
use crate::models::{Hospital, HospitalBody, HospitalFilters};
use crate::payload::ListFilters;
use crate::transport::ApiRequest;
use crate::ClientResult;

#[derive(Clone, Debug)]
pub struct HospitalApi {
    client: ApiClient,
}

impl HospitalApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filters: &HospitalFilters) -> ClientResult<Vec<Hospital>> {
        self.client
            .get(HOSPITALS_PATH.to_owned(), filters.query_params().into_pairs())
            .await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Hospital> {
        self.client
            .get(format!("{HOSPITALS_PATH}/{id}"), Vec::new())
            .await
    }

    pub async fn create(&self, body: &HospitalBody) -> ClientResult<Hospital> {
        self.client
            .send_body(ApiRequest::post(HOSPITALS_PATH), body)
            .await
    }

    pub async fn update(&self, update: &Update<HospitalBody>) -> ClientResult<Hospital> {
        self.client
            .send_body(
                ApiRequest::put(format!("{HOSPITALS_PATH}/{}", update.id)),
                &update.body,
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.client.delete(format!("{HOSPITALS_PATH}/{id}")).await
    }
}
