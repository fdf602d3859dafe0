use crate::client::{ApiClient, Update};
use crate::constants::DRUGS_PATH;
use crate::models::{Drug, DrugBody, DrugFilters};
use crate::payload::ListFilters;
use crate::transport::ApiRequest;
use crate::ClientResult;

#[derive(Clone, Debug)]
pub struct DrugApi {
    client: ApiClient,
}

impl DrugApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filters: &DrugFilters) -> ClientResult<Vec<Drug>> {
        self.client
            .get(DRUGS_PATH.to_owned(), filters.query_params().into_pairs())
            .await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Drug> {
        self.client.get(format!("{DRUGS_PATH}/{id}"), Vec::new()).await
    }

    /// Multipart when `image` is set, JSON otherwise.
    pub async fn create(&self, body: &DrugBody) -> ClientResult<Drug> {
        self.client
            .send_body(ApiRequest::post(DRUGS_PATH), body)
            .await
    }

    pub async fn update(&self, update: &Update<DrugBody>) -> ClientResult<Drug> {
        self.client
            .send_body(
                ApiRequest::put(format!("{DRUGS_PATH}/{}", update.id)),
                &update.body,
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.client.delete(format!("{DRUGS_PATH}/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::Attachment;
    use crate::models::DrugCategory;
    use crate::testing::RecordingTransport;
    use crate::transport::{Method, RequestBody};
    use clinic_types::NonEmptyText;
    use serde_json::json;

    fn drug_json(id: i64, name: &str) -> serde_json::Value {
        json!({
            "drug_id": id,
            "name": name,
            "price": 120000.0,
            "stock_quantity": 5,
            "unit": "bottle",
            "category": "EYE_DROPS",
            "created_at": "2026-10-01T00:00:00Z",
            "updated_at": "2026-10-01T00:00:00Z"
        })
    }

    fn body(image: Option<Attachment>) -> DrugBody {
        DrugBody {
            name: NonEmptyText::new("Atropine").unwrap(),
            description: None,
            price: 120000.0,
            stock_quantity: 5,
            unit: NonEmptyText::new("bottle").unwrap(),
            manufacturer: None,
            category: DrugCategory::EyeDrops,
            image,
        }
    }

    #[tokio::test]
    async fn test_create_without_image_is_json() {
        let transport = RecordingTransport::new();
        transport.reply_ok(drug_json(1, "Atropine"));
        let drug = transport.client().drugs().create(&body(None)).await.unwrap();
        assert_eq!(drug.drug_id, 1);

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/hospital/drugs");
        assert_eq!(request.body.content_type(), Some("application/json"));
        match &request.body {
            RequestBody::Json(value) => {
                assert!(value.get("description").is_none());
                assert!(value.get("image").is_none());
            }
            other => panic!("expected JSON, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_with_image_is_multipart_and_keeps_id_in_path() {
        let transport = RecordingTransport::new();
        transport.reply_ok(drug_json(7, "Atropine"));
        let image = Attachment::new("bottle.png", "image/png", vec![1u8, 2, 3]);
        transport
            .client()
            .drugs()
            .update(&Update::new(7, body(Some(image))))
            .await
            .unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.path, "/hospital/drugs/7");
        match &request.body {
            RequestBody::Multipart(payload) => {
                assert_eq!(payload.text("price"), Some("120000.0"));
                assert_eq!(payload.text("category"), Some("EYE_DROPS"));
                assert!(payload.text("drug_id").is_none());
                assert_eq!(payload.files("image").len(), 1);
            }
            other => panic!("expected multipart, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_is_idempotent() {
        let transport = RecordingTransport::new();
        transport.reply_ok(drug_json(7, "Atropine"));
        transport.reply_ok(drug_json(7, "Atropine"));
        let api = transport.client().drugs();
        let update = Update::new(7, body(None));

        let first = api.update(&update).await.unwrap();
        let second = api.update(&update).await.unwrap();
        assert_eq!(first, second);
        let requests = transport.requests();
        assert_eq!(requests[0], requests[1]);
    }

    #[tokio::test]
    async fn test_get_missing_drug() {
        let transport = RecordingTransport::new();
        transport.reply_error(404, "Drug not found");
        let err = transport.client().drugs().get(42).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(transport.requests()[0].path, "/hospital/drugs/42");
    }
}
