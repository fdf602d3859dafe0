use crate::client::{ApiClient, Update};
use crate::constants::LECTURERS_PATH;
use crate::models::{Lecturer, LecturerBody, LecturerFilters};
use crate::payload::ListFilters;
use crate::transport::ApiRequest;
use crate::ClientResult;

#[derive(Clone, Debug)]
pub struct LecturerApi {
    client: ApiClient,
}

impl LecturerApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filters: &LecturerFilters) -> ClientResult<Vec<Lecturer>> {
        self.client
            .get(LECTURERS_PATH.to_owned(), filters.query_params().into_pairs())
            .await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Lecturer> {
        self.client
            .get(format!("{LECTURERS_PATH}/{id}"), Vec::new())
            .await
    }

    pub async fn create(&self, body: &LecturerBody) -> ClientResult<Lecturer> {
        self.client
            .send_body(ApiRequest::post(LECTURERS_PATH), body)
            .await
    }

    /// Lecturers are updated with `PATCH`, unlike the other resources.
    pub async fn update(&self, update: &Update<LecturerBody>) -> ClientResult<Lecturer> {
        self.client
            .send_body(
                ApiRequest::patch(format!("{LECTURERS_PATH}/{}", update.id)),
                &update.body,
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.client.delete(format!("{LECTURERS_PATH}/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use crate::transport::Method;
    use clinic_types::{EmailAddress, NonEmptyText};
    use serde_json::json;

    #[tokio::test]
    async fn test_update_uses_patch() {
        let transport = RecordingTransport::new();
        transport.reply_ok(json!({
            "lecturer_id": 3,
            "full_name": "Dr. Tran",
            "email": "tran@uni.edu",
            "specialization": "Glaucoma",
            "created_at": "2026-10-01T00:00:00Z",
            "updated_at": "2026-10-02T00:00:00Z"
        }));
        let body = LecturerBody {
            full_name: NonEmptyText::new("Dr. Tran").unwrap(),
            email: EmailAddress::parse("tran@uni.edu").unwrap(),
            phone: None,
            specialization: NonEmptyText::new("Glaucoma").unwrap(),
            academic_title: None,
            bio: None,
            avatar: None,
        };
        transport
            .client()
            .lecturers()
            .update(&Update::new(3, body))
            .await
            .unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.path, "/lecturers/3");
    }
}
