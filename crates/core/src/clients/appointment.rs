use crate::client::{ApiClient, StatusChange};
use crate::constants::APPOINTMENTS_PATH;
use crate::models::{
    Appointment, AppointmentFilters, AppointmentStatus, FollowUpBody, StatusBody,
};
use crate::payload::ListFilters;
use crate::transport::ApiRequest;
use crate::ClientResult;

/// Appointments are booked elsewhere; this client reads them, moves them through their status
/// lifecycle and books follow-ups.
#[derive(Clone, Debug)]
pub struct AppointmentApi {
    client: ApiClient,
}

impl AppointmentApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filters: &AppointmentFilters) -> ClientResult<Vec<Appointment>> {
        self.client
            .get(
                APPOINTMENTS_PATH.to_owned(),
                filters.query_params().into_pairs(),
            )
            .await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Appointment> {
        self.client
            .get(format!("{APPOINTMENTS_PATH}/{id}"), Vec::new())
            .await
    }

    pub async fn by_patient(&self, patient_id: i64) -> ClientResult<Vec<Appointment>> {
        self.client
            .get(format!("{APPOINTMENTS_PATH}/patient/{patient_id}"), Vec::new())
            .await
    }

    pub async fn by_doctor(&self, doctor_id: i64) -> ClientResult<Vec<Appointment>> {
        self.client
            .get(format!("{APPOINTMENTS_PATH}/doctor/{doctor_id}"), Vec::new())
            .await
    }

    /// Online (video) appointments.
    pub async fn online(&self) -> ClientResult<Vec<Appointment>> {
        self.client
            .get(format!("{APPOINTMENTS_PATH}/online"), Vec::new())
            .await
    }

    /// Appointments scheduled for the backend's current day.
    pub async fn today(&self) -> ClientResult<Vec<Appointment>> {
        self.client
            .get(format!("{APPOINTMENTS_PATH}/today"), Vec::new())
            .await
    }

    pub async fn update_status(
        &self,
        change: StatusChange<AppointmentStatus>,
    ) -> ClientResult<Appointment> {
        self.client
            .send_body(
                ApiRequest::put(format!("{APPOINTMENTS_PATH}/{}/status", change.id)),
                &StatusBody {
                    status: change.status,
                },
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.client.delete(format!("{APPOINTMENTS_PATH}/{id}")).await
    }

    pub async fn create_follow_up(&self, body: &FollowUpBody) -> ClientResult<Appointment> {
        self.client
            .send_body(
                ApiRequest::post(format!("{APPOINTMENTS_PATH}/follow-up")),
                body,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentType;
    use crate::testing::RecordingTransport;
    use crate::transport::{Method, RequestBody};
    use serde_json::json;

    fn appointment(id: i64, status: &str) -> serde_json::Value {
        json!({
            "appointment_id": id,
            "patient_id": 1,
            "doctor_id": 2,
            "scheduled_at": "2026-10-17T02:00:00Z",
            "appointment_type": "OFFLINE",
            "status": status,
            "created_at": "2026-10-01T00:00:00Z",
            "updated_at": "2026-10-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_list_sends_only_present_filters() {
        let transport = RecordingTransport::new();
        transport.reply_ok(json!([appointment(1, "PENDING")]));
        let api = transport.client().appointments();

        let filters = AppointmentFilters {
            status: Some(AppointmentStatus::Pending),
            doctor_id: Some(2),
            ..Default::default()
        };
        let list = api.list(&filters).await.unwrap();
        assert_eq!(list.len(), 1);

        let request = &transport.requests()[0];
        assert_eq!(request.path, "/hospital/appointments");
        assert_eq!(
            request.query,
            vec![
                ("status".to_owned(), "PENDING".to_owned()),
                ("doctor_id".to_owned(), "2".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn test_update_status_puts_status_only() {
        let transport = RecordingTransport::new();
        transport.reply_ok(appointment(4, "CONFIRMED"));
        let api = transport.client().appointments();

        let updated = api
            .update_status(StatusChange::new(4, AppointmentStatus::Confirmed))
            .await
            .unwrap();
        assert_eq!(updated.status, AppointmentStatus::Confirmed);

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.path, "/hospital/appointments/4/status");
        assert_eq!(request.body, RequestBody::Json(json!({ "status": "CONFIRMED" })));
    }

    #[tokio::test]
    async fn test_follow_up_and_named_views() {
        let transport = RecordingTransport::new();
        let mut follow_up = appointment(9, "PENDING");
        follow_up["parent_appointment_id"] = json!(4);
        transport.reply_ok(follow_up);
        transport.reply_ok(json!([]));
        transport.reply_ok(json!([]));
        let api = transport.client().appointments();

        let created = api
            .create_follow_up(&FollowUpBody {
                appointment_id: 4,
                scheduled_at: "2026-11-01T02:00:00Z".parse().unwrap(),
                appointment_type: AppointmentType::Online,
                reason: None,
                notes: Some("check pressure".into()),
            })
            .await
            .unwrap();
        assert_eq!(created.parent_appointment_id, Some(4));
        api.today().await.unwrap();
        api.by_doctor(2).await.unwrap();

        let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec![
                "/hospital/appointments/follow-up",
                "/hospital/appointments/today",
                "/hospital/appointments/doctor/2",
            ]
        );
        match &transport.requests()[0].body {
            RequestBody::Json(body) => assert!(body.get("reason").is_none()),
            other => panic!("expected JSON body, got {other:?}"),
        }
    }
}
