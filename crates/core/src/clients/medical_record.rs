use crate::client::{ApiClient, Update};
use crate::constants::{FULL_RECORDS_PATH, MEDICAL_RECORDS_PATH};
use crate::models::{
    FullRecordBody, MedicalRecord, MedicalRecordFilters, RecordCheck, RecordInitBody,
};
use crate::payload::ListFilters;
use crate::transport::ApiRequest;
use crate::ClientResult;

/// Medical records live under two base paths: plain record management under
/// `/hospital/medical_records`, and the full create/complete flow with attachments under
/// `/hospital/full-records`.
#[derive(Clone, Debug)]
pub struct MedicalRecordApi {
    client: ApiClient,
}

impl MedicalRecordApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filters: &MedicalRecordFilters) -> ClientResult<Vec<MedicalRecord>> {
        self.client
            .get(
                MEDICAL_RECORDS_PATH.to_owned(),
                filters.query_params().into_pairs(),
            )
            .await
    }

    pub async fn get(&self, id: i64) -> ClientResult<MedicalRecord> {
        self.client
            .get(format!("{MEDICAL_RECORDS_PATH}/{id}"), Vec::new())
            .await
    }

    /// Open a draft record for an appointment.
    pub async fn init(&self, body: &RecordInitBody) -> ClientResult<MedicalRecord> {
        self.client
            .send_body(
                ApiRequest::post(format!("{MEDICAL_RECORDS_PATH}/init")),
                body,
            )
            .await
    }

    /// Whether `appointment_id` already has a record.
    pub async fn check(&self, appointment_id: i64) -> ClientResult<RecordCheck> {
        self.client
            .get(
                format!("{MEDICAL_RECORDS_PATH}/check"),
                vec![("appointment_id".to_owned(), appointment_id.to_string())],
            )
            .await
    }

    pub async fn create_full(&self, body: &FullRecordBody) -> ClientResult<MedicalRecord> {
        self.client
            .send_body(ApiRequest::post(FULL_RECORDS_PATH), body)
            .await
    }

    /// Complete an existing (usually draft) record.
    pub async fn complete_full(
        &self,
        update: &Update<FullRecordBody>,
    ) -> ClientResult<MedicalRecord> {
        self.client
            .send_body(
                ApiRequest::put(format!("{FULL_RECORDS_PATH}/{}", update.id)),
                &update.body,
            )
            .await
    }

    pub async fn patient_history(&self, patient_id: i64) -> ClientResult<Vec<MedicalRecord>> {
        self.client
            .get(format!("{FULL_RECORDS_PATH}/patient/{patient_id}"), Vec::new())
            .await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.client
            .delete(format!("{MEDICAL_RECORDS_PATH}/{id}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::{Attachment, TaggedAttachment};
    use crate::models::{PrescriptionItem, RecordFileType, RecordStatus};
    use crate::testing::RecordingTransport;
    use crate::transport::RequestBody;
    use clinic_types::NonEmptyText;
    use serde_json::json;

    fn record_json(id: i64) -> serde_json::Value {
        json!({
            "record_id": id,
            "patient_id": 1,
            "doctor_id": 2,
            "appointment_id": 5,
            "diagnosis": "Open-angle glaucoma",
            "status": "COMPLETED",
            "prescription": [],
            "attachments": [
                { "file_url": "/uploads/1.jpg", "file_type": "FUNDUS" }
            ],
            "created_at": "2026-10-01T00:00:00Z",
            "updated_at": "2026-10-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_check_sends_appointment_id_query() {
        let transport = RecordingTransport::new();
        transport.reply_ok(json!({ "exists": true, "record_id": 3 }));
        let check = transport.client().medical_records().check(5).await.unwrap();
        assert_eq!(
            check,
            RecordCheck {
                exists: true,
                record_id: Some(3)
            }
        );
        let request = &transport.requests()[0];
        assert_eq!(request.path, "/hospital/medical_records/check");
        assert_eq!(request.query_value("appointment_id"), Some("5"));
    }

    #[tokio::test]
    async fn test_complete_full_sends_tagged_files_and_json_prescription() {
        let transport = RecordingTransport::new();
        transport.reply_ok(record_json(3));
        let body = FullRecordBody {
            patient_id: 1,
            doctor_id: 2,
            appointment_id: Some(5),
            diagnosis: NonEmptyText::new("Open-angle glaucoma").unwrap(),
            symptoms: None,
            treatment: None,
            notes: None,
            prescription: vec![PrescriptionItem {
                drug_id: 3,
                dosage: "1 drop".into(),
                frequency: "nightly".into(),
                duration_days: 30,
                quantity: 1,
            }],
            files: vec![
                TaggedAttachment::new(
                    Attachment::new("left.jpg", "image/jpeg", vec![1u8]),
                    RecordFileType::Fundus,
                ),
                TaggedAttachment::new(
                    Attachment::new("scan.pdf", "application/pdf", vec![2u8]),
                    RecordFileType::Oct,
                ),
            ],
        };

        let record = transport
            .client()
            .medical_records()
            .complete_full(&Update::new(3, body))
            .await
            .unwrap();
        assert_eq!(record.status, RecordStatus::Completed);

        let request = &transport.requests()[0];
        assert_eq!(request.path, "/hospital/full-records/3");
        let RequestBody::Multipart(payload) = &request.body else {
            panic!("expected multipart body");
        };
        assert_eq!(payload.files("files").len(), 2);
        assert_eq!(payload.text("file_types"), Some("FUNDUS,OCT"));
        let prescription: serde_json::Value =
            serde_json::from_str(payload.text("prescription").unwrap()).unwrap();
        assert_eq!(prescription[0]["drug_id"], 3);
        assert!(payload.text("symptoms").is_none());
    }
}
