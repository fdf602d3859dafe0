use crate::client::ApiClient;
use crate::constants::PREDICT_PATH;
use crate::models::PredictionResult;
use crate::payload::MultipartPayload;
use crate::schema::PredictForm;
use crate::transport::{ApiRequest, RequestBody};
use crate::{ClientError, ClientResult};

/// Retinal image classification.
#[derive(Clone, Debug)]
pub struct PredictApi {
    client: ApiClient,
}

impl PredictApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Upload the image and return the ranked labels.
    ///
    /// # Errors
    ///
    /// Besides the usual client errors, returns [`ClientError::InvalidResponse`] if the backend
    /// answers with more than `top_k` predictions or a `top1` that is not a best entry.
    pub async fn predict(&self, form: &PredictForm) -> ClientResult<PredictionResult> {
        let mut payload = MultipartPayload::new();
        payload.push_file("image", form.image.clone());

        let request = ApiRequest::post(PREDICT_PATH)
            .with_query(vec![("top_k".to_owned(), form.top_k.to_string())])
            .with_body(RequestBody::Multipart(payload));
        let result: PredictionResult = self.client.call(request).await?;

        result
            .check(form.top_k)
            .map_err(ClientError::InvalidResponse)?;
        Ok(result.ranked())
    }
}
