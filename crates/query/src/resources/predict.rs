use crate::{Mutation, QueryCache};
use clinic_core::clients::PredictApi;
use clinic_core::models::PredictionResult;
use clinic_core::schema::PredictForm;

/// Predictions are never cached: each upload is a one-off mutation.
#[derive(Clone, Debug)]
pub struct PredictQueries {
    cache: QueryCache,
    api: PredictApi,
}

impl PredictQueries {
    pub fn new(cache: QueryCache, api: PredictApi) -> Self {
        Self { cache, api }
    }

    pub fn predict(&self) -> Mutation<PredictForm, PredictionResult> {
        let api = self.api.clone();
        Mutation::new(self.cache.clone(), move |form: PredictForm| {
            let api = api.clone();
            async move { api.predict(&form).await }
        })
    }
}
