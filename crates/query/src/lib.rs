//! # Clinic Query
//!
//! Keyed client-side cache and query/mutation adapters over the `clinic-core` resource
//! clients.
//!
//! - [`QueryKey`]: structural keys, `(resource kind, parts...)`, with prefix matching
//! - [`QueryCache`]: the process-wide cache, changed only by successful fetches and explicit
//!   invalidation or removal
//! - [`Query`]: a key bound to a fetcher, with stale-while-revalidate reads and abort on last
//!   unsubscribe
//! - [`Mutation`]: a write with explicit invalidation and success/error hooks
//!
//! [`Queries`] bundles one cache with the adapters of every resource.

#![warn(rust_2018_idioms)]

mod cache;
mod error;
mod key;
mod mutation;
mod query;
pub mod resources;

pub use cache::QueryCache;
pub use error::{QueryError, QueryResult, SubmitError};
pub use key::{KeyPart, QueryKey, ResourceKind};
pub use mutation::{Mutation, MutationPhase, MutationStatus};
pub use query::{Query, QueryState, Subscription};

use clinic_core::ApiClient;
use resources::{
    AppointmentQueries, DrugQueries, HospitalQueries, LecturerQueries, MedicalRecordQueries,
    OrderQueries, PatientQueries, PredictQueries,
};

/// One cache plus the adapters of every resource, all sharing one client.
#[derive(Clone, Debug)]
pub struct Queries {
    cache: QueryCache,
    client: ApiClient,
}

impl Queries {
    pub fn new(client: ApiClient) -> Self {
        Self::with_cache(client, QueryCache::new())
    }

    pub fn with_cache(client: ApiClient, cache: QueryCache) -> Self {
        Self { cache, client }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn appointments(&self) -> AppointmentQueries {
        AppointmentQueries::new(self.cache.clone(), self.client.appointments())
    }

    pub fn drugs(&self) -> DrugQueries {
        DrugQueries::new(self.cache.clone(), self.client.drugs())
    }

    pub fn hospitals(&self) -> HospitalQueries {
        HospitalQueries::new(self.cache.clone(), self.client.hospitals())
    }

    pub fn lecturers(&self) -> LecturerQueries {
        LecturerQueries::new(self.cache.clone(), self.client.lecturers())
    }

    pub fn medical_records(&self) -> MedicalRecordQueries {
        MedicalRecordQueries::new(self.cache.clone(), self.client.medical_records())
    }

    pub fn orders(&self) -> OrderQueries {
        OrderQueries::new(self.cache.clone(), self.client.orders())
    }

    pub fn patients(&self) -> PatientQueries {
        PatientQueries::new(self.cache.clone(), self.client.patients())
    }

    pub fn predict(&self) -> PredictQueries {
        PredictQueries::new(self.cache.clone(), self.client.predict())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::models::{DrugFilters, HospitalFilters};
    use clinic_core::testing::RecordingTransport;
    use serde_json::json;

    fn drug(id: i64) -> serde_json::Value {
        json!({
            "drug_id": id,
            "name": format!("Drug {id}"),
            "price": 10.0,
            "unit": "box",
            "category": "TABLET",
            "created_at": "2026-10-01T00:00:00Z",
            "updated_at": "2026-10-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_delete_invalidates_then_list_refetches() {
        let transport = RecordingTransport::new();
        let queries = Queries::new(transport.client());
        let drugs = queries.drugs();
        let list = drugs.list(DrugFilters::default());

        transport.reply_ok(json!([drug(1), drug(2)]));
        assert_eq!(list.fetch().await.data.map(|d| d.len()), Some(2));

        transport.reply_ok(serde_json::Value::Null);
        drugs.delete().mutate(1).await.unwrap();
        assert!(list.state().is_stale);

        transport.reply_ok(json!([drug(2)]));
        let state = list.fetch().await;
        let remaining: Vec<i64> = state.data.unwrap().iter().map(|d| d.drug_id).collect();
        assert_eq!(remaining, vec![2]);
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_writes_leave_other_resources_fresh() {
        let transport = RecordingTransport::new();
        let queries = Queries::new(transport.client());

        transport.reply_ok(json!([]));
        let hospitals = queries.hospitals().list(HospitalFilters::default());
        hospitals.fetch().await;

        transport.reply_ok(serde_json::Value::Null);
        queries.drugs().delete().mutate(5).await.unwrap();

        assert!(!hospitals.state().is_stale);
        hospitals.fetch().await;
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_detail_without_id_is_disabled() {
        let transport = RecordingTransport::new();
        let queries = Queries::new(transport.client());
        let state = queries.patients().by_user(None).fetch().await;
        assert!(state.data.is_none() && !state.is_error);
        assert_eq!(transport.request_count(), 0);
    }
}
