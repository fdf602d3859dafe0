use super::{detail_key, list_key};
use crate::key::{QueryKey, ResourceKind};
use crate::{Mutation, Query, QueryCache};
use clinic_core::clients::MedicalRecordApi;
use clinic_core::models::{
    FullRecordBody, MedicalRecord, MedicalRecordFilters, RecordCheck, RecordInitBody,
};
use clinic_core::Update;

const KIND: ResourceKind = ResourceKind::MedicalRecords;

/// Record writes also invalidate appointments, whose state follows their record.
#[derive(Clone, Debug)]
pub struct MedicalRecordQueries {
    cache: QueryCache,
    api: MedicalRecordApi,
}

impl MedicalRecordQueries {
    pub fn new(cache: QueryCache, api: MedicalRecordApi) -> Self {
        Self { cache, api }
    }

    pub fn all_key() -> QueryKey {
        QueryKey::kind(KIND)
    }

    pub fn list_key(filters: &MedicalRecordFilters) -> QueryKey {
        list_key(KIND, filters)
    }

    pub fn detail_key(id: i64) -> QueryKey {
        detail_key(KIND, id)
    }

    pub fn check_key(appointment_id: i64) -> QueryKey {
        QueryKey::kind(KIND).text("check").id(appointment_id)
    }

    pub fn history_key(patient_id: i64) -> QueryKey {
        QueryKey::kind(KIND).text("patient").id(patient_id)
    }

    fn write_prefixes() -> [QueryKey; 2] {
        [
            Self::all_key(),
            QueryKey::kind(ResourceKind::Appointments),
        ]
    }

    pub fn list(&self, filters: MedicalRecordFilters) -> Query<Vec<MedicalRecord>> {
        let api = self.api.clone();
        Query::new(self.cache.clone(), Some(Self::list_key(&filters)), move || {
            let api = api.clone();
            let filters = filters.clone();
            async move { api.list(&filters).await }
        })
    }

    pub fn detail(&self, id: Option<i64>) -> Query<MedicalRecord> {
        let Some(id) = id else {
            return Query::disabled(self.cache.clone());
        };
        let api = self.api.clone();
        Query::new(self.cache.clone(), Some(Self::detail_key(id)), move || {
            let api = api.clone();
            async move { api.get(id).await }
        })
    }

    pub fn check(&self, appointment_id: Option<i64>) -> Query<RecordCheck> {
        let Some(appointment_id) = appointment_id else {
            return Query::disabled(self.cache.clone());
        };
        let api = self.api.clone();
        Query::new(
            self.cache.clone(),
            Some(Self::check_key(appointment_id)),
            move || {
                let api = api.clone();
                async move { api.check(appointment_id).await }
            },
        )
    }

    pub fn patient_history(&self, patient_id: Option<i64>) -> Query<Vec<MedicalRecord>> {
        let Some(patient_id) = patient_id else {
            return Query::disabled(self.cache.clone());
        };
        let api = self.api.clone();
        Query::new(
            self.cache.clone(),
            Some(Self::history_key(patient_id)),
            move || {
                let api = api.clone();
                async move { api.patient_history(patient_id).await }
            },
        )
    }

    pub fn init(&self) -> Mutation<RecordInitBody, MedicalRecord> {
        let api = self.api.clone();
        Mutation::new(self.cache.clone(), move |body: RecordInitBody| {
            let api = api.clone();
            async move { api.init(&body).await }
        })
        .invalidates(Self::write_prefixes())
    }

    pub fn create_full(&self) -> Mutation<FullRecordBody, MedicalRecord> {
        let api = self.api.clone();
        Mutation::new(self.cache.clone(), move |body: FullRecordBody| {
            let api = api.clone();
            async move { api.create_full(&body).await }
        })
        .invalidates(Self::write_prefixes())
    }

    pub fn complete_full(&self) -> Mutation<Update<FullRecordBody>, MedicalRecord> {
        let api = self.api.clone();
        Mutation::new(self.cache.clone(), move |update: Update<FullRecordBody>| {
            let api = api.clone();
            async move { api.complete_full(&update).await }
        })
        .invalidates(Self::write_prefixes())
    }

    pub fn delete(&self) -> Mutation<i64, ()> {
        let api = self.api.clone();
        Mutation::new(self.cache.clone(), move |id: i64| {
            let api = api.clone();
            async move { api.delete(id).await }
        })
        .invalidates(Self::write_prefixes())
        .on_success(|_, id, cache| {
            cache.remove(&Self::detail_key(*id));
        })
    }
}
