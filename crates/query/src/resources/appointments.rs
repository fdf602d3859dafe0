use super::{detail_key, list_key};
use crate::key::{QueryKey, ResourceKind};
use crate::{Mutation, Query, QueryCache};
use clinic_core::clients::AppointmentApi;
use clinic_core::models::{Appointment, AppointmentFilters, AppointmentStatus, FollowUpBody};
use clinic_core::{ClientResult, StatusChange};
use std::future::Future;

const KIND: ResourceKind = ResourceKind::Appointments;

/// Appointment reads plus status and follow-up writes.
#[derive(Clone, Debug)]
pub struct AppointmentQueries {
    cache: QueryCache,
    api: AppointmentApi,
}

impl AppointmentQueries {
    pub fn new(cache: QueryCache, api: AppointmentApi) -> Self {
        Self { cache, api }
    }

    pub fn all_key() -> QueryKey {
        QueryKey::kind(KIND)
    }

    pub fn list_key(filters: &AppointmentFilters) -> QueryKey {
        list_key(KIND, filters)
    }

    pub fn detail_key(id: i64) -> QueryKey {
        detail_key(KIND, id)
    }

    pub fn view_key(view: &str) -> QueryKey {
        QueryKey::kind(KIND).text(view)
    }

    fn query<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Query<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(AppointmentApi) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let api = self.api.clone();
        Query::new(self.cache.clone(), Some(key), move || fetch(api.clone()))
    }

    pub fn list(&self, filters: AppointmentFilters) -> Query<Vec<Appointment>> {
        self.query(Self::list_key(&filters), move |api| {
            let filters = filters.clone();
            async move { api.list(&filters).await }
        })
    }

    pub fn detail(&self, id: Option<i64>) -> Query<Appointment> {
        match id {
            Some(id) => self.query(Self::detail_key(id), move |api| async move {
                api.get(id).await
            }),
            None => Query::disabled(self.cache.clone()),
        }
    }

    pub fn by_patient(&self, patient_id: Option<i64>) -> Query<Vec<Appointment>> {
        match patient_id {
            Some(id) => self.query(Self::view_key("patient").id(id), move |api| async move {
                api.by_patient(id).await
            }),
            None => Query::disabled(self.cache.clone()),
        }
    }

    pub fn by_doctor(&self, doctor_id: Option<i64>) -> Query<Vec<Appointment>> {
        match doctor_id {
            Some(id) => self.query(Self::view_key("doctor").id(id), move |api| async move {
                api.by_doctor(id).await
            }),
            None => Query::disabled(self.cache.clone()),
        }
    }

    pub fn online(&self) -> Query<Vec<Appointment>> {
        self.query(Self::view_key("online"), |api| async move {
            api.online().await
        })
    }

    pub fn today(&self) -> Query<Vec<Appointment>> {
        self.query(Self::view_key("today"), |api| async move { api.today().await })
    }

    pub fn update_status(&self) -> Mutation<StatusChange<AppointmentStatus>, Appointment> {
        let api = self.api.clone();
        Mutation::new(self.cache.clone(), move |change: StatusChange<AppointmentStatus>| {
            let api = api.clone();
            async move { api.update_status(change).await }
        })
        .invalidates([Self::all_key()])
    }

    pub fn delete(&self) -> Mutation<i64, ()> {
        let api = self.api.clone();
        Mutation::new(self.cache.clone(), move |id: i64| {
            let api = api.clone();
            async move { api.delete(id).await }
        })
        .invalidates([Self::all_key()])
        .on_success(|_, id, cache| {
            cache.remove(&Self::detail_key(*id));
        })
    }

    pub fn create_follow_up(&self) -> Mutation<FollowUpBody, Appointment> {
        let api = self.api.clone();
        Mutation::new(self.cache.clone(), move |body: FollowUpBody| {
            let api = api.clone();
            async move { api.create_follow_up(&body).await }
        })
        .invalidates([Self::all_key()])
    }
}
