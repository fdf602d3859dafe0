use super::{detail_key, list_key};
use crate::key::{QueryKey, ResourceKind};
use crate::{Mutation, Query, QueryCache};
use clinic_core::clients::LecturerApi;
use clinic_core::models::{Lecturer, LecturerBody, LecturerFilters};
use clinic_core::Update;

const KIND: ResourceKind = ResourceKind::Lecturers;

#[derive(Clone, Debug)]
pub struct LecturerQueries {
    cache: QueryCache,
    api: LecturerApi,
}

impl LecturerQueries {
    pub fn new(cache: QueryCache, api: LecturerApi) -> Self {
        Self { cache, api }
    }

    pub fn all_key() -> QueryKey {
        QueryKey::kind(KIND)
    }

    pub fn list_key(filters: &LecturerFilters) -> QueryKey {
        list_key(KIND, filters)
    }

    pub fn detail_key(id: i64) -> QueryKey {
        detail_key(KIND, id)
    }

    pub fn list(&self, filters: LecturerFilters) -> Query<Vec<Lecturer>> {
        let api = self.api.clone();
        let key = Self::list_key(&filters);
        Query::new(self.cache.clone(), Some(key), move || {
            let api = api.clone();
            let filters = filters.clone();
            async move { api.list(&filters).await }
        })
    }

    /// Disabled until `id` is known.
    pub fn detail(&self, id: Option<i64>) -> Query<Lecturer> {
        let Some(id) = id else {
            return Query::disabled(self.cache.clone());
        };
        let api = self.api.clone();
        Query::new(self.cache.clone(), Some(Self::detail_key(id)), move || {
            let api = api.clone();
            async move { api.get(id).await }
        })
    }

    pub fn create(&self) -> Mutation<LecturerBody, Lecturer> {
        let api = self.api.clone();
        Mutation::new(self.cache.clone(), move |body: LecturerBody| {
            let api = api.clone();
            async move { api.create(&body).await }
        })
        .invalidates([Self::all_key()])
    }

    pub fn update(&self) -> Mutation<Update<LecturerBody>, Lecturer> {
        let api = self.api.clone();
        Mutation::new(self.cache.clone(), move |update: Update<LecturerBody>| {
            let api = api.clone();
            async move { api.update(&update).await }
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
}
