use super::{detail_key, list_key};
use crate::key::{QueryKey, ResourceKind};
use crate::{Mutation, Query, QueryCache};
use clinic_core::clients::DrugApi;
use clinic_core::models::{Drug, DrugBody, DrugFilters};
use clinic_core::Update;

const KIND: ResourceKind = ResourceKind::Drugs;

#[derive(Clone, Debug)]
pub struct DrugQueries {
    cache: QueryCache,
    api: DrugApi,
}

impl DrugQueries {
    pub fn new(cache: QueryCache, api: DrugApi) -> Self {
        Self { cache, api }
    }

    pub fn all_key() -> QueryKey {
        QueryKey::kind(KIND)
    }

    pub fn list_key(filters: &DrugFilters) -> QueryKey {
        list_key(KIND, filters)
    }

    pub fn detail_key(id: i64) -> QueryKey {
        detail_key(KIND, id)
    }

    pub fn list(&self, filters: DrugFilters) -> Query<Vec<Drug>> {
        let api = self.api.clone();
        let key = Self::list_key(&filters);
        Query::new(self.cache.clone(), Some(key), move || {
            let api = api.clone();
            let filters = filters.clone();
            async move { api.list(&filters).await }
        })
    }

    /// Disabled until `id` is known.
    pub fn detail(&self, id: Option<i64>) -> Query<Drug> {
        let Some(id) = id else {
            return Query::disabled(self.cache.clone());
        };
        let api = self.api.clone();
        Query::new(self.cache.clone(), Some(Self::detail_key(id)), move || {
            let api = api.clone();
            async move { api.get(id).await }
        })
    }

    pub fn create(&self) -> Mutation<DrugBody, Drug> {
        let api = self.api.clone();
        Mutation::new(self.cache.clone(), move |body: DrugBody| {
            let api = api.clone();
            async move { api.create(&body).await }
        })
        .invalidates([Self::all_key()])
    }

    pub fn update(&self) -> Mutation<Update<DrugBody>, Drug> {
        let api = self.api.clone();
        Mutation::new(self.cache.clone(), move |update: Update<DrugBody>| {
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
