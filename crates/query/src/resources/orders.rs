use super::{detail_key, list_key};
use crate::key::{QueryKey, ResourceKind};
use crate::{Mutation, Query, QueryCache};
use clinic_core::clients::OrderApi;
use clinic_core::models::{Order, OrderFilters, OrderStatus};
use clinic_core::StatusChange;

const KIND: ResourceKind = ResourceKind::Orders;

#[derive(Clone, Debug)]
pub struct OrderQueries {
    cache: QueryCache,
    api: OrderApi,
}

impl OrderQueries {
    pub fn new(cache: QueryCache, api: OrderApi) -> Self {
        Self { cache, api }
    }

    pub fn all_key() -> QueryKey {
        QueryKey::kind(KIND)
    }

    pub fn list_key(filters: &OrderFilters) -> QueryKey {
        list_key(KIND, filters)
    }

    pub fn detail_key(id: i64) -> QueryKey {
        detail_key(KIND, id)
    }

    pub fn by_patient_key(patient_id: i64) -> QueryKey {
        QueryKey::kind(KIND).text("patient").id(patient_id)
    }

    pub fn list(&self, filters: OrderFilters) -> Query<Vec<Order>> {
        let api = self.api.clone();
        Query::new(self.cache.clone(), Some(Self::list_key(&filters)), move || {
            let api = api.clone();
            let filters = filters.clone();
            async move { api.list(&filters).await }
        })
    }

    pub fn detail(&self, id: Option<i64>) -> Query<Order> {
        let Some(id) = id else {
            return Query::disabled(self.cache.clone());
        };
        let api = self.api.clone();
        Query::new(self.cache.clone(), Some(Self::detail_key(id)), move || {
            let api = api.clone();
            async move { api.get(id).await }
        })
    }

    pub fn by_patient(&self, patient_id: Option<i64>) -> Query<Vec<Order>> {
        let Some(patient_id) = patient_id else {
            return Query::disabled(self.cache.clone());
        };
        let api = self.api.clone();
        Query::new(
            self.cache.clone(),
            Some(Self::by_patient_key(patient_id)),
            move || {
                let api = api.clone();
                async move { api.by_patient(patient_id).await }
            },
        )
    }

    pub fn update_status(&self) -> Mutation<StatusChange<OrderStatus>, Order> {
        let api = self.api.clone();
        Mutation::new(self.cache.clone(), move |change: StatusChange<OrderStatus>| {
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
}
