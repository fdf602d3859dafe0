//! The query layer against a live backend: writes invalidate, and the next read refetches.

use api_rest::{build_router, AppState};
use clinic_core::models::{DrugBody, DrugCategory, DrugFilters};
use clinic_core::{ApiClient, ClientConfig, RawForm};
use clinic_query::{Queries, SubmitError};
use std::time::Duration;

async fn queries() -> Queries {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, build_router(AppState::seeded().await)).await });
    let config = ClientConfig::new(format!("http://{addr}"), None, Duration::from_secs(5)).unwrap();
    Queries::new(ApiClient::from_config(config).unwrap())
}

#[tokio::test]
async fn test_delete_invalidates_and_list_refetches() {
    let queries = queries().await;
    let drugs = queries.drugs();
    let list = drugs.list(DrugFilters::default());

    let before = list.fetch().await;
    assert_eq!(before.data.as_ref().map(Vec::len), Some(2));
    assert!(!before.is_stale);

    drugs.delete().mutate(1).await.unwrap();
    assert!(list.state().is_stale);

    let after = list.fetch().await;
    let remaining = after.data.expect("refetched list");
    assert_eq!(remaining.len(), 1);
    assert!(remaining.iter().all(|d| d.drug_id != 1));
    assert!(!after.is_stale);
}

#[tokio::test]
async fn test_invalid_form_never_reaches_backend() {
    let queries = queries().await;
    let drugs = queries.drugs();
    let list = drugs.list(DrugFilters::default());
    list.fetch().await;

    let form = RawForm::new()
        .with("name", "Atropine")
        .with("price", -1.0)
        .with("unit", "bottle")
        .with("category", DrugCategory::EyeDrops.to_string());
    let err = drugs.create().submit(&form, |body: DrugBody| body).await.unwrap_err();
    assert!(matches!(err, SubmitError::Invalid(ref e) if e.has_field("price")));
    assert!(!list.state().is_stale);
    assert_eq!(list.fetch().await.data.map(|d| d.len()), Some(2));
}
