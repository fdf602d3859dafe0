use crate::client::{ApiClient, StatusChange};
use crate::constants::ORDERS_PATH;
use crate::models::{Order, OrderFilters, OrderStatus, StatusBody};
use crate::payload::ListFilters;
use crate::transport::ApiRequest;
use crate::ClientResult;

#[derive(Clone, Debug)]
pub struct OrderApi {
    client: ApiClient,
}

impl OrderApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filters: &OrderFilters) -> ClientResult<Vec<Order>> {
        self.client
            .get(ORDERS_PATH.to_owned(), filters.query_params().into_pairs())
            .await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Order> {
        self.client.get(format!("{ORDERS_PATH}/{id}"), Vec::new()).await
    }

    pub async fn by_patient(&self, patient_id: i64) -> ClientResult<Vec<Order>> {
        self.client
            .get(format!("{ORDERS_PATH}/patient/{patient_id}"), Vec::new())
            .await
    }

    pub async fn update_status(&self, change: StatusChange<OrderStatus>) -> ClientResult<Order> {
        self.client
            .send_body(
                ApiRequest::put(format!("{ORDERS_PATH}/{}/status", change.id)),
                &StatusBody {
                    status: change.status,
                },
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.client.delete(format!("{ORDERS_PATH}/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_by_patient_decodes_items() {
        let transport = RecordingTransport::new();
        transport.reply_ok(json!([{
            "order_id": 1,
            "patient_id": 8,
            "items": [
                { "drug_id": 3, "quantity": 2, "unit_price": 50.0 },
                { "drug_id": 4, "quantity": 1, "unit_price": 25.5 }
            ],
            "total_amount": 125.5,
            "status": "PAID",
            "created_at": "2026-10-01T00:00:00Z",
            "updated_at": "2026-10-01T00:00:00Z"
        }]));
        let orders = transport.client().orders().by_patient(8).await.unwrap();
        assert_eq!(orders[0].status, OrderStatus::Paid);
        assert_eq!(orders[0].items_total(), 125.5);
        assert_eq!(transport.requests()[0].path, "/hospital/orders/patient/8");
    }
}
