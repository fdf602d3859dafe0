use crate::payload::{ListFilters, QueryParams};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

wire_enum! {
    pub enum OrderStatus {
        Pending => "PENDING",
        Paid => "PAID",
        Shipped => "SHIPPED",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub drug_id: i64,
    pub quantity: u32,
    pub unit_price: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub patient_id: i64,
    #[serde(default)]
    pub record_id: Option<i64>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Sum of the line items. The backend's `total_amount` is authoritative; this is for display
    /// checks.
    pub fn items_total(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.unit_price * f64::from(item.quantity))
            .sum()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderFilters {
    pub status: Option<OrderStatus>,
    pub patient_id: Option<i64>,
}

impl ListFilters for OrderFilters {
    fn query_params(&self) -> QueryParams {
        QueryParams::new()
            .push("status", self.status)
            .push("patient_id", self.patient_id)
    }
}
