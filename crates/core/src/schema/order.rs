use super::StatusForm;
use crate::models::OrderStatus;

/// Form behind `PUT /hospital/orders/:id/status`.
pub type OrderStatusForm = StatusForm<OrderStatus>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FormBody, RawForm};

    #[test]
    fn test_order_status_form_only_accepts_order_states() {
        assert!(OrderStatusForm::from_form(&RawForm::new().with("status", "SHIPPED")).is_ok());
        let err = OrderStatusForm::from_form(&RawForm::new().with("status", "CONFIRMED"))
            .unwrap_err();
        assert!(err.has_field("status"));
    }
}
