use serde::{Deserialize, Serialize};

/// One payment-processor settlement line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementPayment {
    pub payment_id: String,
    pub order_id: String,
    pub payment_date: String,
    /// Gross charge amount
    pub amount: f64,
    pub currency: String,
    pub payment_method: String,
    pub processor_fee: f64,
    pub net_amount: f64,
    pub status: String,
    pub refunded: bool,
    pub refund_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_date: Option<String>,
}
