use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Billing record created exactly once, as a side effect of approving a
/// booking. The one-invoice-per-booking rule is backed by a UNIQUE
/// constraint on `booking_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub merchant_id: String,
    pub booking_id: String,
    pub issue_date: NaiveDateTime,
    pub due_date: NaiveDateTime,
    pub total_amount_minor: i64,
    pub status: InvoiceStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Unpaid,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "paid" => InvoiceStatus::Paid,
            _ => InvoiceStatus::Unpaid,
        }
    }
}
