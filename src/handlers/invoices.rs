use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Invoice;
use crate::state::AppState;

#[derive(Serialize)]
pub struct InvoiceResponse {
    pub id: String,
    pub invoice_number: String,
    pub merchant_id: String,
    pub booking_id: String,
    pub issue_date: String,
    pub due_date: String,
    pub total_amount_minor: i64,
    pub status: String,
}

impl From<Invoice> for InvoiceResponse {
    fn from(i: Invoice) -> Self {
        InvoiceResponse {
            id: i.id,
            invoice_number: i.invoice_number,
            merchant_id: i.merchant_id,
            booking_id: i.booking_id,
            issue_date: i.issue_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            due_date: i.due_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            total_amount_minor: i.total_amount_minor,
            status: i.status.as_str().to_string(),
        }
    }
}

// GET /api/invoices. Read-only; invoices are only ever created by approval.
#[derive(Deserialize)]
pub struct InvoicesQuery {
    pub merchant_id: Option<String>,
}

pub async fn get_invoices(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<InvoicesQuery>,
) -> Result<Json<Vec<InvoiceResponse>>, AppError> {
    let is_admin = super::admin::check_auth(&headers, &state.config.admin_token).is_ok();
    if !is_admin && query.merchant_id.is_none() {
        return Err(AppError::Validation("merchant_id is required".to_string()));
    }

    let invoices = {
        let db = state.db.lock().unwrap();
        queries::list_invoices(&db, query.merchant_id.as_deref())?
    };

    Ok(Json(invoices.into_iter().map(Into::into).collect()))
}
