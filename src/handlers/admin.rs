use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::bookings::BookingResponse;
use crate::models::{PricingType, ScreenLocation, ScreenPricingOption};
use crate::services::review;
use crate::state::AppState;

static ADMIN_HTML: &str = include_str!("../web/admin.html");

pub async fn admin_page() -> Html<&'static str> {
    Html(ADMIN_HTML)
}

pub(crate) fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/admin/status
#[derive(Serialize)]
pub struct StatusResponse {
    pending_count: i64,
    approved_count: i64,
    rejected_count: i64,
    unpaid_invoice_count: i64,
}

pub async fn get_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let stats = {
        let db = state.db.lock().unwrap();
        queries::get_dashboard_stats(&db)?
    };

    Ok(Json(StatusResponse {
        pending_count: stats.pending_count,
        approved_count: stats.approved_count,
        rejected_count: stats.rejected_count,
        unpaid_invoice_count: stats.unpaid_invoice_count,
    }))
}

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let limit = query.limit.unwrap_or(50);
    let bookings = {
        let db = state.db.lock().unwrap();
        queries::list_bookings(&db, query.status.as_deref(), None, limit)?
    };

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

// POST /api/admin/bookings/:id/approve
#[derive(Deserialize, Default)]
pub struct ApproveRequest {
    pub admin_notes: Option<String>,
}

pub async fn approve_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Option<Json<ApproveRequest>>,
) -> Result<Json<BookingResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let body = body.map(|Json(b)| b).unwrap_or_default();
    let booking = {
        let mut db = state.db.lock().unwrap();
        review::approve(
            &mut db,
            &id,
            body.admin_notes.as_deref(),
            state.config.invoice_due_days,
        )?
        .0
    };

    Ok(Json(booking.into()))
}

// POST /api/admin/bookings/:id/reject
#[derive(Deserialize)]
pub struct RejectRequest {
    pub rejection_reason: String,
}

pub async fn reject_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<RejectRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let booking = {
        let mut db = state.db.lock().unwrap();
        review::reject(&mut db, &id, &body.rejection_reason)?
    };

    Ok(Json(booking.into()))
}

// POST /api/admin/locations
#[derive(Deserialize)]
pub struct CreateLocationRequest {
    pub name_en: String,
    pub name_ar: String,
    #[serde(default)]
    pub address_en: String,
    #[serde(default)]
    pub address_ar: String,
    #[serde(default)]
    pub city_en: String,
    #[serde(default)]
    pub city_ar: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

pub async fn create_location(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateLocationRequest>,
) -> Result<Json<ScreenLocation>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if body.name_en.trim().is_empty() {
        return Err(AppError::Validation("name_en is required".to_string()));
    }

    let location = ScreenLocation {
        id: Uuid::new_v4().to_string(),
        name_en: body.name_en,
        name_ar: body.name_ar,
        address_en: body.address_en,
        address_ar: body.address_ar,
        city_en: body.city_en,
        city_ar: body.city_ar,
        active: body.active,
    };

    {
        let db = state.db.lock().unwrap();
        queries::insert_location(&db, &location)?;
    }

    Ok(Json(location))
}

// POST /api/admin/pricing-options
#[derive(Deserialize)]
pub struct CreatePricingOptionRequest {
    pub location_id: String,
    pub pricing_type: PricingType,
    pub price_per_unit_minor: i64,
}

pub async fn create_pricing_option(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreatePricingOptionRequest>,
) -> Result<Json<ScreenPricingOption>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    if body.price_per_unit_minor <= 0 {
        return Err(AppError::Validation(
            "price_per_unit_minor must be positive".to_string(),
        ));
    }

    let option = {
        let db = state.db.lock().unwrap();
        queries::get_location(&db, &body.location_id)?
            .ok_or_else(|| AppError::NotFound(format!("screen location {}", body.location_id)))?;

        let option = ScreenPricingOption {
            id: Uuid::new_v4().to_string(),
            location_id: body.location_id,
            pricing_type: body.pricing_type,
            price_per_unit_minor: body.price_per_unit_minor,
        };
        queries::insert_pricing_option(&db, &option)?;
        option
    };

    Ok(Json(option))
}
