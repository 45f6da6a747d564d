use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{BookingStatus, MediaType, ScreenBooking};
use crate::services::media;
use crate::services::wizard::{BookingWizard, WizardError};
use crate::state::AppState;

impl From<WizardError> for AppError {
    fn from(e: WizardError) -> Self {
        AppError::Validation(e.to_string())
    }
}

#[derive(Serialize)]
pub struct BookingResponse {
    pub id: String,
    pub location_id: String,
    pub pricing_option_id: String,
    pub merchant_id: String,
    pub start_at: String,
    pub end_at: String,
    pub duration_hours: i64,
    pub total_price_minor: i64,
    pub media_url: Option<String>,
    pub media_type: Option<String>,
    pub request_notes_en: Option<String>,
    pub request_notes_ar: Option<String>,
    pub status: String,
    pub admin_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ScreenBooking> for BookingResponse {
    fn from(b: ScreenBooking) -> Self {
        BookingResponse {
            id: b.id,
            location_id: b.location_id,
            pricing_option_id: b.pricing_option_id,
            merchant_id: b.merchant_id,
            start_at: b.start_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            end_at: b.end_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            duration_hours: b.duration_hours,
            total_price_minor: b.total_price_minor,
            media_url: b.media_url,
            media_type: b.media_type.map(|m| m.as_str().to_string()),
            request_notes_en: b.request_notes_en,
            request_notes_ar: b.request_notes_ar,
            status: b.status.as_str().to_string(),
            admin_notes: b.admin_notes,
            rejection_reason: b.rejection_reason,
            created_at: b.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            updated_at: b.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

fn parse_datetime(field: &str, value: &str) -> Result<NaiveDateTime, AppError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map_err(|_| AppError::Validation(format!("invalid {field}: {value}")))
}

fn require(field: &str, value: Option<String>) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

#[derive(Default)]
struct SubmittedForm {
    location_id: Option<String>,
    pricing_option_id: Option<String>,
    merchant_id: Option<String>,
    start_at: Option<String>,
    end_at: Option<String>,
    request_notes_en: Option<String>,
    request_notes_ar: Option<String>,
    // Buffered upload: file name, content type, bytes. Written to disk only
    // once the rest of the submission has validated.
    upload: Option<(String, String, axum::body::Bytes)>,
}

// POST /api/screen-bookings (multipart: booking fields + optional media file)
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let mut form = SubmittedForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "media" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().unwrap_or("").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("failed to read media upload: {e}")))?;
            if !bytes.is_empty() {
                if MediaType::from_mime(&content_type).is_none() {
                    return Err(AppError::Validation(format!(
                        "unsupported media type: {content_type}"
                    )));
                }
                form.upload = Some((file_name, content_type, bytes));
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("invalid field {name}: {e}")))?;
        match name.as_str() {
            "location_id" => form.location_id = Some(value),
            "pricing_option_id" => form.pricing_option_id = Some(value),
            "merchant_id" => form.merchant_id = Some(value),
            "start_at" => form.start_at = Some(value),
            "end_at" => form.end_at = Some(value),
            "request_notes_en" => form.request_notes_en = Some(value).filter(|v| !v.is_empty()),
            "request_notes_ar" => form.request_notes_ar = Some(value).filter(|v| !v.is_empty()),
            _ => {}
        }
    }

    let location_id = require("location_id", form.location_id)?;
    let pricing_option_id = require("pricing_option_id", form.pricing_option_id)?;
    let merchant_id = require("merchant_id", form.merchant_id)?;
    let start_at = parse_datetime("start_at", &require("start_at", form.start_at)?)?;
    let end_at = parse_datetime("end_at", &require("end_at", form.end_at)?)?;

    // The server re-runs the wizard's validation and pricing; a total
    // computed by the client is never trusted.
    let mut wizard = BookingWizard::new(&merchant_id);
    {
        let db = state.db.lock().unwrap();

        let location = queries::get_location(&db, &location_id)?
            .ok_or_else(|| AppError::NotFound(format!("screen location {location_id}")))?;
        let option = queries::get_pricing_option(&db, &pricing_option_id)?
            .ok_or_else(|| AppError::NotFound(format!("pricing option {pricing_option_id}")))?;

        wizard.select_location(location)?;
        wizard.select_pricing(option, start_at)?;
        wizard.set_schedule(start_at, end_at)?;
    }

    // Nothing touches the media directory until the submission has validated,
    // so a rejected request cannot leave an orphaned file behind.
    let stored = match form.upload {
        Some((file_name, content_type, bytes)) => Some(
            media::store_upload(&state.config.media_dir, &file_name, &content_type, &bytes)
                .await
                .map_err(|e| AppError::Validation(e.to_string()))?,
        ),
        None => None,
    };
    wizard.set_content(stored, form.request_notes_en, form.request_notes_ar)?;
    let request = wizard.build_request()?;

    let now = Utc::now().naive_utc();
    let booking = ScreenBooking {
        id: Uuid::new_v4().to_string(),
        location_id: request.location_id,
        pricing_option_id: request.pricing_option_id,
        merchant_id: request.merchant_id,
        start_at: request.start_at,
        end_at: request.end_at,
        duration_hours: request.duration_hours,
        total_price_minor: request.total_price_minor,
        media_url: request.media_url,
        media_type: request.media_type,
        request_notes_en: request.request_notes_en,
        request_notes_ar: request.request_notes_ar,
        status: BookingStatus::Pending,
        admin_notes: None,
        rejection_reason: None,
        created_at: now,
        updated_at: now,
    };

    let inserted = {
        let db = state.db.lock().unwrap();
        queries::create_booking(&db, &booking)
    };
    if let Err(e) = inserted {
        if let Some(url) = &booking.media_url {
            media::discard(&state.config.media_dir, url).await;
        }
        return Err(e.into());
    }

    tracing::info!(
        booking_id = %booking.id,
        merchant_id = %booking.merchant_id,
        total_minor = booking.total_price_minor,
        "booking submitted"
    );

    Ok((StatusCode::CREATED, Json(booking.into())))
}

// GET /api/screen-bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub merchant_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    // Admins see everything; merchants must scope to their own bookings.
    let is_admin = super::admin::check_auth(&headers, &state.config.admin_token).is_ok();
    if !is_admin && query.merchant_id.is_none() {
        return Err(AppError::Validation("merchant_id is required".to_string()));
    }

    let limit = query.limit.unwrap_or(50);
    let bookings = {
        let db = state.db.lock().unwrap();
        queries::list_bookings(
            &db,
            query.status.as_deref(),
            query.merchant_id.as_deref(),
            limit,
        )?
    };

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}
