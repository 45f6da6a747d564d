use chrono::{Duration, NaiveDateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{BookingStatus, Invoice, InvoiceStatus, ScreenBooking};

#[derive(Debug)]
pub enum ReviewError {
    NotFound,
    AlreadyDecided { status: BookingStatus },
    MissingReason,
    Db(anyhow::Error),
}

impl std::fmt::Display for ReviewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewError::NotFound => write!(f, "booking not found"),
            ReviewError::AlreadyDecided { status } => {
                write!(f, "booking is already {}", status.as_str())
            }
            ReviewError::MissingReason => write!(f, "rejection reason must not be empty"),
            ReviewError::Db(e) => write!(f, "{e}"),
        }
    }
}

impl From<ReviewError> for AppError {
    fn from(e: ReviewError) -> Self {
        match e {
            ReviewError::NotFound => AppError::NotFound("booking not found".to_string()),
            ReviewError::AlreadyDecided { .. } => AppError::Conflict(e.to_string()),
            ReviewError::MissingReason => AppError::Validation(e.to_string()),
            ReviewError::Db(e) => AppError::Database(e),
        }
    }
}

/// Approves a pending booking and issues its invoice in one transaction.
/// Only the pending row version is updated, so two admins racing on the same
/// booking cannot both succeed; the loser gets AlreadyDecided.
pub fn approve(
    conn: &mut Connection,
    booking_id: &str,
    admin_notes: Option<&str>,
    invoice_due_days: i64,
) -> Result<(ScreenBooking, Invoice), ReviewError> {
    let tx = conn.transaction().map_err(|e| ReviewError::Db(e.into()))?;

    let mut booking = queries::get_booking_by_id(&tx, booking_id)
        .map_err(ReviewError::Db)?
        .ok_or(ReviewError::NotFound)?;
    if booking.status.is_terminal() {
        return Err(ReviewError::AlreadyDecided {
            status: booking.status,
        });
    }

    let now = Utc::now().naive_utc();
    let updated = queries::set_booking_approved(&tx, booking_id, admin_notes, &now)
        .map_err(ReviewError::Db)?;
    if !updated {
        return Err(ReviewError::AlreadyDecided {
            status: booking.status,
        });
    }

    let invoice_id = Uuid::new_v4().to_string();
    let invoice = Invoice {
        invoice_number: invoice_number(&invoice_id, &now),
        id: invoice_id,
        merchant_id: booking.merchant_id.clone(),
        booking_id: booking.id.clone(),
        issue_date: now,
        due_date: now + Duration::days(invoice_due_days),
        total_amount_minor: booking.total_price_minor,
        status: InvoiceStatus::Unpaid,
        created_at: now,
    };
    queries::insert_invoice(&tx, &invoice).map_err(ReviewError::Db)?;

    tx.commit().map_err(|e| ReviewError::Db(e.into()))?;

    booking.status = BookingStatus::Approved;
    booking.admin_notes = admin_notes.map(str::to_string);
    booking.updated_at = now;

    tracing::info!(
        booking_id = %booking.id,
        invoice_number = %invoice.invoice_number,
        "booking approved, invoice issued"
    );

    Ok((booking, invoice))
}

/// Rejects a pending booking. A non-blank reason is mandatory; no invoice
/// is created.
pub fn reject(
    conn: &mut Connection,
    booking_id: &str,
    rejection_reason: &str,
) -> Result<ScreenBooking, ReviewError> {
    let reason = rejection_reason.trim();
    if reason.is_empty() {
        return Err(ReviewError::MissingReason);
    }

    let tx = conn.transaction().map_err(|e| ReviewError::Db(e.into()))?;

    let mut booking = queries::get_booking_by_id(&tx, booking_id)
        .map_err(ReviewError::Db)?
        .ok_or(ReviewError::NotFound)?;
    if booking.status.is_terminal() {
        return Err(ReviewError::AlreadyDecided {
            status: booking.status,
        });
    }

    let now = Utc::now().naive_utc();
    let updated =
        queries::set_booking_rejected(&tx, booking_id, reason, &now).map_err(ReviewError::Db)?;
    if !updated {
        return Err(ReviewError::AlreadyDecided {
            status: booking.status,
        });
    }

    tx.commit().map_err(|e| ReviewError::Db(e.into()))?;

    booking.status = BookingStatus::Rejected;
    booking.rejection_reason = Some(reason.to_string());
    booking.updated_at = now;

    tracing::info!(booking_id = %booking.id, "booking rejected");

    Ok(booking)
}

// Embeds the whole invoice id, so the UNIQUE invoice_number column cannot
// collide on same-day approvals and no insert retry is needed.
fn invoice_number(invoice_id: &str, issued: &NaiveDateTime) -> String {
    format!(
        "INV-{}-{}",
        issued.format("%Y%m%d"),
        invoice_id.replace('-', "").to_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{MediaType, PricingType, ScreenLocation, ScreenPricingOption};

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn setup_db() -> Connection {
        let conn = db::init_db(":memory:").unwrap();
        queries::insert_location(
            &conn,
            &ScreenLocation {
                id: "loc-1".to_string(),
                name_en: "Mall Entrance".to_string(),
                name_ar: "مدخل المول".to_string(),
                address_en: String::new(),
                address_ar: String::new(),
                city_en: "Riyadh".to_string(),
                city_ar: "الرياض".to_string(),
                active: true,
            },
        )
        .unwrap();
        queries::insert_pricing_option(
            &conn,
            &ScreenPricingOption {
                id: "opt-1".to_string(),
                location_id: "loc-1".to_string(),
                pricing_type: PricingType::Daily,
                price_per_unit_minor: 200,
            },
        )
        .unwrap();
        conn
    }

    fn seed_booking(conn: &Connection, id: &str) {
        let now = Utc::now().naive_utc();
        let booking = ScreenBooking {
            id: id.to_string(),
            location_id: "loc-1".to_string(),
            pricing_option_id: "opt-1".to_string(),
            merchant_id: "merchant-1".to_string(),
            start_at: dt("2025-01-01 00:00"),
            end_at: dt("2025-01-02 00:00"),
            duration_hours: 24,
            total_price_minor: 200,
            media_url: None,
            media_type: Some(MediaType::Image),
            request_notes_en: None,
            request_notes_ar: None,
            status: BookingStatus::Pending,
            admin_notes: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        queries::create_booking(conn, &booking).unwrap();
    }

    #[test]
    fn test_approve_creates_exactly_one_invoice() {
        let mut conn = setup_db();
        seed_booking(&conn, "bk-1");

        let (booking, invoice) = approve(&mut conn, "bk-1", Some("ok"), 30).unwrap();
        assert_eq!(booking.status, BookingStatus::Approved);
        assert_eq!(booking.admin_notes.as_deref(), Some("ok"));
        assert_eq!(invoice.merchant_id, "merchant-1");
        assert_eq!(invoice.total_amount_minor, 200);
        assert_eq!(invoice.status, InvoiceStatus::Unpaid);
        assert!(invoice.invoice_number.starts_with("INV-"));

        let invoices = queries::list_invoices(&conn, None).unwrap();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].booking_id, "bk-1");

        let by_booking = queries::get_invoice_for_booking(&conn, "bk-1")
            .unwrap()
            .unwrap();
        assert_eq!(by_booking.invoice_number, invoice.invoice_number);
    }

    #[test]
    fn test_invoice_due_date_offset() {
        let mut conn = setup_db();
        seed_booking(&conn, "bk-1");

        let (_, invoice) = approve(&mut conn, "bk-1", None, 14).unwrap();
        assert_eq!(invoice.due_date - invoice.issue_date, Duration::days(14));
    }

    #[test]
    fn test_second_approve_conflicts() {
        let mut conn = setup_db();
        seed_booking(&conn, "bk-1");

        approve(&mut conn, "bk-1", None, 30).unwrap();
        let err = approve(&mut conn, "bk-1", None, 30).unwrap_err();
        assert!(matches!(
            err,
            ReviewError::AlreadyDecided {
                status: BookingStatus::Approved
            }
        ));

        // Still exactly one invoice
        let invoices = queries::list_invoices(&conn, None).unwrap();
        assert_eq!(invoices.len(), 1);
    }

    #[test]
    fn test_reject_after_approve_conflicts() {
        let mut conn = setup_db();
        seed_booking(&conn, "bk-1");

        approve(&mut conn, "bk-1", None, 30).unwrap();
        let err = reject(&mut conn, "bk-1", "too late").unwrap_err();
        assert!(matches!(err, ReviewError::AlreadyDecided { .. }));
    }

    #[test]
    fn test_reject_persists_reason_and_skips_invoice() {
        let mut conn = setup_db();
        seed_booking(&conn, "bk-1");

        let booking = reject(&mut conn, "bk-1", "media violates policy").unwrap();
        assert_eq!(booking.status, BookingStatus::Rejected);
        assert_eq!(
            booking.rejection_reason.as_deref(),
            Some("media violates policy")
        );

        let stored = queries::get_booking_by_id(&conn, "bk-1").unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Rejected);
        assert_eq!(
            stored.rejection_reason.as_deref(),
            Some("media violates policy")
        );
        assert!(queries::list_invoices(&conn, None).unwrap().is_empty());
    }

    #[test]
    fn test_reject_requires_reason() {
        let mut conn = setup_db();
        seed_booking(&conn, "bk-1");

        assert!(matches!(
            reject(&mut conn, "bk-1", "").unwrap_err(),
            ReviewError::MissingReason
        ));
        assert!(matches!(
            reject(&mut conn, "bk-1", "   ").unwrap_err(),
            ReviewError::MissingReason
        ));

        // Booking untouched
        let stored = queries::get_booking_by_id(&conn, "bk-1").unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Pending);
    }

    #[test]
    fn test_invoice_numbers_distinct_for_ids_sharing_a_prefix() {
        let issued = dt("2025-01-01 10:00");
        let a = invoice_number("0a1b2c3d-0000-4000-8000-000000000001", &issued);
        let b = invoice_number("0a1b2c3d-0000-4000-8000-000000000002", &issued);
        assert!(a.starts_with("INV-20250101-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_booking_not_found() {
        let mut conn = setup_db();
        assert!(matches!(
            approve(&mut conn, "missing", None, 30).unwrap_err(),
            ReviewError::NotFound
        ));
        assert!(matches!(
            reject(&mut conn, "missing", "reason").unwrap_err(),
            ReviewError::NotFound
        ));
    }
}
