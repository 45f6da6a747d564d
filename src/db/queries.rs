use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    BookingStatus, Invoice, InvoiceStatus, MediaType, PricingType, ScreenBooking, ScreenLocation,
    ScreenPricingOption,
};

const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn fmt_dt(dt: &NaiveDateTime) -> String {
    dt.format(DT_FORMAT).to_string()
}

fn parse_dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DT_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

// ── Screen Locations ──

pub fn insert_location(conn: &Connection, location: &ScreenLocation) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO screen_locations (id, name_en, name_ar, address_en, address_ar, city_en, city_ar, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            location.id,
            location.name_en,
            location.name_ar,
            location.address_en,
            location.address_ar,
            location.city_en,
            location.city_ar,
            location.active as i32,
        ],
    )?;
    Ok(())
}

pub fn list_locations(conn: &Connection, only_active: bool) -> anyhow::Result<Vec<ScreenLocation>> {
    let sql = if only_active {
        "SELECT id, name_en, name_ar, address_en, address_ar, city_en, city_ar, active
         FROM screen_locations WHERE active = 1 ORDER BY name_en ASC"
    } else {
        "SELECT id, name_en, name_ar, address_en, address_ar, city_en, city_ar, active
         FROM screen_locations ORDER BY name_en ASC"
    };

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], parse_location_row)?;

    let mut locations = vec![];
    for row in rows {
        locations.push(row?);
    }
    Ok(locations)
}

pub fn get_location(conn: &Connection, id: &str) -> anyhow::Result<Option<ScreenLocation>> {
    let result = conn.query_row(
        "SELECT id, name_en, name_ar, address_en, address_ar, city_en, city_ar, active
         FROM screen_locations WHERE id = ?1",
        params![id],
        parse_location_row,
    );

    match result {
        Ok(location) => Ok(Some(location)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_location_row(row: &rusqlite::Row) -> rusqlite::Result<ScreenLocation> {
    Ok(ScreenLocation {
        id: row.get(0)?,
        name_en: row.get(1)?,
        name_ar: row.get(2)?,
        address_en: row.get(3)?,
        address_ar: row.get(4)?,
        city_en: row.get(5)?,
        city_ar: row.get(6)?,
        active: row.get::<_, i32>(7)? != 0,
    })
}

// ── Pricing Options ──

pub fn insert_pricing_option(
    conn: &Connection,
    option: &ScreenPricingOption,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO screen_pricing_options (id, location_id, pricing_type, price_per_unit_minor)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            option.id,
            option.location_id,
            option.pricing_type.as_str(),
            option.price_per_unit_minor,
        ],
    )?;
    Ok(())
}

pub fn list_pricing_options(
    conn: &Connection,
    location_id: Option<&str>,
) -> anyhow::Result<Vec<ScreenPricingOption>> {
    let mut stmt;
    let rows = match location_id {
        Some(location_id) => {
            stmt = conn.prepare(
                "SELECT id, location_id, pricing_type, price_per_unit_minor
                 FROM screen_pricing_options WHERE location_id = ?1 ORDER BY price_per_unit_minor ASC",
            )?;
            stmt.query_map(params![location_id], parse_pricing_row)?
        }
        None => {
            stmt = conn.prepare(
                "SELECT id, location_id, pricing_type, price_per_unit_minor
                 FROM screen_pricing_options ORDER BY location_id, price_per_unit_minor ASC",
            )?;
            stmt.query_map([], parse_pricing_row)?
        }
    };

    let mut options = vec![];
    for row in rows {
        options.push(row?);
    }
    Ok(options)
}

pub fn get_pricing_option(
    conn: &Connection,
    id: &str,
) -> anyhow::Result<Option<ScreenPricingOption>> {
    let result = conn.query_row(
        "SELECT id, location_id, pricing_type, price_per_unit_minor
         FROM screen_pricing_options WHERE id = ?1",
        params![id],
        parse_pricing_row,
    );

    match result {
        Ok(option) => Ok(Some(option)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_pricing_row(row: &rusqlite::Row) -> rusqlite::Result<ScreenPricingOption> {
    let pricing_type: String = row.get(2)?;
    Ok(ScreenPricingOption {
        id: row.get(0)?,
        location_id: row.get(1)?,
        pricing_type: PricingType::parse(&pricing_type),
        price_per_unit_minor: row.get(3)?,
    })
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "id, location_id, pricing_option_id, merchant_id, start_at, end_at, \
     duration_hours, total_price_minor, media_url, media_type, request_notes_en, request_notes_ar, \
     status, admin_notes, rejection_reason, created_at, updated_at";

pub fn create_booking(conn: &Connection, booking: &ScreenBooking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO screen_bookings (id, location_id, pricing_option_id, merchant_id, start_at, end_at,
             duration_hours, total_price_minor, media_url, media_type, request_notes_en, request_notes_ar,
             status, admin_notes, rejection_reason, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            booking.id,
            booking.location_id,
            booking.pricing_option_id,
            booking.merchant_id,
            fmt_dt(&booking.start_at),
            fmt_dt(&booking.end_at),
            booking.duration_hours,
            booking.total_price_minor,
            booking.media_url,
            booking.media_type.map(|m| m.as_str()),
            booking.request_notes_en,
            booking.request_notes_ar,
            booking.status.as_str(),
            booking.admin_notes,
            booking.rejection_reason,
            fmt_dt(&booking.created_at),
            fmt_dt(&booking.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<ScreenBooking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM screen_bookings WHERE id = ?1"),
        params![id],
        parse_booking_row,
    );

    match result {
        Ok(booking) => Ok(Some(booking)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_bookings(
    conn: &Connection,
    status_filter: Option<&str>,
    merchant_filter: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<ScreenBooking>> {
    let mut clauses: Vec<&str> = vec![];
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(status) = status_filter {
        clauses.push("status = ?");
        params_vec.push(Box::new(status.to_string()));
    }
    if let Some(merchant) = merchant_filter {
        clauses.push("merchant_id = ?");
        params_vec.push(Box::new(merchant.to_string()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    params_vec.push(Box::new(limit));

    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM screen_bookings{where_sql} ORDER BY created_at DESC LIMIT ?"
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

/// Marks a pending booking approved. Returns false when the row was not
/// pending anymore or does not exist; the caller decides which it was.
pub fn set_booking_approved(
    conn: &Connection,
    id: &str,
    admin_notes: Option<&str>,
    now: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE screen_bookings SET status = 'approved', admin_notes = ?1, updated_at = ?2
         WHERE id = ?3 AND status = 'pending'",
        params![admin_notes, fmt_dt(now), id],
    )?;
    Ok(count > 0)
}

pub fn set_booking_rejected(
    conn: &Connection,
    id: &str,
    rejection_reason: &str,
    now: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE screen_bookings SET status = 'rejected', rejection_reason = ?1, updated_at = ?2
         WHERE id = ?3 AND status = 'pending'",
        params![rejection_reason, fmt_dt(now), id],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> rusqlite::Result<ScreenBooking> {
    let start_at: String = row.get(4)?;
    let end_at: String = row.get(5)?;
    let media_type: Option<String> = row.get(9)?;
    let status: String = row.get(12)?;
    let created_at: String = row.get(15)?;
    let updated_at: String = row.get(16)?;

    Ok(ScreenBooking {
        id: row.get(0)?,
        location_id: row.get(1)?,
        pricing_option_id: row.get(2)?,
        merchant_id: row.get(3)?,
        start_at: parse_dt(&start_at),
        end_at: parse_dt(&end_at),
        duration_hours: row.get(6)?,
        total_price_minor: row.get(7)?,
        media_url: row.get(8)?,
        media_type: media_type.as_deref().and_then(MediaType::parse),
        request_notes_en: row.get(10)?,
        request_notes_ar: row.get(11)?,
        status: BookingStatus::parse(&status),
        admin_notes: row.get(13)?,
        rejection_reason: row.get(14)?,
        created_at: parse_dt(&created_at),
        updated_at: parse_dt(&updated_at),
    })
}

// ── Invoices ──

pub fn insert_invoice(conn: &Connection, invoice: &Invoice) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO invoices (id, invoice_number, merchant_id, booking_id, issue_date, due_date,
             total_amount_minor, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            invoice.id,
            invoice.invoice_number,
            invoice.merchant_id,
            invoice.booking_id,
            fmt_dt(&invoice.issue_date),
            fmt_dt(&invoice.due_date),
            invoice.total_amount_minor,
            invoice.status.as_str(),
            fmt_dt(&invoice.created_at),
        ],
    )?;
    Ok(())
}

pub fn list_invoices(
    conn: &Connection,
    merchant_filter: Option<&str>,
) -> anyhow::Result<Vec<Invoice>> {
    let mut stmt;
    let rows = match merchant_filter {
        Some(merchant) => {
            stmt = conn.prepare(
                "SELECT id, invoice_number, merchant_id, booking_id, issue_date, due_date,
                        total_amount_minor, status, created_at
                 FROM invoices WHERE merchant_id = ?1 ORDER BY created_at DESC",
            )?;
            stmt.query_map(params![merchant], parse_invoice_row)?
        }
        None => {
            stmt = conn.prepare(
                "SELECT id, invoice_number, merchant_id, booking_id, issue_date, due_date,
                        total_amount_minor, status, created_at
                 FROM invoices ORDER BY created_at DESC",
            )?;
            stmt.query_map([], parse_invoice_row)?
        }
    };

    let mut invoices = vec![];
    for row in rows {
        invoices.push(row?);
    }
    Ok(invoices)
}

pub fn get_invoice_for_booking(
    conn: &Connection,
    booking_id: &str,
) -> anyhow::Result<Option<Invoice>> {
    let result = conn.query_row(
        "SELECT id, invoice_number, merchant_id, booking_id, issue_date, due_date,
                total_amount_minor, status, created_at
         FROM invoices WHERE booking_id = ?1",
        params![booking_id],
        parse_invoice_row,
    );

    match result {
        Ok(invoice) => Ok(Some(invoice)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_invoice_row(row: &rusqlite::Row) -> rusqlite::Result<Invoice> {
    let issue_date: String = row.get(4)?;
    let due_date: String = row.get(5)?;
    let status: String = row.get(7)?;
    let created_at: String = row.get(8)?;

    Ok(Invoice {
        id: row.get(0)?,
        invoice_number: row.get(1)?,
        merchant_id: row.get(2)?,
        booking_id: row.get(3)?,
        issue_date: parse_dt(&issue_date),
        due_date: parse_dt(&due_date),
        total_amount_minor: row.get(6)?,
        status: InvoiceStatus::parse(&status),
        created_at: parse_dt(&created_at),
    })
}

// ── Dashboard ──

pub struct DashboardStats {
    pub pending_count: i64,
    pub approved_count: i64,
    pub rejected_count: i64,
    pub unpaid_invoice_count: i64,
}

pub fn get_dashboard_stats(conn: &Connection) -> anyhow::Result<DashboardStats> {
    let count_by_status = |status: &str| -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM screen_bookings WHERE status = ?1",
            params![status],
            |row| row.get(0),
        )
        .unwrap_or(0)
    };

    let unpaid_invoice_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM invoices WHERE status = 'unpaid'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    Ok(DashboardStats {
        pending_count: count_by_status("pending"),
        approved_count: count_by_status("approved"),
        rejected_count: count_by_status("rejected"),
        unpaid_invoice_count,
    })
}
