use anyhow::Context;
use rusqlite::{params, Connection};

// Migrations are embedded so an in-memory database gets the full schema
// without any files on disk. Applied in order, recorded in _migrations.
const MIGRATIONS: &[(&str, &str)] = &[("0001_init", INIT_SCHEMA)];

const INIT_SCHEMA: &str = "
CREATE TABLE screen_locations (
    id TEXT PRIMARY KEY,
    name_en TEXT NOT NULL,
    name_ar TEXT NOT NULL,
    address_en TEXT NOT NULL DEFAULT '',
    address_ar TEXT NOT NULL DEFAULT '',
    city_en TEXT NOT NULL DEFAULT '',
    city_ar TEXT NOT NULL DEFAULT '',
    active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE screen_pricing_options (
    id TEXT PRIMARY KEY,
    location_id TEXT NOT NULL REFERENCES screen_locations(id),
    pricing_type TEXT NOT NULL,
    price_per_unit_minor INTEGER NOT NULL CHECK (price_per_unit_minor > 0)
);

CREATE TABLE screen_bookings (
    id TEXT PRIMARY KEY,
    location_id TEXT NOT NULL REFERENCES screen_locations(id),
    pricing_option_id TEXT NOT NULL REFERENCES screen_pricing_options(id),
    merchant_id TEXT NOT NULL,
    start_at TEXT NOT NULL,
    end_at TEXT NOT NULL,
    duration_hours INTEGER NOT NULL,
    total_price_minor INTEGER NOT NULL,
    media_url TEXT,
    media_type TEXT,
    request_notes_en TEXT,
    request_notes_ar TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    admin_notes TEXT,
    rejection_reason TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_bookings_status ON screen_bookings(status);
CREATE INDEX idx_bookings_merchant ON screen_bookings(merchant_id);

CREATE TABLE invoices (
    id TEXT PRIMARY KEY,
    invoice_number TEXT NOT NULL UNIQUE,
    merchant_id TEXT NOT NULL,
    booking_id TEXT NOT NULL UNIQUE REFERENCES screen_bookings(id),
    issue_date TEXT NOT NULL,
    due_date TEXT NOT NULL,
    total_amount_minor INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'unpaid',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_invoices_merchant ON invoices(merchant_id);
";

pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create migrations table")?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;

        if already_applied {
            continue;
        }

        conn.execute_batch(sql)
            .with_context(|| format!("failed to apply migration: {name}"))?;

        conn.execute("INSERT INTO _migrations (name) VALUES (?1)", params![name])
            .with_context(|| format!("failed to record migration: {name}"))?;

        tracing::info!("applied migration: {name}");
    }

    Ok(())
}
