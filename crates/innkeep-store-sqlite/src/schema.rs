//! SQL schema for the Innkeep SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Rooms are never deleted; `active = 0` retires a room.
CREATE TABLE IF NOT EXISTS rooms (
    id             INTEGER PRIMARY KEY,
    name           TEXT    NOT NULL,
    category       TEXT    NOT NULL,
    max_occupancy  INTEGER NOT NULL CHECK (max_occupancy > 0),
    base_price     TEXT    NOT NULL,   -- decimal string, base currency
    active         INTEGER NOT NULL DEFAULT 1
);

-- One row per (room, night); a missing row means open at base price.
CREATE TABLE IF NOT EXISTS availability (
    room_id        INTEGER NOT NULL REFERENCES rooms(id),
    date           TEXT    NOT NULL,   -- YYYY-MM-DD
    available      INTEGER NOT NULL DEFAULT 1,
    price          TEXT,               -- decimal override or NULL
    min_stay       INTEGER NOT NULL DEFAULT 1,
    source         TEXT    NOT NULL DEFAULT 'manual',
    last_synced_at TEXT,
    UNIQUE (room_id, date)
);

-- Bookings are never deleted; cancellation is a status.
CREATE TABLE IF NOT EXISTS bookings (
    booking_id     TEXT    PRIMARY KEY,
    room_id        INTEGER NOT NULL REFERENCES rooms(id),
    check_in       TEXT    NOT NULL,
    check_out      TEXT    NOT NULL,   -- exclusive
    guests         INTEGER NOT NULL CHECK (guests > 0),
    guest_name     TEXT    NOT NULL,
    guest_email    TEXT    NOT NULL,
    guest_phone    TEXT,
    total_price    TEXT    NOT NULL,
    status         TEXT    NOT NULL DEFAULT 'pending',
    payment_status TEXT    NOT NULL DEFAULT 'unpaid',
    payment_ref    TEXT,
    notes          TEXT,
    source         TEXT    NOT NULL DEFAULT 'website',
    created_at     TEXT    NOT NULL,
    updated_at     TEXT    NOT NULL,
    CHECK (check_out > check_in)
);

CREATE TABLE IF NOT EXISTS competitors (
    name           TEXT    PRIMARY KEY,
    url_template   TEXT    NOT NULL,
    room_mapping   TEXT    NOT NULL,
    enabled        INTEGER NOT NULL DEFAULT 1
);

-- Re-running a scrape cell overwrites its row.
CREATE TABLE IF NOT EXISTS competitor_prices (
    source            TEXT NOT NULL,
    room_mapping      TEXT NOT NULL,
    price             TEXT NOT NULL,
    currency          TEXT NOT NULL,
    original_price    TEXT NOT NULL,
    original_currency TEXT NOT NULL,
    search_checkin    TEXT NOT NULL,
    search_checkout   TEXT NOT NULL,
    captured_at       TEXT NOT NULL,
    method            TEXT NOT NULL,   -- 'direct_scrape' | 'api_fallback'
    UNIQUE (source, room_mapping, search_checkin)
);

-- Write-once audit trail.
CREATE TABLE IF NOT EXISTS channel_sync_log (
    seq            INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id       TEXT    NOT NULL UNIQUE,
    channel        TEXT    NOT NULL,
    action         TEXT    NOT NULL,
    booking_id     TEXT    REFERENCES bookings(booking_id),
    payload        TEXT    NOT NULL,
    status         TEXT    NOT NULL DEFAULT 'pending',
    created_at     TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS bookings_room_idx        ON bookings(room_id, check_in);
CREATE INDEX IF NOT EXISTS availability_date_idx    ON availability(date);
CREATE INDEX IF NOT EXISTS sync_log_booking_idx     ON channel_sync_log(booking_id);

PRAGMA user_version = 1;
";
