use gaswork_core::ServiceError;
use gaswork_sql::SQLStore;

/// SQL DDL statements to initialize the workshop database schema.
///
/// Each table stores the full JSON document in a `data` TEXT column,
/// with indexed columns extracted for efficient filtering and uniqueness.
///
/// The partial unique index on `workshop_entries` is what enforces the
/// one-open-entry-per-serial invariant: two concurrent intakes of the same
/// serial resolve in the store, without a global lock — the loser's INSERT
/// fails the constraint inside its transaction.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS catalog_entries (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        serial_number TEXT UNIQUE,
        brand TEXT,
        model TEXT,
        client_name TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS workshop_entries (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        serial_number TEXT NOT NULL,
        status TEXT NOT NULL,
        entry_date TEXT,
        delivery_date TEXT,
        create_at TEXT,
        update_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS calibration_records (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        entry_id TEXT UNIQUE,
        serial_number TEXT NOT NULL,
        calibration_date TEXT,
        client_name TEXT,
        model TEXT,
        create_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS brands (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT UNIQUE,
        create_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS models (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT UNIQUE,
        create_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS technicians (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT UNIQUE,
        create_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS clients (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        name TEXT,
        tax_id TEXT UNIQUE,
        create_at TEXT
    )",
    // Invariant: at most one open (non-DELIVERED) entry per serial.
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_entry_open_serial
        ON workshop_entries(serial_number) WHERE status != 'DELIVERED'",
    // Indexes
    "CREATE INDEX IF NOT EXISTS idx_entry_serial_status ON workshop_entries(serial_number, status)",
    "CREATE INDEX IF NOT EXISTS idx_entry_status ON workshop_entries(status)",
    "CREATE INDEX IF NOT EXISTS idx_rec_serial ON calibration_records(serial_number)",
    "CREATE INDEX IF NOT EXISTS idx_rec_date ON calibration_records(calibration_date)",
];

pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    for stmt in SCHEMA {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(format!("schema init failed: {}", e)))?;
    }
    Ok(())
}
