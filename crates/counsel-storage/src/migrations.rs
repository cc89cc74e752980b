//! Database schema migrations.
//!
//! Version 1 creates the knowledge base, the conversation log, and the
//! inbound appointment and staff-message queues.

use rusqlite::Connection;
use tracing::info;

use counsel_core::error::CounselError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), CounselError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| CounselError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| CounselError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<(), CounselError> {
    conn.execute_batch(
        "
        -- Knowledge base with precomputed fingerprints (little-endian f32).
        CREATE TABLE IF NOT EXISTS documents (
            id              TEXT PRIMARY KEY NOT NULL,
            title           TEXT,
            category        TEXT NOT NULL,
            content         TEXT NOT NULL,
            fingerprint     BLOB NOT NULL,
            created_at      INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_documents_title_category
            ON documents (title, category);

        -- Append-only log of authenticated turns.
        CREATE TABLE IF NOT EXISTS conversations (
            id              TEXT PRIMARY KEY NOT NULL,
            session_id      TEXT NOT NULL,
            caller_id       TEXT,
            message         TEXT NOT NULL,
            response        TEXT NOT NULL,
            cited_documents TEXT NOT NULL DEFAULT '[]',
            cost_metric     INTEGER NOT NULL DEFAULT 0,
            timestamp       INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_conversations_session
            ON conversations (session_id, timestamp ASC);

        -- Consultation requests awaiting staff follow-up.
        CREATE TABLE IF NOT EXISTS appointment_requests (
            id              TEXT PRIMARY KEY NOT NULL,
            matter_type     TEXT NOT NULL,
            date_time       TEXT NOT NULL,
            contact         TEXT NOT NULL,
            status          TEXT NOT NULL DEFAULT 'pending'
                            CHECK (status IN ('pending', 'confirmed', 'declined')),
            timestamp       INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_appointment_requests_status
            ON appointment_requests (status, timestamp DESC);

        -- Messages left for firm staff.
        CREATE TABLE IF NOT EXISTS staff_messages (
            id              TEXT PRIMARY KEY NOT NULL,
            content         TEXT NOT NULL,
            contact         TEXT NOT NULL,
            timestamp       INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_staff_messages_timestamp
            ON staff_messages (timestamp DESC);

        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| CounselError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}
