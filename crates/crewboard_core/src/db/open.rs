//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let conn = Connection::open(path)?;
    bootstrap_connection(conn, "file")
}

/// Opens an in-memory SQLite database and applies all pending migrations.
///
/// Used by tests and by the CLI probe; behavior matches `open_db`.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let conn = Connection::open_in_memory()?;
    bootstrap_connection(conn, "memory")
}

fn bootstrap_connection(mut conn: Connection, mode: &str) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let result = conn
        .busy_timeout(Duration::from_secs(5))
        .map_err(Into::into)
        .and_then(|()| apply_migrations(&mut conn));

    match result {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}
