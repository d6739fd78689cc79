//! Connection bootstrap utilities for SQLite.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Writable connections have migrations fully applied.
//! - Read-only connections never create, migrate or write the file.

use super::migrations::{apply_migrations, ensure_supported_version};
use super::DbResult;
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Creates the file when it does not exist.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with("file", true, || Connection::open(path))
}

/// Opens an existing SQLite database file for reads only.
///
/// A missing file is an error. The schema is checked but never migrated, so
/// stores built on this connection reject databases that are behind.
pub fn open_db_read_only(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with("read_only", false, || {
        Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    })
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", true, Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    migrate: bool,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match connect() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, migrate) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection, migrate: bool) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    if migrate {
        apply_migrations(conn)?;
    } else {
        ensure_supported_version(conn)?;
    }
    Ok(())
}
