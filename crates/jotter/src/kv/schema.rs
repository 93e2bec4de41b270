//! `SQLite` schema for the key-value backend.
//!
//! The table layout is stamped with a version in the `metadata` table so a
//! database written by a newer layout is refused instead of misread.

use rusqlite::{Connection, OptionalExtension};

use crate::error::{Error, Result};

/// The current table layout version.
pub const LAYOUT_VERSION: i32 = 1;

/// Key used to store the layout version in the metadata table.
const VERSION_KEY: &str = "layout_version";

/// SQL statement to create the entries table.
pub const CREATE_ENTRIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS entries (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the metadata table for backend bookkeeping.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_ENTRIES_TABLE, CREATE_METADATA_TABLE];

/// Create the tables if needed and stamp the layout version.
///
/// # Errors
///
/// Returns an error if a statement fails or the database carries a layout
/// version this build does not know.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    match layout_version(conn)? {
        None => set_layout_version(conn, LAYOUT_VERSION),
        Some(LAYOUT_VERSION) => Ok(()),
        Some(other) => Err(Error::DatabaseMigration {
            message: format!(
                "database layout version {other} is not supported (expected {LAYOUT_VERSION})"
            ),
        }),
    }
}

/// Read the stamped layout version, `None` for a fresh database.
fn layout_version(conn: &Connection) -> Result<Option<i32>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    value
        .map(|v| {
            v.parse().map_err(|_| Error::DatabaseMigration {
                message: format!("invalid layout version: {v}"),
            })
        })
        .transpose()
}

fn set_layout_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}
