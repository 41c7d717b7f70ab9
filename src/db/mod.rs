// Database module - SQLite storage for dashboard snapshots

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::RendimentoError;
use crate::snapshot::DashboardSnapshot;

/// Get the default database path (~/.rendimento/data.db)
pub fn get_default_db_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let data_dir = PathBuf::from(home).join(".rendimento");

    // Create directory if it doesn't exist
    std::fs::create_dir_all(&data_dir).context("Failed to create .rendimento directory")?;

    Ok(data_dir.join("data.db"))
}

/// Open database connection
pub fn open_db(db_path: Option<PathBuf>) -> Result<Connection> {
    let path = match db_path {
        Some(p) => p,
        None => get_default_db_path()?,
    };
    Connection::open(&path).context(format!("Failed to open database at {:?}", path))
}

/// Initialize the database with schema
pub fn init_database(db_path: Option<PathBuf>) -> Result<()> {
    let path = match db_path {
        Some(p) => p,
        None => get_default_db_path()?,
    };

    info!("Initializing database at: {:?}", path);
    let conn = open_db(Some(path))?;
    conn.execute_batch(include_str!("schema.sql"))
        .context("Failed to execute schema")?;
    Ok(())
}

/// Lightweight listing row; the full snapshot stays in the JSON payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub id: String,
    pub owner: Option<String>,
    pub issuer: String,
    pub instrument: String,
    pub rate_type: String,
    pub principal: Decimal,
    pub net_value: Decimal,
    pub evaluated_on: NaiveDate,
}

/// Store a snapshot. Returns false when the same snapshot was already stored.
pub fn save_snapshot(conn: &Connection, snapshot: &DashboardSnapshot) -> Result<bool> {
    let payload = serde_json::to_string(snapshot).context("Failed to serialize snapshot")?;
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO dashboard_snapshots (
                id, owner, issuer, instrument, rate_type,
                principal, net_value, evaluated_on, payload
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                snapshot.id,
                snapshot.owner,
                snapshot.terms.issuer,
                snapshot.terms.instrument.as_str(),
                snapshot.terms.rate.as_str(),
                snapshot.terms.principal.to_string(),
                snapshot.result.net_value.to_string(),
                snapshot.result.evaluated_on,
                payload,
            ],
        )
        .map_err(|e| RendimentoError::Storage(e.to_string()))?;

    debug!("Saved snapshot {} (new: {})", snapshot.id, inserted > 0);
    Ok(inserted > 0)
}

/// Load a snapshot by id
pub fn get_snapshot(conn: &Connection, id: &str) -> Result<Option<DashboardSnapshot>> {
    let payload: Option<String> = conn
        .query_row(
            "SELECT payload FROM dashboard_snapshots WHERE id = ?1",
            [id],
            |row| row.get(0),
        )
        .optional()?;

    payload
        .map(|json| {
            serde_json::from_str(&json)
                .with_context(|| format!("Corrupt snapshot payload for {}", id))
        })
        .transpose()
}

/// List snapshots, newest first, optionally only those of one owner
pub fn list_snapshots(conn: &Connection, owner: Option<&str>) -> Result<Vec<SnapshotSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, owner, issuer, instrument, rate_type, principal, net_value, evaluated_on
         FROM dashboard_snapshots
         WHERE ?1 IS NULL OR owner = ?1
         ORDER BY created_at DESC, evaluated_on DESC, id ASC",
    )?;

    let rows = stmt
        .query_map(params![owner], |row| {
            Ok(SnapshotSummary {
                id: row.get(0)?,
                owner: row.get(1)?,
                issuer: row.get(2)?,
                instrument: row.get(3)?,
                rate_type: row.get(4)?,
                principal: get_decimal_value(row, 5)?,
                net_value: get_decimal_value(row, 6)?,
                evaluated_on: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Delete a snapshot. When `owner` is given, only that owner's snapshot is
/// removed. Returns whether a row was deleted.
pub fn delete_snapshot(conn: &Connection, id: &str, owner: Option<&str>) -> Result<bool> {
    let deleted = conn
        .execute(
            "DELETE FROM dashboard_snapshots WHERE id = ?1 AND (?2 IS NULL OR owner = ?2)",
            params![id, owner],
        )
        .map_err(|e| RendimentoError::Storage(e.to_string()))?;
    if deleted > 0 {
        info!("Deleted snapshot {}", id);
    }
    Ok(deleted > 0)
}

/// Helper to read Decimal stored as TEXT (falls back to INTEGER/REAL affinity)
fn get_decimal_value(row: &rusqlite::Row, idx: usize) -> Result<Decimal, rusqlite::Error> {
    use rusqlite::types::ValueRef;

    match row.get_ref(idx)? {
        ValueRef::Text(bytes) => {
            let s = std::str::from_utf8(bytes)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            Decimal::from_str(s).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
        }
        ValueRef::Integer(i) => Ok(Decimal::from(i)),
        ValueRef::Real(f) => {
            Decimal::try_from(f).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
        }
        _ => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "decimal".to_string(),
            rusqlite::types::Type::Null,
        )),
    }
}
