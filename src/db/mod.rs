pub mod models;

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;

use crate::error::PersistenceError;
use models::{Reading, RecentReading};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS sensor_readings (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        greenhouse_id   TEXT,
        greenhouse_name TEXT,
        zone_id         TEXT,
        zone_name       TEXT,
        sensor_id       TEXT,
        sensor_type     TEXT,
        unit            TEXT,
        value           REAL,
        timestamp       TEXT,
        threshold_min   REAL,
        threshold_max   REAL
    )
"#;

/// Opens a fresh connection for a single operation.
async fn connect(path: &Path, create_if_missing: bool) -> Result<SqliteConnection, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create_if_missing);
    SqliteConnection::connect_with(&options).await
}

/// Creates `sensor_readings` if it does not exist. Existing rows are left alone.
pub async fn initialize(path: &Path) -> Result<(), PersistenceError> {
    let mut conn = connect(path, true).await?;
    sqlx::query(CREATE_TABLE).execute(&mut conn).await?;
    conn.close().await?;
    Ok(())
}

/// Inserts one row inside a transaction that is committed before returning.
/// Returns the row id assigned by SQLite.
pub async fn insert_row(path: &Path, reading: &Reading) -> Result<i64, PersistenceError> {
    let mut conn = connect(path, true).await?;
    let mut tx = conn.begin().await?;

    let id = sqlx::query(
        r#"
        INSERT INTO sensor_readings (
            greenhouse_id, greenhouse_name, zone_id, zone_name,
            sensor_id, sensor_type, unit, value, timestamp,
            threshold_min, threshold_max
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(reading.greenhouse_id())
    .bind(reading.greenhouse_name())
    .bind(reading.zone_id())
    .bind(reading.zone_name())
    .bind(reading.sensor_id())
    .bind(reading.sensor_type())
    .bind(reading.unit())
    .bind(reading.value())
    .bind(reading.timestamp())
    .bind(reading.threshold_min())
    .bind(reading.threshold_max())
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    tx.commit().await?;
    conn.close().await?;
    Ok(id)
}

/// Most recent rows first. A missing database file or table yields no rows.
pub async fn fetch_recent(path: &Path, limit: u32) -> Result<Vec<RecentReading>, PersistenceError> {
    let exists = path.try_exists().map_err(|source| PersistenceError::Access {
        path: path.to_path_buf(),
        source,
    })?;
    if !exists {
        return Ok(Vec::new());
    }

    let mut conn = connect(path, false).await?;
    let rows = sqlx::query_as::<_, RecentReading>(
        r#"
        SELECT greenhouse_name, zone_name, sensor_id, sensor_type,
               value, unit, timestamp
        FROM sensor_readings
        ORDER BY timestamp DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(i64::from(limit))
    .fetch_all(&mut conn)
    .await;

    // The query error is the one worth reporting; a close failure after it is dropped.
    match rows {
        Ok(rows) => {
            conn.close().await?;
            Ok(rows)
        }
        Err(sqlx::Error::Database(e)) if e.message().contains("no such table") => {
            let _ = conn.close().await;
            Ok(Vec::new())
        }
        Err(e) => {
            let _ = conn.close().await;
            Err(e.into())
        }
    }
}
