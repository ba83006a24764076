use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::{
    config::Config,
    db::{self, models::{Reading, RecentReading}},
    error::PersistenceError,
    record_log,
};

/// Outcome of the relational write for one submission.
#[derive(Debug)]
pub enum TableWrite {
    /// The database toggle was off.
    Skipped,
    /// Row committed with this id.
    Inserted(i64),
    Failed(PersistenceError),
}

/// Results of both sinks for one reading.
///
/// The log and the table are written independently with no shared
/// transaction, so either may fail while the other succeeds. Nothing is
/// rolled back.
#[derive(Debug)]
pub struct PersistOutcome {
    pub log: Result<(), PersistenceError>,
    pub table: TableWrite,
}

impl PersistOutcome {
    /// At least one sink holds the reading.
    pub fn stored_anywhere(&self) -> bool {
        self.log.is_ok() || matches!(self.table, TableWrite::Inserted(_))
    }

    /// Every attempted write succeeded.
    pub fn is_complete(&self) -> bool {
        self.log.is_ok() && !matches!(self.table, TableWrite::Failed(_))
    }

    /// Failures in sink order: log first, then table.
    pub fn failures(&self) -> Vec<&PersistenceError> {
        let mut out = Vec::new();
        if let Err(e) = &self.log {
            out.push(e);
        }
        if let TableWrite::Failed(e) = &self.table {
            out.push(e);
        }
        out
    }
}

/// Durable storage of readings across the append-only log and the SQLite table.
///
/// Holds only the two file paths; every call opens what it needs and closes it
/// before returning.
#[derive(Debug, Clone)]
pub struct PersistenceGateway {
    log_path: PathBuf,
    database_path: PathBuf,
}

impl PersistenceGateway {
    pub fn new(config: &Config) -> Self {
        Self {
            log_path: config.log_path.clone(),
            database_path: config.database_path.clone(),
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// Create-if-absent schema setup, safe on every start.
    pub async fn initialize(&self) -> Result<(), PersistenceError> {
        db::initialize(&self.database_path).await?;
        info!(path = %self.database_path.display(), "Database ready");
        Ok(())
    }

    pub async fn append_log(&self, reading: &Reading) -> Result<(), PersistenceError> {
        record_log::append(&self.log_path, reading).await
    }

    pub async fn insert_row(&self, reading: &Reading) -> Result<i64, PersistenceError> {
        db::insert_row(&self.database_path, reading).await
    }

    pub async fn fetch_recent(&self, limit: u32) -> Result<Vec<RecentReading>, PersistenceError> {
        db::fetch_recent(&self.database_path, limit).await
    }

    /// Log write first, then the table write when `save_to_database` is set.
    /// The table write is attempted even if the log write failed.
    pub async fn persist(&self, reading: &Reading, save_to_database: bool) -> PersistOutcome {
        let log = self.append_log(reading).await;
        match &log {
            Ok(()) => info!(
                sensor_id = %reading.sensor_id(),
                timestamp = %reading.timestamp(),
                "Reading appended to log"
            ),
            Err(e) => error!(sensor_id = %reading.sensor_id(), error = %e, "Failed to append reading to log"),
        }

        let table = if save_to_database {
            match self.insert_row(reading).await {
                Ok(id) => {
                    info!(id, sensor_id = %reading.sensor_id(), "Reading inserted into database");
                    TableWrite::Inserted(id)
                }
                Err(e) => {
                    error!(sensor_id = %reading.sensor_id(), error = %e, "Failed to insert reading");
                    TableWrite::Failed(e)
                }
            }
        } else {
            TableWrite::Skipped
        };

        PersistOutcome { log, table }
    }
}
