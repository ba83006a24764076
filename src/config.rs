use std::path::{Path, PathBuf};

use anyhow::{ensure, Result};

/// File name of the append-only reading log.
pub const DEFAULT_LOG_FILE: &str = "environment_records.jsonl";
/// File name of the SQLite store.
pub const DEFAULT_DATABASE_FILE: &str = "greenhouse.db";
/// Rows shown in the recent-readings table.
pub const DEFAULT_RECENT_LIMIT: u32 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    /// JSON-lines log, opened in append mode and never truncated.
    pub log_path: PathBuf,
    /// SQLite file holding the `sensor_readings` table.
    pub database_path: PathBuf,
    /// How many readings the recent table shows.
    pub recent_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG_FILE),
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

impl Config {
    /// Places both storage files under `dir`, keeping the default file names.
    #[cfg(test)]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            log_path: dir.join(DEFAULT_LOG_FILE),
            database_path: dir.join(DEFAULT_DATABASE_FILE),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.recent_limit >= 1, "recent_limit must be at least 1");
        ensure!(
            self.log_path != self.database_path,
            "log file and database file must be different paths"
        );
        Ok(())
    }
}
