//! Append-only JSON-lines log of every accepted reading.
//!
//! One object per line, keys in `Reading` field order, UTF-8 written as-is so
//! names in any script stay readable. The file is only ever opened in append
//! mode.
use std::path::Path;

use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::debug;

use crate::{db::models::Reading, error::PersistenceError};

/// Serialize `reading` and append it to `path` as a single line.
pub async fn append(path: &Path, reading: &Reading) -> Result<(), PersistenceError> {
    let mut line = serde_json::to_vec(reading)?;
    line.push(b'\n');

    let io_err = |source| PersistenceError::Log {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(io_err)?;
    file.write_all(&line).await.map_err(io_err)?;
    file.flush().await.map_err(io_err)?;

    debug!(path = %path.display(), bytes = line.len(), "record_log: appended");
    Ok(())
}
