use std::{io, path::PathBuf};

use thiserror::Error;

use crate::form::FormField;

/// Operator input rejected before any sink is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: FormField },

    #[error("{field} must be a number, got {input:?}")]
    NotANumber { field: FormField, input: String },
}

impl ValidationError {
    pub fn field(&self) -> FormField {
        match self {
            ValidationError::Empty { field } | ValidationError::NotANumber { field, .. } => *field,
        }
    }
}

/// A sink failed to store or read readings.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to append to log file {}: {source}", path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot access {}: {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode reading as JSON: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
