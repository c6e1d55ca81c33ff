//! Error types for embargo.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbargoError {
    #[error("Table not found: {}", .0.display())]
    MissingTable(PathBuf),

    #[error("Malformed table {} at row {}: {}", .path.display(), .row, .reason)]
    MalformedTable {
        path: PathBuf,
        /// 1-based index of the data row (header excluded); 0 for the header itself
        row: u64,
        reason: String,
    },

    #[error("Missing column '{}' in {}", .column, .path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("Malformed CIDR: {0}")]
    MalformedCidr(String),

    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EmbargoError>;
