//! Errors surfaced by a points import.

use std::path::PathBuf;

use thiserror::Error;

use super::colormap::ColorMapError;
use super::format::FormatError;

/// Errors that abort an import. Nothing is attached to the scene when one
/// of these is returned.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("could not open file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read error: {0}")]
    Read(#[from] std::io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    ColorMap(#[from] ColorMapError),

    #[error("invalid import configuration: {0}")]
    Config(String),

    #[error("malformed record {record} at byte offset {offset}: record is incomplete or unparsable")]
    MalformedRecord { record: usize, offset: u64 },
}

/// Result type for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;
