//! Error type for `travels-ingest`.

use std::path::PathBuf;

use thiserror::Error;

/// Any of these aborts the whole ingestion; the store is left untouched.
#[derive(Debug, Error)]
pub enum Error {
  #[error("i/o error reading {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("archive error: {0}")]
  Archive(#[from] zip::result::ZipError),

  #[error("failed to read archive member {member:?}: {source}")]
  Member {
    member: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to decode {member:?}: {source}")]
  Decode {
    member: String,
    #[source]
    source: serde_json::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
