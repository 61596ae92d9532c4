//! Error types for `travels-core`.

use thiserror::Error;

use crate::entity::EntityKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{kind} {id} not found")]
  NotFound { kind: EntityKind, id: u32 },

  /// A filter parameter could not be parsed into its expected type. The
  /// query is rejected before any index is consulted.
  #[error("bad filter {name}={value:?}: {reason}")]
  BadFilter {
    name:   String,
    value:  String,
    reason: String,
  },

  #[error("invalid record: {0}")]
  InvalidRecord(String),
}

impl Error {
  pub fn not_found(kind: EntityKind, id: u32) -> Self {
    Self::NotFound { kind, id }
  }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound { .. }) }

  pub fn is_bad_filter(&self) -> bool {
    matches!(self, Self::BadFilter { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
