//! The `DatasetStore` trait and query result types.
//!
//! The trait is implemented by storage backends (e.g.
//! `travels-store-memory`). Higher layers (`travels-ingest`, `travels-api`)
//! depend on this abstraction, not on any concrete backend.

use std::fmt;

use chrono::Utc;
use serde::Serialize;

use crate::{
  Error, Result,
  entity::{Entity, EntityKind, EntityPatch, Location, User},
  filter::{FilterParams, FilterScope, Predicate},
};

// ─── Result types ────────────────────────────────────────────────────────────

/// One row of the visits-for-user listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitSummary {
  pub mark:       u8,
  pub visited_at: i64,
  pub place:      String,
}

/// Decimal places carried by [`AverageMark`].
pub const AVERAGE_SCALE: u32 = 5;

const SCALE_FACTOR: i128 = 10_i128.pow(AVERAGE_SCALE);

/// A mean mark as a fixed-point decimal with [`AVERAGE_SCALE`] digits.
///
/// The exact ratio is rounded half up. An empty set averages to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AverageMark {
  scaled: i64,
}

impl AverageMark {
  pub fn from_total(sum: i64, count: u64) -> Self {
    if count == 0 {
      return Self::default();
    }
    let count = i128::from(count);
    let num = i128::from(sum) * SCALE_FACTOR * 2 + count;
    let scaled = num.div_euclid(count * 2);
    Self {
      scaled: i64::try_from(scaled).unwrap_or(i64::MAX),
    }
  }

  /// The value multiplied by 10^[`AVERAGE_SCALE`].
  pub fn scaled(self) -> i64 { self.scaled }
}

impl fmt::Display for AverageMark {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let factor = SCALE_FACTOR as i64;
    let sign = if self.scaled < 0 { "-" } else { "" };
    let abs = self.scaled.unsigned_abs();
    write!(
      f,
      "{sign}{}.{:0width$}",
      abs / factor as u64,
      abs % factor as u64,
      width = AVERAGE_SCALE as usize
    )
  }
}

/// Number of records held per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
  pub users:     usize,
  pub locations: usize,
  pub visits:    usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a travels dataset backend.
///
/// All methods are synchronous in-memory work; implementations must make
/// every write (including a whole [`DatasetStore::bulk_put`]) visible to
/// readers atomically.
pub trait DatasetStore: Send + Sync {
  // ── Records ───────────────────────────────────────────────────────────

  /// Fetch a record by kind and id.
  fn get(&self, kind: EntityKind, id: u32) -> Result<Entity>;

  /// Insert a record, replacing any record of the same kind and id.
  fn put(&self, entity: Entity);

  /// Insert-or-replace every record under one exclusive section. Returns the
  /// number of records applied.
  fn bulk_put(&self, entities: Vec<Entity>) -> usize;

  /// Apply a partial update to an existing record and return the result.
  fn update(&self, id: u32, patch: EntityPatch) -> Result<Entity>;

  fn counts(&self) -> StoreCounts;

  // ── Analytical queries over compiled predicates ───────────────────────

  /// Visits of user `id` matching `predicate`, sorted by `visited_at`.
  fn query_user_visits(
    &self,
    id: u32,
    predicate: &Predicate,
  ) -> Result<Vec<VisitSummary>>;

  /// Mean mark of the visits to location `id` matching `predicate`.
  fn query_location_average(
    &self,
    id: u32,
    predicate: &Predicate,
  ) -> Result<AverageMark>;

  // ── Provided ──────────────────────────────────────────────────────────

  fn user(&self, id: u32) -> Result<User> {
    match self.get(EntityKind::User, id)? {
      Entity::User(u) => Ok(u),
      _ => Err(Error::not_found(EntityKind::User, id)),
    }
  }

  fn location(&self, id: u32) -> Result<Location> {
    match self.get(EntityKind::Location, id)? {
      Entity::Location(l) => Ok(l),
      _ => Err(Error::not_found(EntityKind::Location, id)),
    }
  }

  /// Resolve user `id`, compile `filters` against the current time, then
  /// run [`DatasetStore::query_user_visits`]. A missing user is reported
  /// before a malformed filter.
  fn visits_for_user(
    &self,
    id: u32,
    filters: &FilterParams,
  ) -> Result<Vec<VisitSummary>> {
    self.user(id)?;
    let predicate =
      Predicate::compile(FilterScope::UserVisits, filters, Utc::now())?;
    self.query_user_visits(id, &predicate)
  }

  /// Resolve location `id`, compile `filters` against the current time,
  /// then run [`DatasetStore::query_location_average`].
  fn average_mark_for_location(
    &self,
    id: u32,
    filters: &FilterParams,
  ) -> Result<AverageMark> {
    self.location(id)?;
    let predicate =
      Predicate::compile(FilterScope::LocationAverage, filters, Utc::now())?;
    self.query_location_average(id, &predicate)
  }
}
