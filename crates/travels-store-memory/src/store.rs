//! [`MemoryStore`], the in-memory implementation of [`DatasetStore`].

use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;
use travels_core::{
  Error, Result,
  entity::{Entity, EntityKind, EntityPatch, Location, User, Visit},
  filter::Predicate,
  store::{AverageMark, DatasetStore, StoreCounts, VisitSummary},
};

use crate::index::VisitIndex;

// ─── Tables ──────────────────────────────────────────────────────────────────

/// Everything guarded by the store lock. The three primary maps and both
/// visit indices always change together.
#[derive(Debug, Default)]
pub(crate) struct Tables {
  pub users:              HashMap<u32, User>,
  pub locations:          HashMap<u32, Location>,
  pub visits:             HashMap<u32, Visit>,
  pub visits_by_user:     VisitIndex,
  pub visits_by_location: VisitIndex,
}

impl Tables {
  fn insert(&mut self, entity: Entity) {
    match entity {
      Entity::User(u) => {
        self.users.insert(u.id, u);
      }
      Entity::Location(l) => {
        self.locations.insert(l.id, l);
      }
      Entity::Visit(v) => self.insert_visit(v),
    }
  }

  fn insert_visit(&mut self, visit: Visit) {
    let (id, user, location) = (visit.id, visit.user, visit.location);
    let previous = self.visits.insert(id, visit);
    self
      .visits_by_user
      .relink(id, previous.as_ref().map(|v| v.user), user);
    self
      .visits_by_location
      .relink(id, previous.as_ref().map(|v| v.location), location);
  }

  fn get(&self, kind: EntityKind, id: u32) -> Option<Entity> {
    match kind {
      EntityKind::User => self.users.get(&id).cloned().map(Entity::User),
      EntityKind::Location => {
        self.locations.get(&id).cloned().map(Entity::Location)
      }
      EntityKind::Visit => self.visits.get(&id).cloned().map(Entity::Visit),
    }
  }

  fn apply(&mut self, id: u32, patch: EntityPatch) -> Result<Entity> {
    let kind = patch.kind();
    let missing = || Error::not_found(kind, id);
    match patch {
      EntityPatch::User(p) => {
        let user = self.users.get_mut(&id).ok_or_else(missing)?;
        p.apply(user);
        Ok(Entity::User(user.clone()))
      }
      EntityPatch::Location(p) => {
        let location = self.locations.get_mut(&id).ok_or_else(missing)?;
        p.apply(location);
        Ok(Entity::Location(location.clone()))
      }
      EntityPatch::Visit(p) => {
        let mut visit = self.visits.get(&id).cloned().ok_or_else(missing)?;
        p.apply(&mut visit);
        self.insert_visit(visit.clone());
        Ok(Entity::Visit(visit))
      }
    }
  }

  fn counts(&self) -> StoreCounts {
    StoreCounts {
      users:     self.users.len(),
      locations: self.locations.len(),
      visits:    self.visits.len(),
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A travels dataset held entirely in memory.
///
/// Cloning is cheap; the tables are reference-counted and shared.
#[derive(Clone, Default)]
pub struct MemoryStore {
  tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
  /// An empty store.
  pub fn new() -> Self { Self::default() }
}

impl std::fmt::Debug for MemoryStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MemoryStore")
      .field("counts", &self.counts())
      .finish()
  }
}

// ─── DatasetStore impl ───────────────────────────────────────────────────────

impl DatasetStore for MemoryStore {
  // ── Records ───────────────────────────────────────────────────────────────

  fn get(&self, kind: EntityKind, id: u32) -> Result<Entity> {
    self
      .tables
      .read()
      .get(kind, id)
      .ok_or_else(|| Error::not_found(kind, id))
  }

  fn put(&self, entity: Entity) {
    tracing::debug!(kind = %entity.kind(), id = entity.id(), "put");
    self.tables.write().insert(entity);
  }

  fn bulk_put(&self, entities: Vec<Entity>) -> usize {
    let count = entities.len();
    let mut tables = self.tables.write();
    for entity in entities {
      tables.insert(entity);
    }
    let totals = tables.counts();
    drop(tables);

    tracing::debug!(
      applied = count,
      users = totals.users,
      locations = totals.locations,
      visits = totals.visits,
      "bulk put"
    );
    count
  }

  fn update(&self, id: u32, patch: EntityPatch) -> Result<Entity> {
    tracing::debug!(kind = %patch.kind(), id, "update");
    self.tables.write().apply(id, patch)
  }

  fn counts(&self) -> StoreCounts { self.tables.read().counts() }

  // ── Queries ───────────────────────────────────────────────────────────────

  fn query_user_visits(
    &self,
    id: u32,
    predicate: &Predicate,
  ) -> Result<Vec<VisitSummary>> {
    self.tables.read().user_visits(id, predicate)
  }

  fn query_location_average(
    &self,
    id: u32,
    predicate: &Predicate,
  ) -> Result<AverageMark> {
    self.tables.read().location_average(id, predicate)
  }
}
