//! Query execution over the locked [`Tables`].
//!
//! Both queries are anchored on one record that must exist. They walk the
//! matching foreign-key index, join each visit with the entity on its other
//! side, and skip visits whose reference does not resolve yet.

use travels_core::{
  Error, Result,
  entity::EntityKind,
  filter::{Candidate, Predicate},
  store::{AverageMark, VisitSummary},
};

use crate::store::Tables;

impl Tables {
  /// Visits of `user_id` accepted by `predicate`, ordered by `visited_at`.
  /// Ties keep index insertion order.
  pub(crate) fn user_visits(
    &self,
    user_id: u32,
    predicate: &Predicate,
  ) -> Result<Vec<VisitSummary>> {
    let user = self
      .users
      .get(&user_id)
      .ok_or_else(|| Error::not_found(EntityKind::User, user_id))?;

    let mut rows: Vec<VisitSummary> = self
      .visits_by_user
      .get(user_id)
      .iter()
      .filter_map(|visit_id| self.visits.get(visit_id))
      .filter_map(|visit| {
        let location = self.locations.get(&visit.location)?;
        Some(Candidate { visit, location, user })
      })
      .filter(|candidate| predicate.matches(candidate))
      .map(|c| VisitSummary {
        mark:       c.visit.mark,
        visited_at: c.visit.visited_at,
        place:      c.location.place.clone(),
      })
      .collect();

    rows.sort_by_key(|row| row.visited_at);
    Ok(rows)
  }

  /// Mean mark of the visits to `location_id` accepted by `predicate`.
  pub(crate) fn location_average(
    &self,
    location_id: u32,
    predicate: &Predicate,
  ) -> Result<AverageMark> {
    let location = self
      .locations
      .get(&location_id)
      .ok_or_else(|| Error::not_found(EntityKind::Location, location_id))?;

    let (sum, count) = self
      .visits_by_location
      .get(location_id)
      .iter()
      .filter_map(|visit_id| self.visits.get(visit_id))
      .filter_map(|visit| {
        let user = self.users.get(&visit.user)?;
        Some(Candidate { visit, location, user })
      })
      .filter(|candidate| predicate.matches(candidate))
      .fold((0_i64, 0_u64), |(sum, count), c| {
        (sum + i64::from(c.visit.mark), count + 1)
      });

    Ok(AverageMark::from_total(sum, count))
  }
}
