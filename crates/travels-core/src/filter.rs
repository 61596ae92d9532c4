//! Filter compilation for the analytical queries.
//!
//! Requests carry optional, independently specified filter parameters as raw
//! strings. [`Predicate::compile`] turns them into a typed list of
//! [`Constraint`]s that is evaluated by direct field comparison against a
//! joined visit, location and user. Absent parameters add no constraint;
//! present ones are conjoined.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::{
  Error, Result,
  entity::{Gender, Location, User, Visit},
};

/// Raw filter parameters as decoded from a query string.
pub type FilterParams = HashMap<String, String>;

// ─── Scope ───────────────────────────────────────────────────────────────────

/// Which analytical query a filter set is compiled for. Each query only
/// understands a subset of the filter names; the rest are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterScope {
  /// Visits of one user, joined with their locations.
  UserVisits,
  /// Visits of one location, joined with their users.
  LocationAverage,
}

impl FilterScope {
  /// Recognised parameters, in the order they are parsed.
  pub fn filter_names(self) -> &'static [FilterName] {
    match self {
      Self::UserVisits => &[
        FilterName::FromDate,
        FilterName::ToDate,
        FilterName::Country,
        FilterName::ToDistance,
      ],
      Self::LocationAverage => &[
        FilterName::FromDate,
        FilterName::ToDate,
        FilterName::FromAge,
        FilterName::ToAge,
        FilterName::Gender,
      ],
    }
  }
}

/// A filter parameter understood by at least one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterName {
  FromDate,
  ToDate,
  Country,
  ToDistance,
  FromAge,
  ToAge,
  Gender,
}

impl FilterName {
  /// The query-string key.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::FromDate => "fromDate",
      Self::ToDate => "toDate",
      Self::Country => "country",
      Self::ToDistance => "toDistance",
      Self::FromAge => "fromAge",
      Self::ToAge => "toAge",
      Self::Gender => "gender",
    }
  }
}

// ─── Constraint ──────────────────────────────────────────────────────────────

/// One compiled filter. All bounds are strict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
  VisitedAfter(i64),
  VisitedBefore(i64),
  Country(String),
  DistanceBelow(i64),
  Gender(Gender),
  AgeAbove(i64),
  AgeBelow(i64),
}

/// A visit together with the location and user it references.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
  pub visit:    &'a Visit,
  pub location: &'a Location,
  pub user:     &'a User,
}

impl Constraint {
  fn parse(name: FilterName, raw: &str) -> Result<Self> {
    let key = name.as_str();
    match name {
      FilterName::FromDate => parse_int(key, raw).map(Self::VisitedAfter),
      FilterName::ToDate => parse_int(key, raw).map(Self::VisitedBefore),
      FilterName::ToDistance => parse_int(key, raw).map(Self::DistanceBelow),
      FilterName::FromAge => parse_int(key, raw).map(Self::AgeAbove),
      FilterName::ToAge => parse_int(key, raw).map(Self::AgeBelow),
      FilterName::Country if raw.is_empty() => {
        Err(bad_filter(key, raw, "empty value"))
      }
      FilterName::Country => Ok(Self::Country(raw.to_owned())),
      FilterName::Gender => raw
        .parse::<Gender>()
        .map(Self::Gender)
        .map_err(|reason| bad_filter(key, raw, reason)),
    }
  }

  fn holds(&self, c: &Candidate<'_>, now: DateTime<Utc>) -> bool {
    match self {
      Self::VisitedAfter(t) => c.visit.visited_at > *t,
      Self::VisitedBefore(t) => c.visit.visited_at < *t,
      Self::Country(country) => c.location.country == *country,
      Self::DistanceBelow(d) => i64::from(c.location.distance) < *d,
      Self::Gender(g) => c.user.gender == *g,
      Self::AgeAbove(years) => {
        age_at(c.user.birth_date, now).is_some_and(|age| age > *years)
      }
      Self::AgeBelow(years) => {
        age_at(c.user.birth_date, now).is_some_and(|age| age < *years)
      }
    }
  }
}

fn bad_filter(name: &str, raw: &str, reason: impl Into<String>) -> Error {
  Error::BadFilter {
    name:   name.to_owned(),
    value:  raw.to_owned(),
    reason: reason.into(),
  }
}

fn parse_int(name: &str, raw: &str) -> Result<i64> {
  raw
    .parse::<i64>()
    .map_err(|e| bad_filter(name, raw, e.to_string()))
}

/// Whole calendar years from `birth_date` (epoch seconds) to `now`.
///
/// Returns `None` when the birth date lies outside the representable range.
pub fn age_at(birth_date: i64, now: DateTime<Utc>) -> Option<i64> {
  let born = DateTime::<Utc>::from_timestamp(birth_date, 0)?;
  let mut years = i64::from(now.year()) - i64::from(born.year());
  let not_yet = (now.month(), now.day(), now.num_seconds_from_midnight())
    < (born.month(), born.day(), born.num_seconds_from_midnight());
  if not_yet {
    years -= 1;
  }
  Some(years)
}

// ─── Predicate ───────────────────────────────────────────────────────────────

/// A conjunction of [`Constraint`]s evaluated at a fixed instant.
#[derive(Debug, Clone)]
pub struct Predicate {
  constraints: Vec<Constraint>,
  now:         DateTime<Utc>,
}

impl Predicate {
  /// Compile the parameters `scope` recognises. The first malformed value in
  /// [`FilterScope::filter_names`] order is reported as
  /// [`Error::BadFilter`].
  pub fn compile(
    scope: FilterScope,
    params: &FilterParams,
    now: DateTime<Utc>,
  ) -> Result<Self> {
    let constraints = scope
      .filter_names()
      .iter()
      .filter_map(|name| params.get(name.as_str()).map(|raw| (*name, raw)))
      .map(|(name, raw)| Constraint::parse(name, raw))
      .collect::<Result<Vec<_>>>()?;
    Ok(Self { constraints, now })
  }

  pub fn matches(&self, candidate: &Candidate<'_>) -> bool {
    self
      .constraints
      .iter()
      .all(|c| c.holds(candidate, self.now))
  }
}
