//! Entity types: the three record shapes of the travels dataset.
//!
//! Users and locations stand alone; a visit references exactly one of each
//! by id. References are not checked when a record is written: a visit may
//! arrive before the user or location it points to, and only becomes
//! visible to the analytical queries once both resolve.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Highest mark a visit can carry.
pub const MAX_MARK: u8 = 5;

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The collection an entity belongs to. Displayed as the plural collection
/// name used in archive member names and URL paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
  User,
  Location,
  Visit,
}

impl EntityKind {
  pub const ALL: [EntityKind; 3] =
    [EntityKind::User, EntityKind::Location, EntityKind::Visit];

  pub fn collection(self) -> &'static str {
    match self {
      Self::User => "users",
      Self::Location => "locations",
      Self::Visit => "visits",
    }
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.collection())
  }
}

// ─── User ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
  #[serde(rename = "m")]
  Male,
  #[serde(rename = "f")]
  Female,
}

impl FromStr for Gender {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s {
      "m" => Ok(Self::Male),
      "f" => Ok(Self::Female),
      other => Err(format!("expected \"m\" or \"f\", got {other:?}")),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:         u32,
  pub email:      String,
  pub first_name: String,
  pub last_name:  String,
  pub gender:     Gender,
  /// Seconds since the Unix epoch; may be negative.
  pub birth_date: i64,
}

// ─── Location ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
  pub id:       u32,
  pub place:    String,
  pub country:  String,
  pub city:     String,
  pub distance: u32,
}

// ─── Visit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
  pub id:         u32,
  /// Id of the visited [`Location`].
  pub location:   u32,
  /// Id of the visiting [`User`].
  pub user:       u32,
  pub visited_at: i64,
  pub mark:       u8,
}

fn check_mark(mark: u8) -> Result<()> {
  if mark > MAX_MARK {
    return Err(Error::InvalidRecord(format!(
      "mark {mark} is outside 0..={MAX_MARK}"
    )));
  }
  Ok(())
}

// ─── Entity ──────────────────────────────────────────────────────────────────

/// Any one record of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Entity {
  User(User),
  Location(Location),
  Visit(Visit),
}

impl Entity {
  pub fn kind(&self) -> EntityKind {
    match self {
      Self::User(_) => EntityKind::User,
      Self::Location(_) => EntityKind::Location,
      Self::Visit(_) => EntityKind::Visit,
    }
  }

  pub fn id(&self) -> u32 {
    match self {
      Self::User(u) => u.id,
      Self::Location(l) => l.id,
      Self::Visit(v) => v.id,
    }
  }

  /// Field-level checks for records arriving one at a time. Foreign keys are
  /// not checked.
  pub fn validate(&self) -> Result<()> {
    match self {
      Self::Visit(v) => check_mark(v.mark),
      Self::User(_) | Self::Location(_) => Ok(()),
    }
  }
}

impl From<User> for Entity {
  fn from(u: User) -> Self { Self::User(u) }
}

impl From<Location> for Entity {
  fn from(l: Location) -> Self { Self::Location(l) }
}

impl From<Visit> for Entity {
  fn from(v: Visit) -> Self { Self::Visit(v) }
}

// ─── Patches ─────────────────────────────────────────────────────────────────

/// Partial update of a [`User`]; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
  pub email:      Option<String>,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub gender:     Option<Gender>,
  pub birth_date: Option<i64>,
}

/// Partial update of a [`Location`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LocationPatch {
  pub place:    Option<String>,
  pub country:  Option<String>,
  pub city:     Option<String>,
  pub distance: Option<u32>,
}

/// Partial update of a [`Visit`]. Changing `user` or `location` moves the
/// visit between the foreign-key indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VisitPatch {
  pub location:   Option<u32>,
  pub user:       Option<u32>,
  pub visited_at: Option<i64>,
  pub mark:       Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityPatch {
  User(UserPatch),
  Location(LocationPatch),
  Visit(VisitPatch),
}

impl EntityPatch {
  pub fn kind(&self) -> EntityKind {
    match self {
      Self::User(_) => EntityKind::User,
      Self::Location(_) => EntityKind::Location,
      Self::Visit(_) => EntityKind::Visit,
    }
  }

  pub fn validate(&self) -> Result<()> {
    match self {
      Self::Visit(VisitPatch { mark: Some(mark), .. }) => check_mark(*mark),
      _ => Ok(()),
    }
  }
}

impl UserPatch {
  pub fn apply(self, user: &mut User) {
    if let Some(email) = self.email {
      user.email = email;
    }
    if let Some(first_name) = self.first_name {
      user.first_name = first_name;
    }
    if let Some(last_name) = self.last_name {
      user.last_name = last_name;
    }
    if let Some(gender) = self.gender {
      user.gender = gender;
    }
    if let Some(birth_date) = self.birth_date {
      user.birth_date = birth_date;
    }
  }
}

impl LocationPatch {
  pub fn apply(self, location: &mut Location) {
    if let Some(place) = self.place {
      location.place = place;
    }
    if let Some(country) = self.country {
      location.country = country;
    }
    if let Some(city) = self.city {
      location.city = city;
    }
    if let Some(distance) = self.distance {
      location.distance = distance;
    }
  }
}

impl VisitPatch {
  pub fn apply(self, visit: &mut Visit) {
    if let Some(location) = self.location {
      visit.location = location;
    }
    if let Some(user) = self.user {
      visit.user = user;
    }
    if let Some(visited_at) = self.visited_at {
      visit.visited_at = visited_at;
    }
    if let Some(mark) = self.mark {
      visit.mark = mark;
    }
  }
}
