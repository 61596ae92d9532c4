//! Member classification and shard decoding.

use serde::Deserialize;
use travels_core::entity::{Entity, EntityKind, Location, User, Visit};

use crate::{ArchiveMember, Error, Result};

#[derive(Deserialize)]
struct UsersShard {
  users: Vec<User>,
}

#[derive(Deserialize)]
struct LocationsShard {
  locations: Vec<Location>,
}

#[derive(Deserialize)]
struct VisitsShard {
  visits: Vec<Visit>,
}

/// The entity kind a member holds, judged by the prefix of its base name
/// (`users_1.json`, `data/visits_3.json`, ...). `None` for anything else.
pub fn classify(name: &str) -> Option<EntityKind> {
  let base = name.rsplit('/').next().unwrap_or(name);
  EntityKind::ALL
    .into_iter()
    .find(|kind| base.starts_with(kind.collection()))
}

fn into_entities<T: Into<Entity>>(records: Vec<T>) -> Vec<Entity> {
  records.into_iter().map(Into::into).collect()
}

/// Decode a member's JSON shard of `kind` records.
pub fn decode(kind: EntityKind, member: &ArchiveMember) -> Result<Vec<Entity>> {
  let data = member.data.as_ref();
  let decoded = match kind {
    EntityKind::User => serde_json::from_slice::<UsersShard>(data)
      .map(|shard| into_entities(shard.users)),
    EntityKind::Location => serde_json::from_slice::<LocationsShard>(data)
      .map(|shard| into_entities(shard.locations)),
    EntityKind::Visit => serde_json::from_slice::<VisitsShard>(data)
      .map(|shard| into_entities(shard.visits)),
  };
  decoded.map_err(|source| Error::Decode {
    member: member.name.clone(),
    source,
  })
}
