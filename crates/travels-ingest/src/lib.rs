//! Bulk loading of a travels archive into a [`DatasetStore`].
//!
//! Members are classified by name, decoded from JSON, and only once every
//! member has decoded cleanly are all records handed to the store in a single
//! [`DatasetStore::bulk_put`]. A failure anywhere leaves the store untouched.
//! No cross-reference checks happen here; the store resolves references when
//! it is queried.

mod archive;
mod decode;

pub mod error;

use std::path::Path;

use travels_core::{entity::EntityKind, store::DatasetStore};

pub use archive::{ArchiveMember, read_archive, read_dir, read_zip};
pub use decode::{classify, decode};
pub use error::{Error, Result};

/// What an ingestion loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
  pub members_loaded:  usize,
  pub members_skipped: usize,
  pub users:           usize,
  pub locations:       usize,
  pub visits:          usize,
}

impl IngestReport {
  pub fn records(&self) -> usize { self.users + self.locations + self.visits }

  fn count(&mut self, kind: EntityKind, n: usize) {
    match kind {
      EntityKind::User => self.users += n,
      EntityKind::Location => self.locations += n,
      EntityKind::Visit => self.visits += n,
    }
  }
}

/// Decode every member, then bulk-load the records into `store`.
pub fn ingest<S, I>(store: &S, members: I) -> Result<IngestReport>
where
  S: DatasetStore + ?Sized,
  I: IntoIterator<Item = ArchiveMember>,
{
  let mut report = IngestReport::default();
  let mut entities = Vec::new();

  for member in members {
    let Some(kind) = classify(&member.name) else {
      tracing::debug!(member = %member.name, "skipping unrecognised member");
      report.members_skipped += 1;
      continue;
    };
    let records = decode(kind, &member)?;
    tracing::info!(member = %member.name, %kind, records = records.len(), "load");
    report.count(kind, records.len());
    report.members_loaded += 1;
    entities.extend(records);
  }

  let applied = store.bulk_put(entities);
  tracing::info!(
    applied,
    users = report.users,
    locations = report.locations,
    visits = report.visits,
    "data load complete"
  );
  Ok(report)
}

/// [`read_archive`] followed by [`ingest`].
pub fn ingest_archive<S>(store: &S, path: &Path) -> Result<IngestReport>
where
  S: DatasetStore + ?Sized,
{
  let members = read_archive(path)?;
  tracing::info!(path = %path.display(), members = members.len(), "archive opened");
  ingest(store, members)
}

#[cfg(test)]
mod tests {
  use std::io::{Cursor, Write};

  use travels_core::entity::{Entity, Gender, Location, User, Visit};
  use travels_store_memory::MemoryStore;
  use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

  use super::*;

  const USERS: &str = r#"{"users":[
    {"id":1,"email":"ann@example.com","first_name":"Ann","last_name":"Lee","gender":"f","birth_date":-712108800},
    {"id":2,"email":"bob@example.com","first_name":"Bob","last_name":"Ray","gender":"m","birth_date":600000000}
  ]}"#;
  const LOCATIONS: &str = r#"{"locations":[
    {"id":10,"place":"Museum","country":"X","city":"Y","distance":5}
  ]}"#;
  const VISITS: &str = r#"{"visits":[
    {"id":100,"location":10,"user":1,"visited_at":1000,"mark":4},
    {"id":101,"location":10,"user":2,"visited_at":2000,"mark":1}
  ]}"#;

  fn zip_bytes(members: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
      .add_directory("data/", SimpleFileOptions::default())
      .unwrap();
    for (name, body) in members {
      writer
        .start_file(*name, SimpleFileOptions::default())
        .unwrap();
      writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
  }

  #[test]
  fn ingest_loads_every_kind_regardless_of_order() {
    let store = MemoryStore::new();
    // Visits first: references resolve when queried, not when loaded.
    let report = ingest(&store, vec![
      ArchiveMember::new("visits_1.json", VISITS),
      ArchiveMember::new("locations_1.json", LOCATIONS),
      ArchiveMember::new("users_1.json", USERS),
      ArchiveMember::new("options.txt", "1503695452\n1"),
    ])
    .unwrap();

    assert_eq!(report, IngestReport {
      members_loaded:  3,
      members_skipped: 1,
      users:           2,
      locations:       1,
      visits:          2,
    });
    assert_eq!(report.records(), 5);
    assert_eq!(store.counts().visits, 2);
    assert_eq!(
      store
        .average_mark_for_location(10, &Default::default())
        .unwrap()
        .to_string(),
      "2.50000"
    );
  }

  #[test]
  fn ingested_records_round_trip_by_id() {
    let store = MemoryStore::new();
    ingest(&store, vec![
      ArchiveMember::new("users_1.json", USERS),
      ArchiveMember::new("locations_1.json", LOCATIONS),
      ArchiveMember::new("visits_1.json", VISITS),
    ])
    .unwrap();

    assert_eq!(store.user(1).unwrap(), User {
      id:         1,
      email:      "ann@example.com".into(),
      first_name: "Ann".into(),
      last_name:  "Lee".into(),
      gender:     Gender::Female,
      birth_date: -712_108_800,
    });
    assert_eq!(store.location(10).unwrap(), Location {
      id:       10,
      place:    "Museum".into(),
      country:  "X".into(),
      city:     "Y".into(),
      distance: 5,
    });
    assert_eq!(
      store.get(EntityKind::Visit, 101).unwrap(),
      Entity::Visit(Visit {
        id:         101,
        location:   10,
        user:       2,
        visited_at: 2000,
        mark:       1,
      })
    );
  }

  #[test]
  fn one_bad_member_aborts_everything() {
    let store = MemoryStore::new();
    let err = ingest(&store, vec![
      ArchiveMember::new("users_1.json", USERS),
      ArchiveMember::new("locations_1.json", LOCATIONS),
      ArchiveMember::new("visits_1.json", r#"{"visits":[{"id":1}]}"#),
    ])
    .unwrap_err();

    assert!(matches!(err, Error::Decode { ref member, .. } if member == "visits_1.json"));
    assert_eq!(store.counts(), Default::default());
  }

  #[test]
  fn zip_archive_members_are_read_in_order() {
    let bytes = zip_bytes(&[
      ("data/users_1.json", USERS),
      ("data/locations_1.json", LOCATIONS),
      ("data/visits_1.json", VISITS),
    ]);
    let members = read_zip(Cursor::new(bytes)).unwrap();
    let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, [
      "data/users_1.json",
      "data/locations_1.json",
      "data/visits_1.json"
    ]);
    assert_eq!(members[1].data, LOCATIONS.as_bytes());
  }

  #[test]
  fn ingest_archive_from_zip_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file
      .write_all(&zip_bytes(&[("users_1.json", USERS), ("visits_1.json", VISITS)]))
      .unwrap();
    file.flush().unwrap();

    let store = MemoryStore::new();
    let report = ingest_archive(&store, file.path()).unwrap();
    assert_eq!(report.users, 2);
    assert_eq!(report.visits, 2);
  }

  #[test]
  fn ingest_archive_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("visits_1.json"), VISITS).unwrap();
    std::fs::write(dir.path().join("users_1.json"), USERS).unwrap();
    std::fs::write(dir.path().join("locations_1.json"), LOCATIONS).unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();

    let members = read_dir(dir.path()).unwrap();
    let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["locations_1.json", "users_1.json", "visits_1.json"]);

    let store = MemoryStore::new();
    let report = ingest_archive(&store, dir.path()).unwrap();
    assert_eq!(report.records(), 5);
    assert_eq!(store.visits_for_user(1, &Default::default()).unwrap().len(), 1);
  }

  #[test]
  fn missing_archive_is_an_io_error() {
    let store = MemoryStore::new();
    let err = ingest_archive(&store, Path::new("/nonexistent/data.zip"))
      .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
  }

  #[test]
  fn inflated_declared_size_reads_real_bytes() {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let stored =
      SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    writer.start_file("users_1.json", stored).unwrap();
    writer.write_all(USERS.as_bytes()).unwrap();
    let mut bytes = writer.finish().unwrap().into_inner();

    // Uncompressed size field of the central directory entry.
    let central = bytes
      .windows(4)
      .position(|w| w == b"PK\x01\x02")
      .unwrap();
    bytes[central + 24..central + 28]
      .copy_from_slice(&0xFFFF_FFF0_u32.to_le_bytes());

    let members = read_zip(Cursor::new(bytes)).unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].data, USERS.as_bytes());
  }

  #[test]
  fn garbage_archive_is_rejected() {
    let err = read_zip(Cursor::new(b"not a zip".to_vec())).unwrap_err();
    assert!(matches!(err, Error::Archive(_)));
  }
}
