//! Foreign-key index over visits.

use std::collections::HashMap;

/// Maps a user or location id to the ids of the visits referencing it.
///
/// Each list keeps insertion order and holds a visit id at most once.
#[derive(Debug, Default)]
pub(crate) struct VisitIndex {
  by_key: HashMap<u32, Vec<u32>>,
}

impl VisitIndex {
  /// Visit ids under `key`, oldest insertion first.
  pub fn get(&self, key: u32) -> &[u32] {
    self.by_key.get(&key).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn insert(&mut self, key: u32, visit_id: u32) {
    let ids = self.by_key.entry(key).or_default();
    if !ids.contains(&visit_id) {
      ids.push(visit_id);
    }
  }

  pub fn remove(&mut self, key: u32, visit_id: u32) {
    if let Some(ids) = self.by_key.get_mut(&key) {
      ids.retain(|id| *id != visit_id);
      if ids.is_empty() {
        self.by_key.remove(&key);
      }
    }
  }

  /// Point `visit_id` at `new_key`, dropping it from `old_key` when the key
  /// changed. A visit that stays under the same key keeps its position.
  pub fn relink(&mut self, visit_id: u32, old_key: Option<u32>, new_key: u32) {
    if let Some(old) = old_key
      && old != new_key
    {
      self.remove(old, visit_id);
    }
    self.insert(new_key, visit_id);
  }
}
