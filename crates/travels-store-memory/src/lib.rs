//! In-memory backend for the travels dataset store.
//!
//! Three id-keyed collections plus two foreign-key indices over visits, all
//! behind one store-wide [`parking_lot::RwLock`]. Queries share the read
//! side; every write, including a whole bulk load, holds the write side for
//! the full multi-index update.

mod index;
mod query;
mod store;

pub use store::MemoryStore;
