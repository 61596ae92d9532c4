//! Core types and trait definitions for the travels dataset service.
//!
//! This crate has no HTTP or storage dependencies. It holds
//! the three entity shapes, the filter compiler used by the analytical
//! queries, and the [`store::DatasetStore`] abstraction every backend
//! implements.

pub mod entity;
pub mod error;
pub mod filter;
pub mod store;

pub use error::{Error, Result};
