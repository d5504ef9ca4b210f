//! Shared models and read-view logic for the Playlist backend
//!
//! Pure data and aggregation; the backend crate does all I/O.

pub mod library;
pub mod models;
pub mod query;

pub use library::*;
pub use models::*;
pub use query::*;
