//! Music media server library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod deletion;
pub mod media_store;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use deletion::{delete_entity, DeletionReport, EntityType};
pub use media_store::{MediaStore, SqliteMediaStore};
pub use server::{run_server, RequestsLoggingLevel};
