pub mod client;
pub mod config;
mod db;
pub mod error;
pub mod grade;
pub mod ipc;
pub mod model;
pub mod session;
pub mod store;

pub use client::{InvalidationPolicy, RecordStoreClient, RetryPolicy};
pub use error::{Error, Result, ValidationError};
pub use grade::{derive_grade, Grade};
pub use model::{NewStudent, Section, StudentId, StudentPatch, StudentRecord};
pub use session::{Mode, Session};
pub use store::{InMemoryStore, SqliteStore, StudentStore};
