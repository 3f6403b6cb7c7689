use async_trait::async_trait;

use crate::error::Result;
use crate::model::{NewStudent, StudentId, StudentPatch, StudentRecord};

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Backing storage for student records.
///
/// Implementations assign ids on `create` and never reuse them. They persist
/// whatever grade they are handed; keeping it in line with the marks is the
/// caller's job.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Snapshot of every record, in insertion order.
    async fn list_all(&self) -> Result<Vec<StudentRecord>>;

    async fn create(&self, student: NewStudent) -> Result<StudentRecord>;

    /// Merges `patch` into the stored record. Fails with `NotFound` for an
    /// unknown id.
    async fn update(&self, id: StudentId, patch: StudentPatch) -> Result<StudentRecord>;

    /// Returns the deleted id. Fails with `NotFound` for an unknown id.
    async fn delete(&self, id: StudentId) -> Result<StudentId>;

    async fn get_by_id(&self, id: StudentId) -> Result<Option<StudentRecord>>;

    /// Short name reported by `health`.
    fn backend(&self) -> &'static str;
}
