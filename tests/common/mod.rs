#![allow(dead_code)]

pub mod sidecar;

use async_trait::async_trait;
use gradebookd::{
    Error, InMemoryStore, NewStudent, Result, StudentId, StudentPatch, StudentRecord,
    StudentStore,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Seeded in-memory store that can be told to fail the next N calls with a
/// transport error, and counts every call it receives.
pub struct FlakyStore {
    inner: InMemoryStore,
    failures_left: AtomicU32,
    calls: AtomicU32,
}

impl FlakyStore {
    pub fn new(latency: Duration) -> Arc<Self> {
        Arc::new(FlakyStore {
            inner: InMemoryStore::seeded(latency),
            failures_left: AtomicU32::new(0),
            calls: AtomicU32::new(0),
        })
    }

    pub fn fail_next(&self, n: u32) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(Error::transport(anyhow::anyhow!("simulated outage")));
        }
        Ok(())
    }
}

#[async_trait]
impl StudentStore for FlakyStore {
    async fn list_all(&self) -> Result<Vec<StudentRecord>> {
        self.tick()?;
        self.inner.list_all().await
    }

    async fn create(&self, student: NewStudent) -> Result<StudentRecord> {
        self.tick()?;
        self.inner.create(student).await
    }

    async fn update(&self, id: StudentId, patch: StudentPatch) -> Result<StudentRecord> {
        self.tick()?;
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: StudentId) -> Result<StudentId> {
        self.tick()?;
        self.inner.delete(id).await
    }

    async fn get_by_id(&self, id: StudentId) -> Result<Option<StudentRecord>> {
        self.tick()?;
        self.inner.get_by_id(id).await
    }

    fn backend(&self) -> &'static str {
        "flaky"
    }
}
