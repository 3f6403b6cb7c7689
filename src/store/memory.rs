use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;

use super::StudentStore;
use crate::error::{Error, Result};
use crate::model::{seed_students, NewStudent, StudentId, StudentPatch, StudentRecord};

struct Inner {
    students: Vec<StudentRecord>,
    next_id: StudentId,
}

/// Process-local store. Every call waits `latency` first to mimic a round trip.
pub struct InMemoryStore {
    inner: Mutex<Inner>,
    latency: Duration,
}

impl InMemoryStore {
    pub fn new(latency: Duration) -> Self {
        Self::with_students(Vec::new(), latency)
    }

    pub fn seeded(latency: Duration) -> Self {
        Self::with_students(seed_students(), latency)
    }

    pub fn with_students(students: Vec<StudentRecord>, latency: Duration) -> Self {
        let next_id = students.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        InMemoryStore {
            inner: Mutex::new(Inner { students, next_id }),
            latency,
        }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl StudentStore for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<StudentRecord>> {
        self.simulate_latency().await;
        Ok(self.inner.lock().await.students.clone())
    }

    async fn create(&self, student: NewStudent) -> Result<StudentRecord> {
        self.simulate_latency().await;
        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        inner.next_id += 1;
        let record = student.with_id(id);
        inner.students.push(record.clone());
        tracing::debug!(id, "memory store: created student");
        Ok(record)
    }

    async fn update(&self, id: StudentId, patch: StudentPatch) -> Result<StudentRecord> {
        self.simulate_latency().await;
        let mut inner = self.inner.lock().await;
        let Some(record) = inner.students.iter_mut().find(|s| s.id == id) else {
            return Err(Error::NotFound(id));
        };
        record.apply(&patch);
        Ok(record.clone())
    }

    async fn delete(&self, id: StudentId) -> Result<StudentId> {
        self.simulate_latency().await;
        let mut inner = self.inner.lock().await;
        let before = inner.students.len();
        inner.students.retain(|s| s.id != id);
        if inner.students.len() == before {
            return Err(Error::NotFound(id));
        }
        Ok(id)
    }

    async fn get_by_id(&self, id: StudentId) -> Result<Option<StudentRecord>> {
        self.simulate_latency().await;
        let inner = self.inner.lock().await;
        Ok(inner.students.iter().find(|s| s.id == id).cloned())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
