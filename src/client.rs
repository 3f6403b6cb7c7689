use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::model::{NewStudent, StudentId, StudentPatch, StudentRecord};
use crate::store::StudentStore;

/// What happens to the cached list after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidationPolicy {
    /// Clear the cache; the caller must `load` again to see the change.
    #[default]
    ClearOnMutate,
    /// Patch the cache with the mutation result instead of clearing it.
    /// A cache that was never loaded stays unloaded.
    PatchInPlace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

/// Record Store Client: the only way the UI layer touches the store.
///
/// Holds the client-side cached list and a busy flag. Only one operation may
/// be in flight; a second one fails with [`Error::Busy`] without reaching the
/// store.
pub struct RecordStoreClient {
    store: Arc<dyn StudentStore>,
    /// `None` until the first `load`, and again after a clear.
    cache: Mutex<Option<Vec<StudentRecord>>>,
    busy: AtomicBool,
    invalidation: InvalidationPolicy,
    retry: RetryPolicy,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl RecordStoreClient {
    pub fn new(store: Arc<dyn StudentStore>) -> Self {
        RecordStoreClient {
            store,
            cache: Mutex::new(None),
            busy: AtomicBool::new(false),
            invalidation: InvalidationPolicy::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_invalidation(mut self, policy: InvalidationPolicy) -> Self {
        self.invalidation = policy;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub fn invalidation(&self) -> InvalidationPolicy {
        self.invalidation
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Snapshot of the cached list. Empty until the first `load`, and again
    /// after every mutation under `ClearOnMutate`.
    pub fn cached(&self) -> Vec<StudentRecord> {
        self.with_cache(|c| c.clone().unwrap_or_default())
    }

    /// True once a `load` has filled the cache and nothing has cleared it.
    pub fn is_loaded(&self) -> bool {
        self.with_cache(|c| c.is_some())
    }

    pub fn cached_by_id(&self, id: StudentId) -> Option<StudentRecord> {
        self.with_cache(|c| c.as_ref()?.iter().find(|s| s.id == id).cloned())
    }

    pub fn invalidate(&self) {
        self.with_cache(|c| *c = None);
    }

    /// Fetches every record and replaces the cache with the result.
    pub async fn load(&self) -> Result<Vec<StudentRecord>> {
        let _busy = self.begin()?;
        let students = self.retrying("list_all", || self.store.list_all()).await?;
        self.with_cache(|c| *c = Some(students.clone()));
        tracing::debug!(count = students.len(), "loaded students");
        Ok(students)
    }

    /// Fresh read that bypasses and does not touch the cache.
    pub async fn list_all(&self) -> Result<Vec<StudentRecord>> {
        let _busy = self.begin()?;
        self.retrying("list_all", || self.store.list_all()).await
    }

    pub async fn get_by_id(&self, id: StudentId) -> Result<Option<StudentRecord>> {
        let _busy = self.begin()?;
        self.retrying("get_by_id", || self.store.get_by_id(id)).await
    }

    pub async fn create(&self, student: NewStudent) -> Result<StudentRecord> {
        let _busy = self.begin()?;
        student.validate()?;
        let created = self
            .retrying("create", || self.store.create(student.clone()))
            .await?;
        tracing::info!(id = created.id, "student created");
        self.after_mutation(|c| c.push(created.clone()));
        Ok(created)
    }

    pub async fn update(&self, id: StudentId, patch: StudentPatch) -> Result<StudentRecord> {
        let _busy = self.begin()?;
        patch.validate()?;
        let updated = self
            .retrying("update", || self.store.update(id, patch.clone()))
            .await?;
        tracing::info!(id, "student updated");
        self.after_mutation(|c| {
            if let Some(slot) = c.iter_mut().find(|s| s.id == id) {
                *slot = updated.clone();
            }
        });
        Ok(updated)
    }

    pub async fn delete(&self, id: StudentId) -> Result<StudentId> {
        let _busy = self.begin()?;
        let deleted = self.retrying("delete", || self.store.delete(id)).await?;
        tracing::info!(id, "student deleted");
        self.after_mutation(|c| c.retain(|s| s.id != id));
        Ok(deleted)
    }

    fn begin(&self) -> Result<BusyGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("rejected re-entrant store operation");
            return Err(Error::Busy);
        }
        Ok(BusyGuard(&self.busy))
    }

    fn after_mutation(&self, patch: impl FnOnce(&mut Vec<StudentRecord>)) {
        match self.invalidation {
            InvalidationPolicy::ClearOnMutate => {
                self.invalidate();
                tracing::info!("cached list invalidated; reload required");
            }
            InvalidationPolicy::PatchInPlace => self.with_cache(|c| {
                if let Some(students) = c.as_mut() {
                    patch(students);
                }
            }),
        }
    }

    fn with_cache<T>(&self, f: impl FnOnce(&mut Option<Vec<StudentRecord>>) -> T) -> T {
        let mut guard = match self.cache.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    async fn retrying<T, F, Fut>(&self, op: &'static str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.retry.max_attempts.max(1);
        let mut backoff = self.retry.initial_backoff;
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(v) => return Ok(v),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    tracing::warn!(op, attempt, error = %e, "transport failure, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(op, error = %e, "store operation failed");
                    return Err(e);
                }
            }
        }
    }
}
