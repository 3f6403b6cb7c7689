use async_trait::async_trait;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::StudentStore;
use crate::db;
use crate::error::{Error, Result};
use crate::model::{NewStudent, StudentId, StudentPatch, StudentRecord};

/// Store backed by the workspace's SQLite file.
///
/// The connection lock is only ever held for the duration of a query, never
/// across an await point.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        let conn = db::open_db(workspace)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
            path: Some(workspace.join(db::DB_FILE_NAME)),
        })
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        Ok(SqliteStore {
            conn: Mutex::new(db::open_in_memory()?),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::transport(anyhow::anyhow!("sqlite connection lock poisoned")))
    }
}

#[async_trait]
impl StudentStore for SqliteStore {
    async fn list_all(&self) -> Result<Vec<StudentRecord>> {
        let conn = self.conn()?;
        db::students_list(&conn).map_err(Error::Transport)
    }

    async fn create(&self, student: NewStudent) -> Result<StudentRecord> {
        let conn = self.conn()?;
        let id = db::student_insert(&conn, &student).map_err(Error::Transport)?;
        tracing::debug!(id, "sqlite store: created student");
        Ok(student.with_id(id))
    }

    async fn update(&self, id: StudentId, patch: StudentPatch) -> Result<StudentRecord> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let Some(mut record) = db::student_get(&tx, id).map_err(Error::Transport)? else {
            return Err(Error::NotFound(id));
        };
        record.apply(&patch);
        if !db::student_replace(&tx, &record).map_err(Error::Transport)? {
            return Err(Error::NotFound(id));
        }
        tx.commit()?;
        Ok(record)
    }

    async fn delete(&self, id: StudentId) -> Result<StudentId> {
        let conn = self.conn()?;
        if !db::student_delete(&conn, id).map_err(Error::Transport)? {
            return Err(Error::NotFound(id));
        }
        Ok(id)
    }

    async fn get_by_id(&self, id: StudentId) -> Result<Option<StudentRecord>> {
        let conn = self.conn()?;
        db::student_get(&conn, id).map_err(Error::Transport)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
