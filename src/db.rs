use rusqlite::{Connection, Row};
use std::path::Path;

use crate::model::{NewStudent, StudentId, StudentRecord};

pub const DB_FILE_NAME: &str = "gradebook.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> anyhow::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    // AUTOINCREMENT keeps ids from being reused after a delete.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            section TEXT NOT NULL,
            marks INTEGER NOT NULL,
            grade TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;
    Ok(())
}

fn read_student(row: &Row<'_>) -> anyhow::Result<StudentRecord> {
    let id: i64 = row.get(0)?;
    let name: String = row.get(1)?;
    let section: String = row.get(2)?;
    let marks: i64 = row.get(3)?;
    let grade: String = row.get(4)?;
    Ok(StudentRecord {
        id,
        name,
        section: section.parse()?,
        marks,
        grade: grade.parse()?,
    })
}

pub fn students_list(conn: &Connection) -> anyhow::Result<Vec<StudentRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, section, marks, grade
         FROM students
         ORDER BY id",
    )?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(read_student(row)?);
    }
    Ok(out)
}

pub fn student_get(conn: &Connection, id: StudentId) -> anyhow::Result<Option<StudentRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, section, marks, grade
         FROM students
         WHERE id = ?",
    )?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(read_student(row)?)),
        None => Ok(None),
    }
}

pub fn student_insert(conn: &Connection, student: &NewStudent) -> anyhow::Result<StudentId> {
    conn.execute(
        "INSERT INTO students(name, section, marks, grade, updated_at)
         VALUES(?, ?, ?, ?, strftime('%Y-%m-%dT%H:%M:%SZ','now'))",
        (
            &student.name,
            student.section.as_str(),
            student.marks,
            student.grade.label(),
        ),
    )?;
    Ok(conn.last_insert_rowid())
}

/// Overwrites every column but the id. Returns false when no row matched.
pub fn student_replace(conn: &Connection, record: &StudentRecord) -> anyhow::Result<bool> {
    let changed = conn.execute(
        "UPDATE students
         SET name = ?, section = ?, marks = ?, grade = ?,
             updated_at = strftime('%Y-%m-%dT%H:%M:%SZ','now')
         WHERE id = ?",
        (
            &record.name,
            record.section.as_str(),
            record.marks,
            record.grade.label(),
            record.id,
        ),
    )?;
    Ok(changed > 0)
}

pub fn student_delete(conn: &Connection, id: StudentId) -> anyhow::Result<bool> {
    let changed = conn.execute("DELETE FROM students WHERE id = ?", [id])?;
    Ok(changed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Section;

    #[test]
    fn schema_init_is_idempotent() {
        let conn = open_in_memory().expect("open");
        init_schema(&conn).expect("second init");
        student_insert(&conn, &NewStudent::graded("Eve", Section::B, 40)).expect("insert");
        assert_eq!(students_list(&conn).expect("list").len(), 1);
    }

    #[test]
    fn insert_stamps_updated_at() {
        let conn = open_in_memory().expect("open");
        let id = student_insert(&conn, &NewStudent::graded("Eve", Section::B, 40)).expect("insert");
        let stamp: Option<String> = conn
            .query_row("SELECT updated_at FROM students WHERE id = ?", [id], |r| {
                r.get(0)
            })
            .expect("query");
        assert!(stamp.is_some_and(|s| s.ends_with('Z')));
    }
}
