//! Durable key-value mirror of the in-memory store.
//!
//! The workspace database holds exactly four entries, one per collection,
//! each a JSON-serialized array. An entry is read once when the workspace
//! is selected and rewritten wholesale after every mutation of its
//! collection.

use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::model::{AttendanceRecord, AttendanceStatus, Student, Teacher};
use crate::store::{ChangeListener, Collections, Kind};

pub const DB_FILE: &str = "schooldesk.sqlite3";

pub fn open_store_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let conn = Connection::open(workspace.join(DB_FILE))?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS collections(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;
    Ok(conn)
}

/// Load all four collections, falling back to the seed data for entries
/// that were never written. Grades seed empty. There is no schema version
/// field; stored text that fails to parse surfaces here.
pub fn load_collections(conn: &Connection) -> anyhow::Result<Collections> {
    Ok(Collections {
        students: load_or_seed(conn, Kind::Students.key(), seed_students)?,
        teachers: load_or_seed(conn, Kind::Teachers.key(), seed_teachers)?,
        attendance: load_or_seed(conn, Kind::Attendance.key(), seed_attendance)?,
        grades: load_or_seed(conn, Kind::Grades.key(), Vec::new)?,
    })
}

fn load_or_seed<T, F>(conn: &Connection, key: &str, seed: F) -> anyhow::Result<Vec<T>>
where
    T: DeserializeOwned,
    F: FnOnce() -> Vec<T>,
{
    let stored: Option<String> = conn
        .query_row("SELECT value FROM collections WHERE key = ?", [key], |r| {
            r.get(0)
        })
        .optional()?;
    match stored {
        Some(text) => serde_json::from_str(&text)
            .with_context(|| format!("stored `{key}` entry is not a valid collection")),
        None => Ok(seed()),
    }
}

fn write_entry(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO collections(key, value) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value),
    )?;
    Ok(())
}

/// The production change listener: serializes the changed collection and
/// overwrites its entry. A write failure is logged and otherwise ignored;
/// the in-memory mutation has already happened and there is no recovery
/// path for a torn mirror.
pub struct SqliteMirror {
    conn: Connection,
}

impl SqliteMirror {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    fn mirror<T: Serialize>(&self, key: &str, collection: &[T]) -> anyhow::Result<()> {
        let json = serde_json::to_string(collection)?;
        write_entry(&self.conn, key, &json)?;
        Ok(())
    }
}

impl ChangeListener for SqliteMirror {
    fn collection_changed(&self, kind: Kind, data: &Collections) {
        let outcome = match kind {
            Kind::Students => self.mirror(kind.key(), &data.students),
            Kind::Teachers => self.mirror(kind.key(), &data.teachers),
            Kind::Attendance => self.mirror(kind.key(), &data.attendance),
            Kind::Grades => self.mirror(kind.key(), &data.grades),
        };
        if let Err(e) = outcome {
            log::error!("failed to mirror `{}` to durable storage: {e:#}", kind.key());
        }
    }
}

// Seed data for a fresh workspace, transliterated from the original
// demonstration roster. Seed ids are plain ordinals; generated records
// get UUIDs.

pub const SEED_ATTENDANCE_DATE: &str = "2024-01-15";

fn seed_students() -> Vec<Student> {
    vec![
        Student {
            id: "1".into(),
            name: "Ahmed Mohammed Ali".into(),
            student_id: "STD001".into(),
            grade: "Grade 6".into(),
            class: "A".into(),
            date_of_birth: "2012-03-15".into(),
            parent_name: "Mohammed Ali".into(),
            parent_phone: "0501234567".into(),
            address: "Al Naseem District".into(),
            photo: None,
            enrollment_date: "2023-09-01".into(),
        },
        Student {
            id: "2".into(),
            name: "Fatima Ahmed Hassan".into(),
            student_id: "STD002".into(),
            grade: "Grade 5".into(),
            class: "B".into(),
            date_of_birth: "2013-07-22".into(),
            parent_name: "Ahmed Hassan".into(),
            parent_phone: "0509876543".into(),
            address: "Al Rawda District".into(),
            photo: None,
            enrollment_date: "2023-09-01".into(),
        },
        Student {
            id: "3".into(),
            name: "Mohammed Abdullah Salem".into(),
            student_id: "STD003".into(),
            grade: "Grade 6".into(),
            class: "A".into(),
            date_of_birth: "2012-11-08".into(),
            parent_name: "Abdullah Salem".into(),
            parent_phone: "0502223344".into(),
            address: "Al Olaya District".into(),
            photo: None,
            enrollment_date: "2023-09-01".into(),
        },
    ]
}

fn seed_teachers() -> Vec<Teacher> {
    vec![
        Teacher {
            id: "1".into(),
            name: "Khalid Al-Saad".into(),
            teacher_id: "TCH001".into(),
            subject: "Mathematics".into(),
            phone: "0551112222".into(),
            email: "khalid@school.edu".into(),
            hire_date: "2019-09-01".into(),
            salary: 4500,
            classes: vec!["Grade 6 A".into(), "Grade 6 B".into()],
        },
        Teacher {
            id: "2".into(),
            name: "Mona Al-Harbi".into(),
            teacher_id: "TCH002".into(),
            subject: "Arabic Language".into(),
            phone: "0553334444".into(),
            email: "mona@school.edu".into(),
            hire_date: "2021-09-01".into(),
            salary: 4200,
            classes: vec!["Grade 5 B".into()],
        },
    ]
}

fn seed_attendance() -> Vec<AttendanceRecord> {
    vec![
        AttendanceRecord {
            id: "1".into(),
            student_id: "STD001".into(),
            student_name: "Ahmed Mohammed Ali".into(),
            date: SEED_ATTENDANCE_DATE.into(),
            status: AttendanceStatus::Present,
            grade: "Grade 6".into(),
            class: "A".into(),
            notes: String::new(),
        },
        AttendanceRecord {
            id: "2".into(),
            student_id: "STD002".into(),
            student_name: "Fatima Ahmed Hassan".into(),
            date: SEED_ATTENDANCE_DATE.into(),
            status: AttendanceStatus::Late,
            grade: "Grade 5".into(),
            class: "B".into(),
            notes: "arrived 20 minutes late".into(),
        },
    ]
}
