//! In-memory record store.
//!
//! The four collections live here and are mutated only through the
//! reconciler methods below. Every mutation notifies the registered
//! change listeners with the collection that changed; the durable-storage
//! mirror in `db` is one such listener.

use serde::Deserialize;
use uuid::Uuid;

use crate::model::{AttendanceRecord, AttendanceStatus, ExamType, Grade, Student, Teacher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Students,
    Teachers,
    Attendance,
    Grades,
}

impl Kind {
    /// Key of the collection's entry in durable storage.
    pub fn key(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Teachers => "teachers",
            Self::Attendance => "attendance",
            Self::Grades => "grades",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub students: Vec<Student>,
    pub teachers: Vec<Teacher>,
    pub attendance: Vec<AttendanceRecord>,
    pub grades: Vec<Grade>,
}

pub trait ChangeListener {
    fn collection_changed(&self, kind: Kind, data: &Collections);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    MissingField(&'static str),
    BadValue(&'static str, &'static str),
    DuplicateBusinessKey { field: &'static str, value: String },
    NotFound(&'static str),
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentDraft {
    pub name: String,
    pub student_id: String,
    pub grade: String,
    pub class: String,
    pub date_of_birth: String,
    pub parent_name: String,
    pub parent_phone: String,
    pub address: String,
    pub photo: Option<String>,
    pub enrollment_date: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub student_id: Option<String>,
    pub grade: Option<String>,
    pub class: Option<String>,
    pub date_of_birth: Option<String>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub address: Option<String>,
    pub photo: Option<String>,
    pub enrollment_date: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeacherDraft {
    pub name: String,
    pub teacher_id: String,
    pub subject: String,
    pub phone: String,
    pub email: String,
    pub hire_date: String,
    pub salary: i64,
    pub classes: Vec<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeacherPatch {
    pub name: Option<String>,
    pub teacher_id: Option<String>,
    pub subject: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub hire_date: Option<String>,
    pub salary: Option<i64>,
    pub classes: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GradeDraft {
    pub student_id: String,
    pub subject: String,
    pub exam_type: Option<ExamType>,
    pub score: Option<i64>,
    pub max_score: Option<i64>,
    pub date: String,
    pub teacher_id: String,
    pub notes: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GradePatch {
    pub student_id: Option<String>,
    pub student_name: Option<String>,
    pub subject: Option<String>,
    pub exam_type: Option<ExamType>,
    pub score: Option<i64>,
    pub max_score: Option<i64>,
    pub date: Option<String>,
    pub grade: Option<String>,
    pub class: Option<String>,
    pub teacher_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AttendanceMark {
    pub student_id: String,
    pub date: String,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

pub struct Store {
    data: Collections,
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl Store {
    pub fn new(data: Collections) -> Self {
        Self {
            data,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    pub fn data(&self) -> &Collections {
        &self.data
    }

    fn notify(&self, kind: Kind) {
        for listener in &self.listeners {
            listener.collection_changed(kind, &self.data);
        }
    }

    // ---- students ----

    pub fn create_student(&mut self, draft: StudentDraft) -> Result<Student, StoreError> {
        let name = required(&draft.name, "name")?;
        let student_id = required(&draft.student_id, "studentId")?;
        let grade = required(&draft.grade, "grade")?;
        if self.data.students.iter().any(|s| s.student_id == student_id) {
            return Err(StoreError::DuplicateBusinessKey {
                field: "studentId",
                value: student_id,
            });
        }

        let student = Student {
            id: new_id(),
            name,
            student_id,
            grade,
            class: draft.class,
            date_of_birth: draft.date_of_birth,
            parent_name: draft.parent_name,
            parent_phone: draft.parent_phone,
            address: draft.address,
            photo: draft.photo,
            enrollment_date: draft.enrollment_date,
        };
        self.data.students.push(student.clone());
        self.notify(Kind::Students);
        Ok(student)
    }

    pub fn update_student(&mut self, id: &str, patch: StudentPatch) -> Result<Student, StoreError> {
        let idx = self
            .data
            .students
            .iter()
            .position(|s| s.id == id)
            .ok_or(StoreError::NotFound("student"))?;

        let name = patch.name.as_deref().map(|v| required(v, "name")).transpose()?;
        let grade = patch
            .grade
            .as_deref()
            .map(|v| required(v, "grade"))
            .transpose()?;
        let student_id = patch
            .student_id
            .as_deref()
            .map(|v| required(v, "studentId"))
            .transpose()?;
        if let Some(key) = &student_id {
            if self
                .data
                .students
                .iter()
                .any(|s| s.id != id && s.student_id == *key)
            {
                return Err(StoreError::DuplicateBusinessKey {
                    field: "studentId",
                    value: key.clone(),
                });
            }
        }

        let student = &mut self.data.students[idx];
        if let Some(v) = name {
            student.name = v;
        }
        if let Some(v) = student_id {
            student.student_id = v;
        }
        if let Some(v) = grade {
            student.grade = v;
        }
        if let Some(v) = patch.class {
            student.class = v;
        }
        if let Some(v) = patch.date_of_birth {
            student.date_of_birth = v;
        }
        if let Some(v) = patch.parent_name {
            student.parent_name = v;
        }
        if let Some(v) = patch.parent_phone {
            student.parent_phone = v;
        }
        if let Some(v) = patch.address {
            student.address = v;
        }
        if let Some(v) = patch.photo {
            student.photo = Some(v);
        }
        if let Some(v) = patch.enrollment_date {
            student.enrollment_date = v;
        }
        let updated = student.clone();
        self.notify(Kind::Students);
        Ok(updated)
    }

    /// Unconditional remove-by-id. Attendance and grade rows referencing
    /// the student are left in place (no cascade).
    pub fn delete_student(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.data.students.len();
        self.data.students.retain(|s| s.id != id);
        if self.data.students.len() == before {
            return Err(StoreError::NotFound("student"));
        }
        self.notify(Kind::Students);
        Ok(())
    }

    // ---- teachers ----

    pub fn create_teacher(&mut self, draft: TeacherDraft) -> Result<Teacher, StoreError> {
        let name = required(&draft.name, "name")?;
        let teacher_id = required(&draft.teacher_id, "teacherId")?;
        let subject = required(&draft.subject, "subject")?;
        if self.data.teachers.iter().any(|t| t.teacher_id == teacher_id) {
            return Err(StoreError::DuplicateBusinessKey {
                field: "teacherId",
                value: teacher_id,
            });
        }

        let teacher = Teacher {
            id: new_id(),
            name,
            teacher_id,
            subject,
            phone: draft.phone,
            email: draft.email,
            hire_date: draft.hire_date,
            salary: draft.salary,
            classes: draft.classes,
        };
        self.data.teachers.push(teacher.clone());
        self.notify(Kind::Teachers);
        Ok(teacher)
    }

    pub fn update_teacher(&mut self, id: &str, patch: TeacherPatch) -> Result<Teacher, StoreError> {
        let idx = self
            .data
            .teachers
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound("teacher"))?;

        let name = patch.name.as_deref().map(|v| required(v, "name")).transpose()?;
        let subject = patch
            .subject
            .as_deref()
            .map(|v| required(v, "subject"))
            .transpose()?;
        let teacher_id = patch
            .teacher_id
            .as_deref()
            .map(|v| required(v, "teacherId"))
            .transpose()?;
        if let Some(key) = &teacher_id {
            if self
                .data
                .teachers
                .iter()
                .any(|t| t.id != id && t.teacher_id == *key)
            {
                return Err(StoreError::DuplicateBusinessKey {
                    field: "teacherId",
                    value: key.clone(),
                });
            }
        }

        let teacher = &mut self.data.teachers[idx];
        if let Some(v) = name {
            teacher.name = v;
        }
        if let Some(v) = teacher_id {
            teacher.teacher_id = v;
        }
        if let Some(v) = subject {
            teacher.subject = v;
        }
        if let Some(v) = patch.phone {
            teacher.phone = v;
        }
        if let Some(v) = patch.email {
            teacher.email = v;
        }
        if let Some(v) = patch.hire_date {
            teacher.hire_date = v;
        }
        if let Some(v) = patch.salary {
            teacher.salary = v;
        }
        if let Some(v) = patch.classes {
            teacher.classes = v;
        }
        let updated = teacher.clone();
        self.notify(Kind::Teachers);
        Ok(updated)
    }

    pub fn delete_teacher(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.data.teachers.len();
        self.data.teachers.retain(|t| t.id != id);
        if self.data.teachers.len() == before {
            return Err(StoreError::NotFound("teacher"));
        }
        self.notify(Kind::Teachers);
        Ok(())
    }

    // ---- attendance ----

    /// Upsert keyed on `(studentId, date)`. An existing record gets its
    /// status and notes replaced in place; otherwise a new record is
    /// synthesized from the roster entry. Unknown student is a silent
    /// no-op and returns `None`.
    pub fn upsert_attendance(&mut self, mark: AttendanceMark) -> Option<String> {
        if let Some(record) = self
            .data
            .attendance
            .iter_mut()
            .find(|r| r.student_id == mark.student_id && r.date == mark.date)
        {
            record.status = mark.status;
            record.notes = mark.notes.unwrap_or_default();
            let id = record.id.clone();
            self.notify(Kind::Attendance);
            return Some(id);
        }

        let student = self
            .data
            .students
            .iter()
            .find(|s| s.student_id == mark.student_id)?;
        let record = AttendanceRecord {
            id: new_id(),
            student_id: mark.student_id,
            student_name: student.name.clone(),
            date: mark.date,
            status: mark.status,
            grade: student.grade.clone(),
            class: student.class.clone(),
            notes: mark.notes.unwrap_or_default(),
        };
        let id = record.id.clone();
        self.data.attendance.push(record);
        self.notify(Kind::Attendance);
        Some(id)
    }

    /// Stamp one status onto many students for one date. Unknown student
    /// ids are skipped; returns how many records were written.
    pub fn bulk_mark_attendance(
        &mut self,
        student_ids: &[String],
        date: &str,
        status: AttendanceStatus,
    ) -> usize {
        let mut recorded = 0;
        for student_id in student_ids {
            let mark = AttendanceMark {
                student_id: student_id.clone(),
                date: date.to_string(),
                status,
                notes: None,
            };
            if self.upsert_attendance(mark).is_some() {
                recorded += 1;
            }
        }
        recorded
    }

    // ---- grades ----

    pub fn create_grade(&mut self, draft: GradeDraft) -> Result<Grade, StoreError> {
        let student_id = required(&draft.student_id, "studentId")?;
        let subject = required(&draft.subject, "subject")?;
        let exam_type = draft.exam_type.ok_or(StoreError::MissingField("examType"))?;
        let score = draft.score.ok_or(StoreError::MissingField("score"))?;
        let max_score = draft.max_score.unwrap_or(100);
        if max_score <= 0 {
            return Err(StoreError::BadValue("maxScore", "must be positive"));
        }

        // Denormalized copy of the roster fields, taken at creation time
        // only. students.resyncDependents re-copies them on demand.
        let student = self
            .data
            .students
            .iter()
            .find(|s| s.student_id == student_id)
            .ok_or(StoreError::NotFound("student"))?;

        let grade = Grade {
            id: new_id(),
            student_id,
            student_name: student.name.clone(),
            subject,
            exam_type,
            score,
            max_score,
            date: draft.date,
            grade: student.grade.clone(),
            class: student.class.clone(),
            teacher_id: draft.teacher_id,
            notes: draft.notes,
        };
        self.data.grades.push(grade.clone());
        self.notify(Kind::Grades);
        Ok(grade)
    }

    pub fn update_grade(&mut self, id: &str, patch: GradePatch) -> Result<Grade, StoreError> {
        let idx = self
            .data
            .grades
            .iter()
            .position(|g| g.id == id)
            .ok_or(StoreError::NotFound("grade"))?;

        let subject = patch
            .subject
            .as_deref()
            .map(|v| required(v, "subject"))
            .transpose()?;
        if let Some(max_score) = patch.max_score {
            if max_score <= 0 {
                return Err(StoreError::BadValue("maxScore", "must be positive"));
            }
        }

        let grade = &mut self.data.grades[idx];
        if let Some(v) = patch.student_id {
            grade.student_id = v;
        }
        if let Some(v) = patch.student_name {
            grade.student_name = v;
        }
        if let Some(v) = subject {
            grade.subject = v;
        }
        if let Some(v) = patch.exam_type {
            grade.exam_type = v;
        }
        if let Some(v) = patch.score {
            grade.score = v;
        }
        if let Some(v) = patch.max_score {
            grade.max_score = v;
        }
        if let Some(v) = patch.date {
            grade.date = v;
        }
        if let Some(v) = patch.grade {
            grade.grade = v;
        }
        if let Some(v) = patch.class {
            grade.class = v;
        }
        if let Some(v) = patch.teacher_id {
            grade.teacher_id = v;
        }
        if let Some(v) = patch.notes {
            grade.notes = v;
        }
        let updated = grade.clone();
        self.notify(Kind::Grades);
        Ok(updated)
    }

    pub fn delete_grade(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.data.grades.len();
        self.data.grades.retain(|g| g.id != id);
        if self.data.grades.len() == before {
            return Err(StoreError::NotFound("grade"));
        }
        self.notify(Kind::Grades);
        Ok(())
    }

    // ---- reconciliation ----

    /// Re-copy `name`/`grade`/`class` from the roster onto every
    /// attendance record and grade whose `studentId` still resolves.
    /// Orphaned rows keep their stale copies. Returns
    /// `(attendance_updated, grades_updated)`.
    pub fn resync_student_fields(&mut self) -> (usize, usize) {
        let roster: Vec<(String, String, String, String)> = self
            .data
            .students
            .iter()
            .map(|s| {
                (
                    s.student_id.clone(),
                    s.name.clone(),
                    s.grade.clone(),
                    s.class.clone(),
                )
            })
            .collect();

        let mut attendance_updated = 0;
        for record in &mut self.data.attendance {
            let Some((_, name, grade, class)) =
                roster.iter().find(|(key, ..)| *key == record.student_id)
            else {
                continue;
            };
            if record.student_name != *name || record.grade != *grade || record.class != *class {
                record.student_name = name.clone();
                record.grade = grade.clone();
                record.class = class.clone();
                attendance_updated += 1;
            }
        }

        let mut grades_updated = 0;
        for row in &mut self.data.grades {
            let Some((_, name, grade, class)) =
                roster.iter().find(|(key, ..)| *key == row.student_id)
            else {
                continue;
            };
            if row.student_name != *name || row.grade != *grade || row.class != *class {
                row.student_name = name.clone();
                row.grade = grade.clone();
                row.class = class.clone();
                grades_updated += 1;
            }
        }

        if attendance_updated > 0 {
            self.notify(Kind::Attendance);
        }
        if grades_updated > 0 {
            self.notify(Kind::Grades);
        }
        (attendance_updated, grades_updated)
    }
}

fn required(value: &str, field: &'static str) -> Result<String, StoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::MissingField(field));
    }
    Ok(trimmed.to_string())
}
