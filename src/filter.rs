//! View filter predicates.
//!
//! Criteria combine by logical AND. Free text is a case-insensitive
//! substring match over a small fixed field set per view; a categorical
//! selector is exact-match, with `"all"` (or an absent selector) matching
//! unconditionally. Filtering never reorders the collection.

use serde::Deserialize;

use crate::model::{Grade, Student, Teacher};

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn is_all(selector: &str) -> bool {
    selector.is_empty() || selector == "all"
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct StudentQuery {
    pub search: String,
}

pub fn student_matches(student: &Student, query: &StudentQuery) -> bool {
    query.search.is_empty()
        || contains_ci(&student.name, &query.search)
        || contains_ci(&student.student_id, &query.search)
        || contains_ci(&student.grade, &query.search)
}

/// The attendance roster filters the *student* list; the free text covers
/// name and business key only, with grade and class as selectors.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RosterQuery {
    pub search: String,
    pub grade: String,
    pub class: String,
}

pub fn roster_matches(student: &Student, query: &RosterQuery) -> bool {
    let search_ok = query.search.is_empty()
        || contains_ci(&student.name, &query.search)
        || contains_ci(&student.student_id, &query.search);
    search_ok
        && (is_all(&query.grade) || student.grade == query.grade)
        && (is_all(&query.class) || student.class == query.class)
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct TeacherQuery {
    pub search: String,
}

pub fn teacher_matches(teacher: &Teacher, query: &TeacherQuery) -> bool {
    query.search.is_empty()
        || contains_ci(&teacher.name, &query.search)
        || contains_ci(&teacher.teacher_id, &query.search)
        || contains_ci(&teacher.subject, &query.search)
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GradeQuery {
    pub search: String,
    pub subject: String,
    pub exam_type: String,
}

pub fn grade_matches(grade: &Grade, query: &GradeQuery) -> bool {
    let search_ok = query.search.is_empty()
        || contains_ci(&grade.student_name, &query.search)
        || contains_ci(&grade.subject, &query.search);
    search_ok
        && (is_all(&query.subject) || grade.subject == query.subject)
        && (is_all(&query.exam_type) || grade.exam_type.as_str() == query.exam_type)
}
