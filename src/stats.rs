//! Derived statistics: pure aggregation over (possibly pre-filtered)
//! collections. Every ratio guards its denominator and reports 0 for an
//! empty input.

use serde::Serialize;

use crate::model::{AttendanceRecord, AttendanceStatus, Grade};
use crate::store::Collections;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceTally {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub excused: usize,
}

impl AttendanceTally {
    pub fn total(&self) -> usize {
        self.present + self.absent + self.late + self.excused
    }
}

/// Count records per status among those dated `date`.
pub fn attendance_tally<'a, I>(records: I, date: &str) -> AttendanceTally
where
    I: IntoIterator<Item = &'a AttendanceRecord>,
{
    let mut tally = AttendanceTally::default();
    for record in records {
        if record.date != date {
            continue;
        }
        match record.status {
            AttendanceStatus::Present => tally.present += 1,
            AttendanceStatus::Absent => tally.absent += 1,
            AttendanceStatus::Late => tally.late += 1,
            AttendanceStatus::Excused => tally.excused += 1,
        }
    }
    tally
}

pub fn percent(score: i64, max_score: i64) -> f64 {
    if max_score <= 0 {
        return 0.0;
    }
    100.0 * score as f64 / max_score as f64
}

/// Band labels for a percentage, as shown next to each grade row.
pub fn grade_band(pct: f64) -> &'static str {
    if pct >= 90.0 {
        "excellent"
    } else if pct >= 80.0 {
        "very_good"
    } else if pct >= 70.0 {
        "good"
    } else if pct >= 60.0 {
        "pass"
    } else {
        "fail"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeStats {
    pub average_percent: f64,
    pub excellent_count: usize,
    pub pass_count: usize,
    pub total: usize,
}

pub fn grade_stats<'a, I>(grades: I) -> GradeStats
where
    I: IntoIterator<Item = &'a Grade>,
{
    let mut sum = 0.0;
    let mut stats = GradeStats::default();
    for grade in grades {
        let pct = percent(grade.score, grade.max_score);
        sum += pct;
        if pct >= 90.0 {
            stats.excellent_count += 1;
        }
        if pct >= 60.0 {
            stats.pass_count += 1;
        }
        stats.total += 1;
    }
    if stats.total > 0 {
        stats.average_percent = sum / stats.total as f64;
    }
    stats
}

pub fn rounded_rate(numerator: usize, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    (100.0 * numerator as f64 / denominator as f64).round() as u32
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub student_count: usize,
    pub teacher_count: usize,
    /// Present records over all attendance records, rounded percent.
    pub attendance_rate: u32,
    /// Mean grade percentage across all grades, rounded percent.
    pub average_grade: u32,
}

pub fn dashboard_stats(data: &Collections) -> DashboardStats {
    let present = data
        .attendance
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count();
    DashboardStats {
        student_count: data.students.len(),
        teacher_count: data.teachers.len(),
        attendance_rate: rounded_rate(present, data.attendance.len()),
        average_grade: grade_stats(&data.grades).average_percent.round() as u32,
    }
}
