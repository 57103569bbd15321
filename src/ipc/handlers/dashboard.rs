use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::stats::dashboard_stats;
use serde_json::json;

fn handle_dashboard_stats(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let stats = dashboard_stats(store.data());
    ok(
        &req.id,
        json!({
            "studentCount": stats.student_count,
            "teacherCount": stats.teacher_count,
            "attendanceRate": stats.attendance_rate,
            "averageGrade": stats.average_grade
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.stats" => Some(handle_dashboard_stats(state, req)),
        _ => None,
    }
}
