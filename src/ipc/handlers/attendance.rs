use crate::filter::{roster_matches, RosterQuery};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::parse_params;
use crate::ipc::types::{AppState, Request};
use crate::model::AttendanceStatus;
use crate::stats::attendance_tally;
use crate::store::{AttendanceMark, Store};
use serde_json::json;

struct HandlerErr {
    code: &'static str,
    message: String,
}

impl HandlerErr {
    fn bad_params(message: impl Into<String>) -> Self {
        Self {
            code: "bad_params",
            message: message.into(),
        }
    }

    fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, None)
    }
}

fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {key}")))
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// The UI's "selected date": explicit when given, today otherwise.
fn date_or_today(params: &serde_json::Value) -> String {
    params
        .get("date")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(today)
}

fn parse_status(params: &serde_json::Value) -> Result<AttendanceStatus, HandlerErr> {
    let raw = get_required_str(params, "status")?;
    AttendanceStatus::parse(&raw)
        .ok_or_else(|| HandlerErr::bad_params(format!("invalid status: {raw}")))
}

fn attendance_list(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = params.get("date").and_then(|v| v.as_str());
    let student_id = params.get("studentId").and_then(|v| v.as_str());

    let records: Vec<_> = store
        .data()
        .attendance
        .iter()
        .filter(|r| date.map_or(true, |d| r.date == d))
        .filter(|r| student_id.map_or(true, |s| r.student_id == s))
        .collect();
    Ok(json!({ "records": records }))
}

fn attendance_roster(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = date_or_today(params);
    let query: RosterQuery =
        parse_params(params).map_err(|e| HandlerErr::bad_params(e.to_string()))?;

    let data = store.data();
    let rows: Vec<serde_json::Value> = data
        .students
        .iter()
        .filter(|s| roster_matches(s, &query))
        .map(|s| {
            let record = data
                .attendance
                .iter()
                .find(|r| r.student_id == s.student_id && r.date == date);
            json!({
                "studentId": s.student_id,
                "name": s.name,
                "grade": s.grade,
                "class": s.class,
                "status": record.map(|r| r.status.as_str()),
                "notes": record.map(|r| r.notes.clone()).unwrap_or_default()
            })
        })
        .collect();

    let tally = attendance_tally(&data.attendance, &date);
    Ok(json!({
        "date": date,
        "rows": rows,
        "tally": tally
    }))
}

fn attendance_mark(
    store: &mut Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let status = parse_status(params)?;
    let notes = params
        .get("notes")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let mark = AttendanceMark {
        student_id,
        date: date_or_today(params),
        status,
        notes,
    };
    // Unknown student is a deliberate silent no-op, not an error.
    match store.upsert_attendance(mark) {
        Some(id) => Ok(json!({ "recorded": true, "id": id })),
        None => Ok(json!({ "recorded": false })),
    }
}

fn attendance_bulk_mark(
    store: &mut Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let Some(ids_json) = params.get("studentIds").and_then(|v| v.as_array()) else {
        return Err(HandlerErr::bad_params("missing studentIds"));
    };
    let student_ids: Vec<String> = ids_json
        .iter()
        .filter_map(|v| v.as_str().map(|s| s.to_string()))
        .collect();
    let status = parse_status(params)?;
    let date = date_or_today(params);

    let recorded = store.bulk_mark_attendance(&student_ids, &date, status);
    Ok(json!({ "recorded": recorded, "date": date }))
}

fn attendance_stats(
    store: &Store,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let date = date_or_today(params);
    let tally = attendance_tally(&store.data().attendance, &date);
    Ok(json!({
        "date": date,
        "present": tally.present,
        "absent": tally.absent,
        "late": tally.late,
        "excused": tally.excused,
        "total": tally.total()
    }))
}

fn with_store<F>(state: &mut AppState, req: &Request, f: F) -> serde_json::Value
where
    F: FnOnce(&mut Store, &serde_json::Value) -> Result<serde_json::Value, HandlerErr>,
{
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match f(store, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.list" => Some(with_store(state, req, |s, p| attendance_list(s, p))),
        "attendance.roster" => Some(with_store(state, req, |s, p| attendance_roster(s, p))),
        "attendance.mark" => Some(with_store(state, req, attendance_mark)),
        "attendance.bulkMark" => Some(with_store(state, req, attendance_bulk_mark)),
        "attendance.stats" => Some(with_store(state, req, |s, p| attendance_stats(s, p))),
        _ => None,
    }
}
