use crate::filter::{grade_matches, GradeQuery};
use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::parse_params;
use crate::ipc::types::{AppState, Request};
use crate::model::Grade;
use crate::stats::{grade_band, grade_stats, percent};
use crate::store::{GradeDraft, GradePatch};
use serde::Serialize;
use serde_json::json;

/// A grade row as listed: the record itself plus its derived percentage
/// and band label.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GradeRow<'a> {
    #[serde(flatten)]
    grade: &'a Grade,
    percent: f64,
    band: &'static str,
}

fn parse_query(
    id: &str,
    params: &serde_json::Value,
) -> Result<GradeQuery, serde_json::Value> {
    parse_params(params).map_err(|e| err(id, "bad_params", e.to_string(), None))
}

fn handle_grades_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let query = match parse_query(&req.id, &req.params) {
        Ok(q) => q,
        Err(resp) => return resp,
    };

    let all = &store.data().grades;
    let rows: Vec<GradeRow> = all
        .iter()
        .filter(|g| grade_matches(g, &query))
        .map(|g| {
            let pct = percent(g.score, g.max_score);
            GradeRow {
                grade: g,
                percent: pct,
                band: grade_band(pct),
            }
        })
        .collect();
    ok(&req.id, json!({ "grades": rows, "total": all.len() }))
}

fn handle_grades_stats(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let query = match parse_query(&req.id, &req.params) {
        Ok(q) => q,
        Err(resp) => return resp,
    };

    // Statistics follow the active filter, as the grades view shows them.
    let stats = grade_stats(
        store
            .data()
            .grades
            .iter()
            .filter(|g| grade_matches(g, &query)),
    );
    ok(
        &req.id,
        json!({
            "averagePercent": stats.average_percent,
            "excellentCount": stats.excellent_count,
            "passCount": stats.pass_count,
            "total": stats.total
        }),
    )
}

fn handle_grades_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let draft: GradeDraft = match parse_params(&req.params) {
        Ok(d) => d,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };
    match store.create_grade(draft) {
        Ok(grade) => ok(&req.id, json!({ "id": grade.id })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_grades_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let id = match req.params.get("id").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing id", None),
    };
    let Some(patch) = req.params.get("patch").filter(|v| v.is_object()) else {
        return err(&req.id, "bad_params", "missing/invalid patch", None);
    };
    let patch: GradePatch = match serde_json::from_value(patch.clone()) {
        Ok(p) => p,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };
    match store.update_grade(&id, patch) {
        Ok(grade) => ok(&req.id, json!({ "grade": grade })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_grades_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let id = match req.params.get("id").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing id", None),
    };
    match store.delete_grade(&id) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => store_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.list" => Some(handle_grades_list(state, req)),
        "grades.stats" => Some(handle_grades_stats(state, req)),
        "grades.create" => Some(handle_grades_create(state, req)),
        "grades.update" => Some(handle_grades_update(state, req)),
        "grades.delete" => Some(handle_grades_delete(state, req)),
        _ => None,
    }
}
