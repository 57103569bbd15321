use crate::filter::{teacher_matches, TeacherQuery};
use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::parse_params;
use crate::ipc::types::{AppState, Request};
use crate::model::Teacher;
use crate::store::{TeacherDraft, TeacherPatch};
use serde_json::json;

fn handle_teachers_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let query: TeacherQuery = match parse_params(&req.params) {
        Ok(q) => q,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };

    let all = &store.data().teachers;
    let teachers: Vec<&Teacher> = all.iter().filter(|t| teacher_matches(t, &query)).collect();
    ok(
        &req.id,
        json!({ "teachers": teachers, "total": all.len() }),
    )
}

fn handle_teachers_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let draft: TeacherDraft = match parse_params(&req.params) {
        Ok(d) => d,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };
    match store.create_teacher(draft) {
        Ok(teacher) => ok(&req.id, json!({ "id": teacher.id })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_teachers_update(state: &mut AppState, req: &Request) -> serde_json::Value {
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
    let patch: TeacherPatch = match serde_json::from_value(patch.clone()) {
        Ok(p) => p,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };
    match store.update_teacher(&id, patch) {
        Ok(teacher) => ok(&req.id, json!({ "teacher": teacher })),
        Err(e) => store_err(&req.id, &e),
    }
}

fn handle_teachers_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let id = match req.params.get("id").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing id", None),
    };
    match store.delete_teacher(&id) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => store_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "teachers.list" => Some(handle_teachers_list(state, req)),
        "teachers.create" => Some(handle_teachers_create(state, req)),
        "teachers.update" => Some(handle_teachers_update(state, req)),
        "teachers.delete" => Some(handle_teachers_delete(state, req)),
        _ => None,
    }
}
