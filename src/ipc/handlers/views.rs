use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::ViewId;
use serde_json::json;

fn handle_views_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(user) = state.session.as_ref() else {
        return err(&req.id, "not_logged_in", "no active session", None);
    };
    let views: Vec<&str> = ViewId::ALL
        .iter()
        .filter(|v| v.allows(user.role))
        .map(|v| v.as_str())
        .collect();
    ok(&req.id, json!({ "views": views }))
}

// The allowlist only shapes the navigation; selecting a view is
// unrestricted and any view is reachable from any view.
fn handle_views_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let view = match req.params.get("view").and_then(|v| v.as_str()) {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "missing view", None),
    };
    let Some(view) = ViewId::parse(view) else {
        return err(&req.id, "bad_params", format!("unknown view: {view}"), None);
    };
    state.view = view;
    ok(&req.id, json!({ "view": view.as_str() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "views.list" => Some(handle_views_list(state, req)),
        "views.select" => Some(handle_views_select(state, req)),
        _ => None,
    }
}
