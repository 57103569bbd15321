use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    let conn = match db::open_store_db(&path) {
        Ok(conn) => conn,
        Err(e) => return err(&req.id, "store_open_failed", format!("{e:#}"), None),
    };
    let data = match db::load_collections(&conn) {
        Ok(data) => data,
        Err(e) => return err(&req.id, "store_open_failed", format!("{e:#}"), None),
    };

    let mut store = Store::new(data);
    store.subscribe(Box::new(db::SqliteMirror::new(conn)));

    log::info!("workspace selected: {}", path.to_string_lossy());
    state.workspace = Some(path.clone());
    state.store = Some(store);
    ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
