use crate::backup;
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;
use serde_json::json;
use std::path::PathBuf;

fn handle_backup_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(workspace) = state.workspace.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let out_path = match req.params.get("outPath").and_then(|v| v.as_str()) {
        Some(v) => PathBuf::from(v),
        None => return err(&req.id, "bad_params", "missing outPath", None),
    };
    match backup::export_store_bundle(workspace, &out_path) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "bundleFormat": summary.bundle_format,
                "dbSha256": summary.db_sha256,
                "outPath": out_path.to_string_lossy()
            }),
        ),
        Err(e) => err(&req.id, "backup_failed", format!("{e:#}"), None),
    }
}

fn handle_backup_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(workspace) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let in_path = match req.params.get("inPath").and_then(|v| v.as_str()) {
        Some(v) => PathBuf::from(v),
        None => return err(&req.id, "bad_params", "missing inPath", None),
    };

    // Release the current store (and its connection) before the database
    // file underneath it is replaced.
    state.store = None;

    let summary = match backup::import_store_bundle(&in_path, &workspace) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "backup_failed", format!("{e:#}"), None),
    };

    let conn = match db::open_store_db(&workspace) {
        Ok(conn) => conn,
        Err(e) => return err(&req.id, "store_open_failed", format!("{e:#}"), None),
    };
    let data = match db::load_collections(&conn) {
        Ok(data) => data,
        Err(e) => return err(&req.id, "store_open_failed", format!("{e:#}"), None),
    };
    let mut store = Store::new(data);
    store.subscribe(Box::new(db::SqliteMirror::new(conn)));
    state.store = Some(store);

    log::info!(
        "imported {} bundle into {}",
        summary.bundle_format_detected,
        workspace.to_string_lossy()
    );
    ok(
        &req.id,
        json!({ "bundleFormat": summary.bundle_format_detected }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.export" => Some(handle_backup_export(state, req)),
        "backup.import" => Some(handle_backup_import(state, req)),
        _ => None,
    }
}
