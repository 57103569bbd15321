use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::{Role, User, ViewId};
use serde_json::json;
use std::time::Duration;

/// The login round-trip is a demonstration stand-in: a fixed blocking
/// delay, no credential check. Requests may override the delay so test
/// suites do not pay it.
const LOGIN_DELAY_MS: u64 = 1000;

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let username = req
        .params
        .get("username")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .unwrap_or_default();
    let password = req
        .params
        .get("password")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    if username.is_empty() || password.is_empty() {
        return err(
            &req.id,
            "validation_failed",
            "username and password are required",
            None,
        );
    }

    let delay_ms = req
        .params
        .get("delayMs")
        .and_then(|v| v.as_u64())
        .unwrap_or(LOGIN_DELAY_MS);
    if delay_ms > 0 {
        std::thread::sleep(Duration::from_millis(delay_ms));
    }

    let role = Role::from_username(username);
    state.session = Some(User {
        username: username.to_string(),
        role,
    });
    state.view = ViewId::Dashboard;
    log::info!("{username} logged in as {}", role.as_str());

    ok(
        &req.id,
        json!({ "username": username, "role": role.as_str() }),
    )
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.session = None;
    state.view = ViewId::Dashboard;
    ok(&req.id, json!({ "ok": true }))
}

fn handle_session_info(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(user) = state.session.as_ref() else {
        return err(&req.id, "not_logged_in", "no active session", None);
    };
    ok(
        &req.id,
        json!({
            "username": user.username,
            "role": user.role.as_str(),
            "currentView": state.view.as_str()
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.login" => Some(handle_login(state, req)),
        "auth.logout" => Some(handle_logout(state, req)),
        "session.info" => Some(handle_session_info(state, req)),
        _ => None,
    }
}
