use std::path::PathBuf;

use serde::Deserialize;

use crate::model::{User, ViewId};
use crate::store::Store;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<Store>,
    pub session: Option<User>,
    pub view: ViewId,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            workspace: None,
            store: None,
            session: None,
            view: ViewId::Dashboard,
        }
    }
}
