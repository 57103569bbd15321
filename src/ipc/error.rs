use serde_json::{json, Value};

use crate::store::StoreError;

pub fn ok(id: &str, result: Value) -> Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(id: &str, code: &str, message: impl Into<String>, details: Option<Value>) -> Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Map a store-layer failure onto the wire taxonomy.
pub fn store_err(id: &str, e: &StoreError) -> Value {
    match e {
        StoreError::MissingField(field) => err(
            id,
            "validation_failed",
            format!("missing required field: {field}"),
            None,
        ),
        StoreError::BadValue(field, why) => {
            err(id, "bad_params", format!("{field} {why}"), None)
        }
        StoreError::DuplicateBusinessKey { field, value } => err(
            id,
            "duplicate_business_key",
            format!("{field} {value} is already in use"),
            Some(json!({ "field": field, "value": value })),
        ),
        StoreError::NotFound(what) => err(id, "not_found", format!("{what} not found"), None),
    }
}
