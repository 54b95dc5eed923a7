use serde_json::json;

use crate::store::StoreError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
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

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::new("bad_params", message)
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<StoreError> for HandlerErr {
    fn from(e: StoreError) -> Self {
        let details = match &e {
            StoreError::Validation { missing, .. } => Some(json!({ "missing": missing })),
            StoreError::NotFound { kind, id } => Some(json!({ "kind": kind, "id": id })),
            StoreError::Unsupported { kind, operation } => {
                Some(json!({ "kind": kind, "operation": operation }))
            }
            StoreError::Rejected { .. } => None,
        };
        Self {
            code: e.code(),
            message: e.to_string(),
            details,
        }
    }
}

pub type HandlerResult = Result<serde_json::Value, HandlerErr>;

pub fn respond(id: &str, result: HandlerResult) -> serde_json::Value {
    match result {
        Ok(v) => ok(id, v),
        Err(e) => e.response(id),
    }
}
