use serde_json::json;

use crate::error::Error;

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

/// Maps a core error onto the wire envelope.
pub fn core_err(id: &str, e: &Error) -> serde_json::Value {
    let details = match e {
        Error::NotFound(student_id) => Some(json!({ "studentId": student_id })),
        Error::InvalidTransition { mode, action } => {
            Some(json!({ "mode": mode, "action": action }))
        }
        _ => None,
    };
    err(id, e.code(), e.to_string(), details)
}
