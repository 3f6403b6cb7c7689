use serde_json::json;

use super::error::err;
use super::types::Request;
use crate::model::StudentId;
use crate::session::Session;

pub fn required_str<'a>(req: &'a Request, key: &str) -> Result<&'a str, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {key}"), None))
}

pub fn required_i64(req: &Request, key: &str) -> Result<i64, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {key}"), None))
}

pub fn student_id(req: &Request) -> Result<StudentId, serde_json::Value> {
    required_i64(req, "studentId")
}

/// Marks may arrive as a number or as the raw text of the input box.
pub fn marks_text(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn session_state(session: &Session) -> serde_json::Value {
    json!({
        "mode": session.mode(),
        "selected": session.selected(),
        "students": session.students(),
        "isLoading": session.is_loading(),
        "form": session.form(),
        "pendingNotices": session.notices().len(),
    })
}
