use crate::grade::derive_grade;
use crate::ipc::error::ok;
use crate::ipc::helpers::required_i64;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_grade_derive(req: &Request) -> serde_json::Value {
    let marks = match required_i64(req, "marks") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let grade = derive_grade(marks);
    ok(
        &req.id,
        json!({
            "marks": marks,
            "grade": grade,
            "remark": grade.remark(),
            "tier": grade.tier(),
        }),
    )
}

pub fn try_handle(_state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grade.derive" => Some(handle_grade_derive(req)),
        _ => None,
    }
}
