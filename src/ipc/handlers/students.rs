use crate::client::InvalidationPolicy;
use crate::error::{Error, ValidationError};
use crate::grade::{derive_grade, Grade};
use crate::ipc::error::{core_err, err, ok};
use crate::ipc::helpers::{required_i64, required_str, student_id};
use crate::ipc::types::{AppState, Request};
use crate::model::{NewStudent, Section, StudentPatch};
use serde_json::json;

async fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.session.client().load().await {
        Ok(students) => ok(&req.id, json!({ "students": students })),
        Err(e) => core_err(&req.id, &e),
    }
}

async fn handle_students_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match student_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.session.client().get_by_id(id).await {
        Ok(Some(student)) => ok(&req.id, json!({ "student": student })),
        Ok(None) => err(
            &req.id,
            "not_found",
            "student not found",
            Some(json!({ "studentId": id })),
        ),
        Err(e) => core_err(&req.id, &e),
    }
}

async fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = match required_str(req, "name") {
        Ok(v) => v.trim().to_string(),
        Err(resp) => return resp,
    };
    let section: Section = match required_str(req, "section").map(str::parse::<Section>) {
        Ok(Ok(v)) => v,
        Ok(Err(e)) => return core_err(&req.id, &Error::Validation(e)),
        Err(resp) => return resp,
    };
    let marks = match required_i64(req, "marks") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // Callers may send their own grade; otherwise derive it here.
    let grade = match req.params.get("grade").and_then(|v| v.as_str()) {
        Some(raw) => match raw.parse::<Grade>() {
            Ok(g) => g,
            Err(e) => return core_err(&req.id, &Error::Validation(e)),
        },
        None => derive_grade(marks),
    };

    let student = NewStudent {
        name,
        section,
        marks,
        grade,
    };
    match state.session.client().create(student).await {
        Ok(created) => ok(
            &req.id,
            json!({ "student": created, "cacheCleared": cache_cleared(state) }),
        ),
        Err(e) => core_err(&req.id, &e),
    }
}

async fn handle_students_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match student_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(raw_patch) = req.params.get("patch").filter(|v| v.is_object()) else {
        return err(&req.id, "bad_params", "missing patch", None);
    };
    let mut patch = match parse_patch(req, raw_patch) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    if patch.is_empty() {
        return err(&req.id, "bad_params", "patch must not be empty", None);
    }
    if let (Some(marks), None) = (patch.marks, patch.grade) {
        patch.grade = Some(derive_grade(marks));
    }

    match state.session.client().update(id, patch).await {
        Ok(updated) => ok(
            &req.id,
            json!({ "student": updated, "cacheCleared": cache_cleared(state) }),
        ),
        Err(e) => core_err(&req.id, &e),
    }
}

async fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match student_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.session.client().delete(id).await {
        Ok(deleted) => ok(
            &req.id,
            json!({ "studentId": deleted, "cacheCleared": cache_cleared(state) }),
        ),
        Err(e) => core_err(&req.id, &e),
    }
}

/// Reads a `students.update` patch with the same normalisation as create:
/// trimmed name, case-insensitive section.
fn parse_patch(req: &Request, raw: &serde_json::Value) -> Result<StudentPatch, serde_json::Value> {
    let text = |key: &str| match raw.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v.as_str().map(Some).ok_or_else(|| {
            err(&req.id, "bad_params", format!("patch.{key} must be a string"), None)
        }),
    };
    let invalid = |e: ValidationError| core_err(&req.id, &Error::Validation(e));

    let name = text("name")?.map(|s| s.trim().to_string());
    let section = text("section")?
        .map(str::parse::<Section>)
        .transpose()
        .map_err(invalid)?;
    let grade = text("grade")?
        .map(str::parse::<Grade>)
        .transpose()
        .map_err(invalid)?;
    let marks = match raw.get("marks") {
        None | Some(serde_json::Value::Null) => None,
        Some(v) => Some(v.as_i64().ok_or_else(|| {
            err(&req.id, "bad_params", "patch.marks must be an integer", None)
        })?),
    };

    Ok(StudentPatch {
        name,
        section,
        marks,
        grade,
    })
}

fn cache_cleared(state: &AppState) -> bool {
    state.session.client().invalidation() == InvalidationPolicy::ClearOnMutate
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req).await),
        "students.get" => Some(handle_students_get(state, req).await),
        "students.create" => Some(handle_students_create(state, req).await),
        "students.update" => Some(handle_students_update(state, req).await),
        "students.delete" => Some(handle_students_delete(state, req).await),
        _ => None,
    }
}
