use crate::error::{Error, Result};
use crate::ipc::error::{core_err, err, ok};
use crate::ipc::helpers::{marks_text, session_state, student_id};
use crate::ipc::types::{AppState, Request};
use crate::model::Section;
use serde_json::json;

/// Answers with the session state, or with the error the action raised.
fn respond(state: &AppState, req: &Request, outcome: Result<()>) -> serde_json::Value {
    match outcome {
        Ok(()) => ok(&req.id, session_state(&state.session)),
        Err(e) => core_err(&req.id, &e),
    }
}

fn handle_form_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let section = match req.params.get("section").and_then(|v| v.as_str()) {
        Some(raw) => match raw.parse::<Section>() {
            Ok(s) => Some(s),
            Err(e) => return core_err(&req.id, &Error::Validation(e)),
        },
        None => None,
    };
    let marks = match req.params.get("marks") {
        Some(v) => match marks_text(v) {
            Some(t) => Some(t),
            None => return err(&req.id, "bad_params", "marks must be text or a number", None),
        },
        None => None,
    };

    let form = match state.session.form_mut() {
        Ok(f) => f,
        Err(e) => return core_err(&req.id, &e),
    };
    if let Some(name) = req.params.get("name").and_then(|v| v.as_str()) {
        form.set_name(name);
    }
    if let Some(section) = section {
        form.set_section(section);
    }
    if let Some(marks) = marks {
        form.set_marks(marks);
    }
    ok(&req.id, json!({ "form": form }))
}

async fn handle_with_id(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match student_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let outcome = match req.method.as_str() {
        "session.edit" => state.session.go_to_edit(id).await,
        "session.view" => state.session.go_to_details(id).await,
        _ => {
            let confirmed = req
                .params
                .get("confirmed")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            state.session.delete(id, confirmed).await
        }
    };
    respond(state, req, outcome)
}

pub async fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let resp = match req.method.as_str() {
        "session.state" => ok(&req.id, session_state(&state.session)),
        "session.load" => {
            let outcome = state.session.load().await;
            respond(state, req, outcome)
        }
        "session.add" => {
            let outcome = state.session.go_to_add();
            respond(state, req, outcome)
        }
        "session.back" => {
            let outcome = state.session.back();
            respond(state, req, outcome)
        }
        "session.submit" => {
            let outcome = state.session.submit().await;
            respond(state, req, outcome)
        }
        "session.edit" | "session.view" | "session.delete" => handle_with_id(state, req).await,
        "session.form.set" => handle_form_set(state, req),
        "session.notices" => {
            let notices = state.session.take_notices();
            ok(&req.id, json!({ "notices": notices }))
        }
        _ => return None,
    };
    Some(resp)
}
