mod common;

use common::sidecar::{error_code, request, request_ok, spawn_sidecar};
use serde_json::json;

fn mode(state: &serde_json::Value) -> Option<&str> {
    state.get("mode").and_then(|v| v.as_str())
}

fn student_count(state: &serde_json::Value) -> usize {
    state
        .get("students")
        .and_then(|v| v.as_array())
        .map(|a| a.len())
        .unwrap_or(0)
}

fn notice_messages(result: &serde_json::Value) -> Vec<String> {
    result
        .get("notices")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|n| n.get("message").and_then(|m| m.as_str()).map(|s| s.to_string()))
        .collect()
}

#[test]
fn add_edit_delete_through_the_session() {
    let (_child, mut stdin, mut reader) = spawn_sidecar(&[]);

    let state = request_ok(&mut stdin, &mut reader, "1", "session.state", json!({}));
    assert_eq!(mode(&state), Some("LIST"));
    assert_eq!(student_count(&state), 0, "no auto-load on start");
    assert_eq!(state.get("isLoading").and_then(|v| v.as_bool()), Some(false));

    let state = request_ok(&mut stdin, &mut reader, "2", "session.load", json!({}));
    assert_eq!(student_count(&state), 4);

    let state = request_ok(&mut stdin, &mut reader, "3", "session.add", json!({}));
    assert_eq!(mode(&state), Some("ADD"));

    let form = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "session.form.set",
        json!({ "name": "Eve", "section": "B", "marks": "4" }),
    );
    assert_eq!(
        form.get("form").and_then(|f| f.get("grade")).and_then(|v| v.as_str()),
        Some("F")
    );
    let form = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "session.form.set",
        json!({ "marks": "40" }),
    );
    assert_eq!(
        form.get("form").and_then(|f| f.get("marks")).and_then(|v| v.as_str()),
        Some("40")
    );

    let state = request_ok(&mut stdin, &mut reader, "6", "session.submit", json!({}));
    assert_eq!(mode(&state), Some("LIST"));
    assert_eq!(student_count(&state), 0, "list cleared after add");

    let notices = request_ok(&mut stdin, &mut reader, "7", "session.notices", json!({}));
    assert_eq!(
        notice_messages(&notices),
        [
            "Student data loaded successfully.",
            "Student added. Please reload to see changes."
        ]
    );
    let drained = request_ok(&mut stdin, &mut reader, "8", "session.notices", json!({}));
    assert!(notice_messages(&drained).is_empty());

    let _ = request_ok(&mut stdin, &mut reader, "9", "session.load", json!({}));
    let state = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "session.edit",
        json!({ "studentId": 1 }),
    );
    assert_eq!(mode(&state), Some("EDIT"));
    assert_eq!(
        state
            .get("selected")
            .and_then(|s| s.get("name"))
            .and_then(|v| v.as_str()),
        Some("Alice Johnson")
    );

    let form = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "session.form.set",
        json!({ "marks": 95 }),
    );
    assert_eq!(
        form.get("form").and_then(|f| f.get("grade")).and_then(|v| v.as_str()),
        Some("A+")
    );
    let state = request_ok(&mut stdin, &mut reader, "12", "session.submit", json!({}));
    assert_eq!(mode(&state), Some("LIST"));

    let alice = request_ok(
        &mut stdin,
        &mut reader,
        "13",
        "students.get",
        json!({ "studentId": 1 }),
    );
    assert_eq!(
        alice
            .get("student")
            .and_then(|s| s.get("grade"))
            .and_then(|v| v.as_str()),
        Some("A+")
    );

    let _ = request_ok(&mut stdin, &mut reader, "14", "session.load", json!({}));
    let state = request_ok(
        &mut stdin,
        &mut reader,
        "15",
        "session.delete",
        json!({ "studentId": 2 }),
    );
    assert_eq!(student_count(&state), 5, "unconfirmed delete is a no-op");

    let state = request_ok(
        &mut stdin,
        &mut reader,
        "16",
        "session.delete",
        json!({ "studentId": 2, "confirmed": true }),
    );
    assert_eq!(student_count(&state), 0);
}

#[test]
fn details_view_and_rejected_transitions() {
    let (_child, mut stdin, mut reader) = spawn_sidecar(&[]);

    let back = request(&mut stdin, &mut reader, "1", "session.back", json!({}));
    assert_eq!(error_code(&back), Some("invalid_transition"));

    let state = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "session.view",
        json!({ "studentId": 3 }),
    );
    assert_eq!(mode(&state), Some("DETAILS"));
    assert_eq!(
        state
            .get("selected")
            .and_then(|s| s.get("grade"))
            .and_then(|v| v.as_str()),
        Some("A+")
    );

    let submit = request(&mut stdin, &mut reader, "3", "session.submit", json!({}));
    assert_eq!(error_code(&submit), Some("invalid_transition"));
    let form = request(
        &mut stdin,
        &mut reader,
        "4",
        "session.form.set",
        json!({ "marks": 10 }),
    );
    assert_eq!(error_code(&form), Some("invalid_transition"));

    let state = request_ok(&mut stdin, &mut reader, "5", "session.back", json!({}));
    assert_eq!(mode(&state), Some("LIST"));
    assert!(state.get("selected").is_some_and(|v| v.is_null()));

    let state = request_ok(&mut stdin, &mut reader, "6", "session.add", json!({}));
    assert_eq!(mode(&state), Some("ADD"));
    let bad_section = request(
        &mut stdin,
        &mut reader,
        "7",
        "session.form.set",
        json!({ "section": "Q" }),
    );
    assert_eq!(error_code(&bad_section), Some("validation_failed"));
}
