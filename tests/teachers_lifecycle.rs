use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_educored");
    let mut child = Command::new(exe)
        .env_remove("EDUCORED_WORKSPACE")
        .env_remove("EDUCORED_SEED_SAMPLE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn educored");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> &str {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

fn rajesh() -> serde_json::Value {
    json!({
        "name": "Dr. Rajesh Kumar",
        "email": "rajesh@school.edu",
        "phone": "9876543210",
        "subject": "Mathematics",
        "classes": "10-A, 10-B"
    })
}

#[test]
fn add_then_delete_leaves_an_empty_list() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "teachers.create",
        json!({ "draft": rajesh() }),
    );
    assert_eq!(created["record"]["id"], "T1");
    assert_eq!(created["record"]["classes"], json!(["10-A", "10-B"]));
    assert_eq!(created["record"]["status"], "active");
    assert_eq!(created["notice"]["level"], "success");
    assert_eq!(created["notice"]["description"], "Teacher added successfully");

    let listed = request_ok(&mut stdin, &mut reader, "2", "teachers.list", json!({}));
    assert_eq!(listed["items"].as_array().map(|a| a.len()), Some(1));

    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "teachers.delete",
        json!({ "id": "T1" }),
    );
    assert_eq!(deleted["removed"], true);
    assert_eq!(deleted["remaining"], 0);

    let again = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "teachers.delete",
        json!({ "id": "T1" }),
    );
    assert_eq!(again["removed"], false);
    assert_eq!(again["notice"]["level"], "info");

    let next = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "teachers.create",
        json!({ "draft": rajesh() }),
    );
    assert_eq!(next["record"]["id"], "T2");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn missing_required_fields_are_reported_and_nothing_is_added() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "teachers.create",
        json!({ "draft": { "name": "Mrs. Priya Sharma", "phone": "  " } }),
    );
    assert_eq!(error_code(&resp), "validation_failed");
    assert_eq!(resp["error"]["message"], "Please fill in all required fields");
    assert_eq!(resp["error"]["details"]["missing"], json!(["email", "phone"]));

    let listed = request_ok(&mut stdin, &mut reader, "2", "teachers.list", json!({}));
    assert_eq!(listed["total"], 0);

    let drained = request_ok(&mut stdin, &mut reader, "3", "notices.drain", json!({}));
    assert_eq!(drained["notices"][0]["level"], "error");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn update_and_toggle_target_existing_ids_only() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "teachers.create",
        json!({ "draft": rajesh() }),
    );
    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "teachers.update",
        json!({ "id": "T1", "patch": { "phone": "1112223333" } }),
    );
    assert_eq!(updated["record"]["phone"], "1112223333");
    assert_eq!(updated["record"]["email"], "rajesh@school.edu");

    let missing = request(
        &mut stdin,
        &mut reader,
        "3",
        "teachers.update",
        json!({ "id": "T9", "patch": { "phone": "1" } }),
    );
    assert_eq!(error_code(&missing), "not_found");

    let toggled = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "teachers.toggleStatus",
        json!({ "id": "T1" }),
    );
    assert_eq!(toggled["record"]["status"], "inactive");

    let unsupported = request(
        &mut stdin,
        &mut reader,
        "5",
        "subjects.toggleStatus",
        json!({ "id": "S1" }),
    );
    assert_eq!(error_code(&unsupported), "unsupported");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn dialog_submit_creates_and_keeps_errors_on_the_form() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "teachers.dialog.openCreate",
        json!({}),
    );
    assert_eq!(opened["dialog"]["state"], "create");

    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "teachers.dialog.set",
        json!({ "fields": { "name": "Mr. Anil Verma" } }),
    );
    let failed = request(&mut stdin, &mut reader, "3", "teachers.dialog.submit", json!({}));
    assert_eq!(error_code(&failed), "validation_failed");
    let state = request_ok(&mut stdin, &mut reader, "4", "teachers.dialog.state", json!({}));
    assert_eq!(state["dialog"]["state"], "create");
    assert_eq!(state["dialog"]["error"], "Please fill in all required fields");

    request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "teachers.dialog.set",
        json!({ "fields": { "email": "anil@school.edu", "phone": "9876543212" } }),
    );
    let submitted = request_ok(&mut stdin, &mut reader, "6", "teachers.dialog.submit", json!({}));
    assert_eq!(submitted["record"]["name"], "Mr. Anil Verma");
    assert_eq!(submitted["dialog"]["state"], "closed");

    request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "teachers.dialog.openView",
        json!({ "id": "T1" }),
    );
    request_ok(&mut stdin, &mut reader, "8", "teachers.dialog.edit", json!({}));
    request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "teachers.dialog.set",
        json!({ "fields": { "subject": "Physics" } }),
    );
    let edited = request_ok(&mut stdin, &mut reader, "10", "teachers.dialog.submit", json!({}));
    assert_eq!(edited["record"]["subject"], "Physics");
    assert_eq!(edited["record"]["id"], "T1");

    drop(stdin);
    let _ = child.wait();
}
