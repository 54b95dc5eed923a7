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

fn add_parent(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    name: &str,
    email: &str,
) -> serde_json::Value {
    request_ok(
        stdin,
        reader,
        id,
        "parents.create",
        json!({ "draft": {
            "name": name,
            "email": email,
            "phone": "9876500000",
            "childName": "Aarav Sharma",
            "childClass": "10-A"
        } }),
    )
}

fn ids(result: &serde_json::Value) -> Vec<String> {
    result["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|r| r["id"].as_str().map(|s| s.to_string()))
        .collect()
}

#[test]
fn search_and_status_filter_combine() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let first = add_parent(&mut stdin, &mut reader, "1", "Mr. Rakesh Sharma", "rakesh@school.edu");
    assert_eq!(first["record"]["id"], "P001");
    assert_eq!(
        first["record"]["children"],
        json!([{ "name": "Aarav Sharma", "class": "10-A" }])
    );
    add_parent(&mut stdin, &mut reader, "2", "Mrs. Sunita Patel", "sunita@school.edu");
    add_parent(&mut stdin, &mut reader, "3", "Mrs. Kavita Sharma", "kavita@school.edu");

    request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "parents.toggleStatus",
        json!({ "id": "P003" }),
    );

    let sharma = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "parents.list",
        json!({ "query": "SHARMA" }),
    );
    assert_eq!(ids(&sharma), vec!["P001", "P003"]);
    assert_eq!(sharma["total"], 3);

    let active_sharma = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "parents.list",
        json!({ "query": "sharma", "filters": { "status": "active" } }),
    );
    assert_eq!(ids(&active_sharma), vec!["P001"]);

    let inactive = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "parents.list",
        json!({ "filters": { "status": "inactive" } }),
    );
    assert_eq!(ids(&inactive), vec!["P003"]);

    let all = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "parents.list",
        json!({ "filters": { "status": "all" } }),
    );
    assert_eq!(ids(&all).len(), 3);

    let by_phone = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "parents.list",
        json!({ "query": "98765" }),
    );
    assert_eq!(ids(&by_phone).len(), 3);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn get_returns_the_record_or_not_found() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    add_parent(&mut stdin, &mut reader, "1", "Mr. Rakesh Sharma", "rakesh@school.edu");
    let got = request_ok(&mut stdin, &mut reader, "2", "parents.get", json!({ "id": "P001" }));
    assert_eq!(got["record"]["email"], "rakesh@school.edu");

    let missing = request(&mut stdin, &mut reader, "3", "parents.get", json!({ "id": "P404" }));
    assert_eq!(error_code(&missing), "not_found");

    drop(stdin);
    let _ = child.wait();
}
