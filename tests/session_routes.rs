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

#[test]
fn sign_in_lands_on_the_role_home_and_sign_out_clears_it() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let blank = request(
        &mut stdin,
        &mut reader,
        "1",
        "session.login",
        json!({ "role": "teacher", "email": " ", "password": "" }),
    );
    assert_eq!(error_code(&blank), "auth_failed");

    let unknown = request(
        &mut stdin,
        &mut reader,
        "2",
        "session.login",
        json!({ "role": "janitor", "email": "a@b.c", "password": "x" }),
    );
    assert_eq!(error_code(&unknown), "bad_params");
    assert_eq!(
        unknown["error"]["details"]["roles"],
        json!(["admin", "teacher", "parent"])
    );

    let numeric = request(
        &mut stdin,
        &mut reader,
        "2b",
        "session.login",
        json!({ "role": "admin", "email": "admin@school.edu", "password": 1234 }),
    );
    assert_eq!(error_code(&numeric), "bad_params");
    let still_out = request_ok(&mut stdin, &mut reader, "2c", "session.current", json!({}));
    assert_eq!(still_out["session"], serde_json::Value::Null);

    let signed_in = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "session.login",
        json!({ "role": "teacher", "email": "teacher@school.edu", "password": "secret" }),
    );
    assert_eq!(signed_in["session"]["home"], "/teacher");
    assert_eq!(signed_in["session"]["user"]["role"], "teacher");
    assert_eq!(signed_in["session"]["user"]["name"], "Dr. Rajesh Kumar");

    let nav = request_ok(&mut stdin, &mut reader, "4", "routes.nav", json!({}));
    assert_eq!(nav["role"], "teacher");
    assert_eq!(nav["label"], "Teacher");
    assert_eq!(nav["links"].as_array().map(|l| l.len()), Some(7));
    assert_eq!(nav["links"][4]["href"], "/teacher/marks");

    let dashboard = request_ok(&mut stdin, &mut reader, "5", "dashboard.summary", json!({}));
    assert_eq!(dashboard["summary"]["role"], "teacher");
    assert_eq!(dashboard["summary"]["unreadMessages"], 0);

    let out = request_ok(&mut stdin, &mut reader, "6", "session.logout", json!({}));
    assert_eq!(out["signedOut"], true);
    assert_eq!(out["redirect"], "/");

    let current = request_ok(&mut stdin, &mut reader, "7", "session.current", json!({}));
    assert_eq!(current["session"], serde_json::Value::Null);

    let no_role = request(&mut stdin, &mut reader, "8", "routes.nav", json!({}));
    assert_eq!(error_code(&no_role), "bad_params");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn paths_resolve_to_public_login_dashboard_or_not_found() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let cases = [
        ("/", json!({ "kind": "public", "path": "/" })),
        ("/contact", json!({ "kind": "public", "path": "/contact" })),
        ("/login", json!({ "kind": "login" })),
        (
            "/parent/results/",
            json!({ "kind": "dashboard", "role": "parent", "label": "Results" }),
        ),
        (
            "/admin/fees",
            json!({ "kind": "dashboard", "role": "admin", "label": "Fees & Accounts" }),
        ),
        ("/admin/nowhere", json!({ "kind": "notFound" })),
    ];
    for (i, (path, want)) in cases.into_iter().enumerate() {
        let got = request_ok(
            &mut stdin,
            &mut reader,
            &format!("r-{i}"),
            "routes.resolve",
            json!({ "path": path }),
        );
        assert_eq!(got["match"], want, "{path}");
    }

    for (role, count) in [("admin", 9), ("teacher", 7), ("parent", 7)] {
        let nav = request_ok(
            &mut stdin,
            &mut reader,
            role,
            "routes.nav",
            json!({ "role": role }),
        );
        assert_eq!(nav["links"].as_array().map(|l| l.len()), Some(count), "{role}");
        assert_eq!(nav["home"], format!("/{role}"));
    }

    drop(stdin);
    let _ = child.wait();
}
