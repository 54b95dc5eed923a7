use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar(args: &[&str]) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_educored");
    let mut child = Command::new(exe)
        .args(args)
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

fn teacher(name: &str, email: &str) -> serde_json::Value {
    json!({ "draft": { "name": name, "email": email, "phone": "9876543210" } })
}

#[test]
fn saved_workspace_survives_a_restart_without_reusing_ids() {
    let workspace = temp_dir("educored-workspace-restart");
    let ws = workspace.to_string_lossy().to_string();

    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);
    let selected = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": ws }),
    );
    assert_eq!(selected["restoredLists"], 0);

    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "teachers.create",
        teacher("Dr. Rajesh Kumar", "rajesh@school.edu"),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "teachers.create",
        teacher("Mrs. Priya Sharma", "priya@school.edu"),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "teachers.delete",
        json!({ "id": "T1" }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "settings.update",
        json!({ "section": "schoolProfile", "value": { "name": "Green Valley School" } }),
    );
    let saved = request_ok(&mut stdin, &mut reader, "6", "workspace.save", json!({}));
    assert_eq!(saved["savedLists"], 12);
    drop(stdin);
    let _ = child.wait();

    let (mut child, mut stdin, mut reader) = spawn_sidecar(&["--workspace", &ws]);
    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["workspacePath"], ws);

    let listed = request_ok(&mut stdin, &mut reader, "2", "teachers.list", json!({}));
    assert_eq!(listed["total"], 1);
    assert_eq!(listed["items"][0]["id"], "T2");

    let next = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "teachers.create",
        teacher("Mr. Anil Verma", "anil@school.edu"),
    );
    assert_eq!(next["record"]["id"], "T3");

    let profile = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "settings.get",
        json!({ "section": "schoolProfile" }),
    );
    assert_eq!(profile["value"]["name"], "Green Valley School");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn bundle_export_then_import_into_a_fresh_workspace() {
    let workspace = temp_dir("educored-bundle-src");
    let target = temp_dir("educored-bundle-dst");
    let out_dir = temp_dir("educored-bundle-out");
    let bundle = out_dir.join("workspace.zip");

    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);

    let no_ws = request(
        &mut stdin,
        &mut reader,
        "0",
        "backup.exportWorkspaceBundle",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    assert_eq!(error_code(&no_ws), "no_workspace");

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "contact.submit",
        json!({ "draft": {
            "schoolName": "Sunrise Public School",
            "name": "Meera Iyer",
            "email": "meera@sunrise.edu",
            "phone": "9000000001"
        } }),
    );

    let exported = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "backup.exportWorkspaceBundle",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    assert_eq!(exported["bundleFormat"], "educore-workspace-v1");
    assert_eq!(exported["entryCount"], 2);
    assert_eq!(exported["sha256"].as_str().map(str::len), Some(64));
    assert!(bundle.is_file());

    let missing = request(
        &mut stdin,
        &mut reader,
        "4",
        "backup.importWorkspaceBundle",
        json!({ "inPath": out_dir.join("nope.zip").to_string_lossy() }),
    );
    assert_eq!(error_code(&missing), "not_found");

    let imported = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "backup.importWorkspaceBundle",
        json!({
            "inPath": bundle.to_string_lossy(),
            "workspacePath": target.to_string_lossy()
        }),
    );
    assert_eq!(imported["sha256"], exported["sha256"]);
    assert_eq!(imported["restoredLists"], 12);

    let health = request_ok(&mut stdin, &mut reader, "6", "health", json!({}));
    assert_eq!(health["workspacePath"], target.to_string_lossy().to_string());

    let enquiries = request_ok(&mut stdin, &mut reader, "7", "enquiries.list", json!({}));
    assert_eq!(enquiries["items"][0]["schoolName"], "Sunrise Public School");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn bad_snapshot_row_leaves_the_open_school_untouched() {
    let workspace = temp_dir("educored-corrupt-ws");

    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "teachers.create",
        teacher("Dr. Rajesh Kumar", "rajesh@school.edu"),
    );
    request_ok(&mut stdin, &mut reader, "3", "workspace.save", json!({}));
    drop(stdin);
    let _ = child.wait();

    // "timetable" sorts after "teachers", so the teachers row decodes first.
    let conn = rusqlite::Connection::open(workspace.join("educore.sqlite3")).expect("open db");
    conn.execute(
        "UPDATE list_snapshots SET payload = ?1 WHERE kind = 'timetable'",
        [r#"{"records": 5, "nextId": 1}"#],
    )
    .expect("corrupt row");
    drop(conn);

    let (mut child, mut stdin, mut reader) = spawn_sidecar(&["--seed-sample"]);
    let failed = request(
        &mut stdin,
        &mut reader,
        "4",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(error_code(&failed), "db_open_failed");

    let teachers = request_ok(&mut stdin, &mut reader, "5", "teachers.list", json!({}));
    assert_eq!(teachers["total"], 5);
    let health = request_ok(&mut stdin, &mut reader, "6", "health", json!({}));
    assert_eq!(health["workspacePath"], serde_json::Value::Null);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn rejected_bundle_keeps_the_workspace_connection() {
    let workspace = temp_dir("educored-tamper-ws");
    let out_dir = temp_dir("educored-tamper-out");
    let bundle = out_dir.join("tampered.zip");
    {
        let mut zip = zip::ZipWriter::new(std::fs::File::create(&bundle).expect("create bundle"));
        let opts = zip::write::FileOptions::default();
        zip.start_file("manifest.json", opts).expect("manifest");
        zip.write_all(
            json!({ "format": "educore-workspace-v1", "sha256": "00" })
                .to_string()
                .as_bytes(),
        )
        .expect("write manifest");
        zip.start_file("db/educore.sqlite3", opts).expect("db entry");
        zip.write_all(b"not a database").expect("write db entry");
        zip.finish().expect("finish bundle");
    }

    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let rejected = request(
        &mut stdin,
        &mut reader,
        "2",
        "backup.importWorkspaceBundle",
        json!({ "inPath": bundle.to_string_lossy() }),
    );
    assert_eq!(error_code(&rejected), "backup_failed");
    assert!(rejected["error"]["message"]
        .as_str()
        .unwrap_or("")
        .contains("checksum mismatch"));

    let saved = request_ok(&mut stdin, &mut reader, "3", "workspace.save", json!({}));
    assert_eq!(saved["savedLists"], 12);
    let health = request_ok(&mut stdin, &mut reader, "4", "health", json!({}));
    assert_eq!(health["workspacePath"], workspace.to_string_lossy().to_string());

    drop(stdin);
    let _ = child.wait();
}
