use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;

pub const DB_FILE: &str = "educore.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)
        .with_context(|| format!("failed to create workspace {}", workspace.to_string_lossy()))?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS workspace_settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS list_snapshots(
            kind TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            next_id INTEGER NOT NULL,
            saved_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value_json FROM workspace_settings WHERE key = ?",
            [key],
            |r| r.get(0),
        )
        .optional()?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let v = serde_json::from_str(&raw).with_context(|| format!("corrupt setting {key}"))?;
    Ok(Some(v))
}

pub fn settings_set_json(conn: &Connection, key: &str, value: &Value) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO workspace_settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        (key, serde_json::to_string(value)?),
    )?;
    Ok(())
}

/// Replace every list snapshot in one transaction.
pub fn save_lists(
    conn: &mut Connection,
    lists: &[(&'static str, Value)],
    saved_at: &str,
) -> anyhow::Result<usize> {
    let tx = conn.transaction()?;
    for (kind, payload) in lists {
        let next_id = payload.get("nextId").and_then(|v| v.as_i64()).unwrap_or(1);
        tx.execute(
            "INSERT INTO list_snapshots(kind, payload, next_id, saved_at) VALUES(?, ?, ?, ?)
             ON CONFLICT(kind) DO UPDATE SET
                payload = excluded.payload,
                next_id = excluded.next_id,
                saved_at = excluded.saved_at",
            (kind, serde_json::to_string(payload)?, next_id, saved_at),
        )?;
    }
    tx.commit()?;
    Ok(lists.len())
}

pub fn load_lists(conn: &Connection) -> anyhow::Result<Vec<(String, Value)>> {
    let mut stmt = conn.prepare("SELECT kind, payload FROM list_snapshots ORDER BY kind")?;
    let rows = stmt
        .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter()
        .map(|(kind, raw)| {
            let v = serde_json::from_str(&raw)
                .with_context(|| format!("corrupt snapshot for {kind}"))?;
            Ok((kind, v))
        })
        .collect()
}
